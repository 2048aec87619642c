//! Subcommands.
//!
//! Ring commands build a throwaway ring of `node-1..=N`. `demo` wires a
//! [`SegmentOrchestrator`] to in-memory collaborators and drives the full
//! store, list and membership path.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result};
use clap::Subcommand;
use corelib::{HashRing, RingBuilder, RingSnapshot, StorageNode};
use orchestrator::{Collaborators, OrchestratorConfig, SegmentOrchestrator, StoreRequest};
use tracing::info;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the replica nodes for a key.
    Lookup {
        key: String,
        /// Nodes on the ring.
        #[arg(short, long, default_value_t = 5)]
        nodes: usize,
    },

    /// Count how many sample keys each node owns as primary.
    Distribution {
        #[arg(short, long, default_value_t = 5)]
        nodes: usize,
        #[arg(short, long, default_value_t = 100_000)]
        keys: usize,
    },

    /// Report how many keys change owners when one node joins.
    Rebalance {
        #[arg(short, long, default_value_t = 5)]
        nodes: usize,
        #[arg(short, long, default_value_t = 10_000)]
        keys: usize,
    },

    /// Store and list segments against in-memory backends.
    Demo {
        #[arg(short, long, default_value_t = 4)]
        nodes: usize,
        /// Segments stored per video.
        #[arg(short, long, default_value_t = 5)]
        segments: u32,
        /// Payload size in bytes.
        #[arg(long, default_value_t = 1024)]
        size: usize,
    },
}

/// Printable command output.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub lines: Vec<String>,
}

impl CommandResult {
    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

fn node_id(i: usize) -> String {
    format!("node-{i}")
}

fn build_ring(nodes: usize, config: &OrchestratorConfig) -> Result<HashRing> {
    anyhow::ensure!(nodes > 0, "at least one node is required");
    (1..=nodes)
        .fold(
            RingBuilder::new().with_vnodes(config.virtual_nodes),
            |builder, i| builder.add_node(&node_id(i), 1000, &format!("10.0.0.{i}:9000")),
        )
        .build()
        .context("failed to build ring")
}

fn sample_keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("segment-{i}")).collect()
}

impl Command {
    pub async fn run(&self, config: &OrchestratorConfig) -> Result<CommandResult> {
        match self {
            Command::Lookup { key, nodes } => lookup(key, *nodes, config),
            Command::Distribution { nodes, keys } => distribution(*nodes, *keys, config),
            Command::Rebalance { nodes, keys } => rebalance(*nodes, *keys, config),
            Command::Demo {
                nodes,
                segments,
                size,
            } => demo(*nodes, *segments, *size, config).await,
        }
    }
}

fn lookup(key: &str, nodes: usize, config: &OrchestratorConfig) -> Result<CommandResult> {
    let ring = build_ring(nodes, config)?;
    let replicas = ring.get_nodes(key, config.replication_factor);

    let mut out = CommandResult::default();
    out.push(format!(
        "{key}: {} replica(s) on a {nodes}-node ring",
        replicas.len()
    ));
    for (rank, id) in replicas.iter().enumerate() {
        let role = if rank == 0 { "primary" } else { "replica" };
        out.push(format!("  {role:<8} {id}"));
    }
    Ok(out)
}

fn distribution(nodes: usize, keys: usize, config: &OrchestratorConfig) -> Result<CommandResult> {
    let ring = build_ring(nodes, config)?;
    let snapshot = ring.snapshot();

    let mut counts: BTreeMap<String, usize> =
        snapshot.nodes().into_iter().map(|n| (n.id, 0)).collect();
    for key in sample_keys(keys) {
        if let Some(owner) = snapshot.get_node(&key) {
            *counts.entry(owner.clone()).or_default() += 1;
        }
    }

    let mut out = CommandResult::default();
    out.push(format!(
        "{keys} keys over {nodes} nodes ({} points, {})",
        snapshot.token_count(),
        snapshot.partitioner_name()
    ));
    for (id, count) in counts {
        let share = if keys == 0 {
            0.0
        } else {
            count as f64 * 100.0 / keys as f64
        };
        out.push(format!("  {id:<10} {count:>8} {share:>6.2}%"));
    }
    Ok(out)
}

fn rebalance(nodes: usize, keys: usize, config: &OrchestratorConfig) -> Result<CommandResult> {
    let ring = build_ring(nodes, config)?;
    let joining = StorageNode::new(node_id(nodes + 1), 1000, "10.0.0.250:9000")
        .with_virtual_nodes(config.virtual_nodes);
    let update = ring.add_node(joining)?;

    let keys = sample_keys(keys);
    let moved = RingSnapshot::diff(&update.before, &update.after, &keys, config.replication_factor);
    let to_new = moved
        .iter()
        .filter(|r| r.gained().any(|id| *id == node_id(nodes + 1)))
        .count();

    let mut out = CommandResult::default();
    out.push(format!(
        "{} of {} keys change owners when {} joins",
        moved.len(),
        keys.len(),
        node_id(nodes + 1)
    ));
    out.push(format!("  {to_new} gain a replica on the new node"));
    Ok(out)
}

async fn demo(
    nodes: usize,
    segments: u32,
    size: usize,
    config: &OrchestratorConfig,
) -> Result<CommandResult> {
    anyhow::ensure!(nodes > 0, "at least one node is required");
    let orch = SegmentOrchestrator::new(config.clone(), Collaborators::in_memory())?;

    for i in 1..=nodes {
        orch.add_storage_node(&node_id(i), 1000, &format!("10.0.0.{i}:9000"))
            .await?;
    }

    let video_id = "demo-video";
    for seq in 0..segments {
        let request = StoreRequest::new(video_id, format!("{video_id}-{seq}"), vec![0u8; size])
            .with_sequence(seq);
        orch.store_segment_with(request).await?;
    }
    info!(segments, "stored demo segments");

    let mut out = CommandResult::default();
    out.push(format!("{video_id}:"));
    for segment in orch.get_video_segments(video_id).await? {
        out.push(format!(
            "  #{:<3} {:<16} {:>8} B  [{}]",
            segment.sequence,
            segment.segment_id,
            segment.size,
            segment.node_ids.join(", ")
        ));
    }

    let leaving = node_id(1);
    orch.remove_storage_node(&leaving).await?;
    let remaining: Vec<_> = orch
        .get_storage_nodes()
        .into_iter()
        .map(|n| n.id)
        .collect();
    out.push(format!(
        "removed {leaving}; remaining nodes: {}",
        remaining.join(", ")
    ));
    Ok(out)
}
