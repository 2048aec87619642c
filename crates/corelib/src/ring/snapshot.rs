//! Immutable ring state.
//!
//! A [`RingSnapshot`] is never mutated once it is published by
//! [`HashRing`](super::HashRing); writers clone the current snapshot, apply
//! their change to the copy and swap it in. Lookups therefore always see a
//! complete membership view.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::node::{NodeId, StorageNode};
use crate::partitioner::Partitioner;
use crate::token::Token;
use crate::vnode::VirtualNode;

/// Perturbed hash attempts per virtual point before an insert is rejected.
const MAX_PLACEMENT_ATTEMPTS: u32 = 64;

#[derive(Debug, Clone)]
struct NodeEntry {
    node: StorageNode,
    /// Tokens actually occupied by this node, including perturbed ones.
    tokens: Vec<Token>,
}

/// Point-in-time view of the ring.
#[derive(Debug, Clone)]
pub struct RingSnapshot {
    points: BTreeMap<Token, NodeId>,
    nodes: HashMap<NodeId, NodeEntry>,
    partitioner: Arc<dyn Partitioner>,
}

impl RingSnapshot {
    /// An empty ring hashing with `partitioner`.
    pub fn empty(partitioner: Arc<dyn Partitioner>) -> Self {
        Self {
            points: BTreeMap::new(),
            nodes: HashMap::new(),
            partitioner,
        }
    }

    /// Insert `node`, replacing any earlier registration with the same id.
    ///
    /// Returns the number of collisions that had to be resolved by perturbing
    /// the hash input.
    pub(crate) fn insert_node(&mut self, node: StorageNode) -> Result<u32> {
        node.validate()?;
        self.remove_node(&node.id);

        let mut tokens = Vec::with_capacity(node.virtual_nodes as usize);
        let mut collisions = 0;

        for index in 0..node.virtual_nodes {
            let mut attempt = 0;
            loop {
                if attempt == MAX_PLACEMENT_ATTEMPTS {
                    // Undo the partial insert.
                    for token in &tokens {
                        self.points.remove(token);
                    }
                    return Err(Error::RingOperation(format!(
                        "no free position for virtual node {index} of {} after {attempt} attempts",
                        node.id
                    )));
                }

                let vnode =
                    VirtualNode::from_index(self.partitioner.as_ref(), &node.id, index, attempt);
                match self.points.entry(vnode.token) {
                    Entry::Vacant(slot) => {
                        slot.insert(vnode.node_id);
                        tokens.push(vnode.token);
                        break;
                    }
                    Entry::Occupied(taken) => {
                        warn!(
                            node_id = %node.id,
                            vnode = index,
                            attempt,
                            token = %vnode.token,
                            owner = %taken.get(),
                            "virtual node collision, perturbing hash input"
                        );
                        collisions += 1;
                        attempt += 1;
                    }
                }
            }
        }

        debug!(node_id = %node.id, vnodes = tokens.len(), collisions, "inserted node points");
        self.nodes
            .insert(node.id.clone(), NodeEntry { node, tokens });
        Ok(collisions)
    }

    /// Remove exactly the points owned by `node_id`.
    pub(crate) fn remove_node(&mut self, node_id: &str) -> Option<StorageNode> {
        let entry = self.nodes.remove(node_id)?;
        for token in &entry.tokens {
            self.points.remove(token);
        }
        Some(entry.node)
    }

    /// Owner of the first point at or after the key's hash, wrapping around.
    pub fn get_node(&self, key: &str) -> Option<&NodeId> {
        let token = self.partitioner.partition(key.as_bytes());
        self.points
            .range(token..)
            .next()
            .or_else(|| self.points.iter().next())
            .map(|(_, node_id)| node_id)
    }

    /// Up to `count` distinct owners, walking clockwise from the key's hash.
    ///
    /// The first element, when present, equals [`get_node`](Self::get_node).
    pub fn get_nodes(&self, key: &str, count: usize) -> Vec<NodeId> {
        let wanted = count.min(self.nodes.len());
        if wanted == 0 || self.points.is_empty() {
            return Vec::new();
        }

        let token = self.partitioner.partition(key.as_bytes());
        let mut owners: Vec<NodeId> = Vec::with_capacity(wanted);

        for (_, node_id) in self.points.range(token..).chain(self.points.range(..token)) {
            if !owners.contains(node_id) {
                owners.push(node_id.clone());
                if owners.len() == wanted {
                    break;
                }
            }
        }

        owners
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn node(&self, node_id: &str) -> Option<&StorageNode> {
        self.nodes.get(node_id).map(|entry| &entry.node)
    }

    /// Registered nodes, ordered by id.
    pub fn nodes(&self) -> Vec<StorageNode> {
        let mut nodes: Vec<StorageNode> = self.nodes.values().map(|e| e.node.clone()).collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    /// Points currently owned by `node_id`.
    pub fn tokens_of(&self, node_id: &str) -> usize {
        self.nodes.get(node_id).map_or(0, |entry| entry.tokens.len())
    }

    /// All `(token, owner)` pairs in ring order.
    pub fn tokens(&self) -> Vec<(Token, NodeId)> {
        self.points
            .iter()
            .map(|(token, node_id)| (*token, node_id.clone()))
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn token_count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }

    /// Keys whose owner set differs between two ring states.
    ///
    /// This is the raw input a migration job needs; it moves nothing itself.
    pub fn diff<K: AsRef<str>>(
        old: &RingSnapshot,
        new: &RingSnapshot,
        keys: &[K],
        replication_factor: usize,
    ) -> Vec<Reassignment> {
        keys.iter()
            .filter_map(|key| {
                let key = key.as_ref();
                let previous = old.get_nodes(key, replication_factor);
                let current = new.get_nodes(key, replication_factor);
                let changed = previous.len() != current.len()
                    || current.iter().any(|id| !previous.contains(id));
                changed.then(|| Reassignment {
                    key: key.to_owned(),
                    previous,
                    current,
                })
            })
            .collect()
    }
}

/// A key whose placement changed between two ring states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub key: String,
    /// Owners before the change, in ring-selection order.
    pub previous: Vec<NodeId>,
    /// Owners after the change, in ring-selection order.
    pub current: Vec<NodeId>,
}

impl Reassignment {
    /// Nodes that must receive a copy.
    pub fn gained(&self) -> impl Iterator<Item = &NodeId> {
        self.current.iter().filter(|id| !self.previous.contains(id))
    }

    /// Nodes that no longer own the key.
    pub fn lost(&self) -> impl Iterator<Item = &NodeId> {
        self.previous.iter().filter(|id| !self.current.contains(id))
    }
}
