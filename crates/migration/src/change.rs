//! Description of a ring membership change.

use std::fmt;
use std::sync::Arc;

use corelib::{NodeId, RingSnapshot, RingUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    NodeJoined,
    NodeLeft,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::NodeJoined => f.write_str("node-joined"),
            ChangeKind::NodeLeft => f.write_str("node-left"),
        }
    }
}

/// A membership change together with the ring on either side of it.
#[derive(Debug, Clone)]
pub struct RingChange {
    pub kind: ChangeKind,
    pub node_id: NodeId,
    pub before: Arc<RingSnapshot>,
    pub after: Arc<RingSnapshot>,
}

impl RingChange {
    pub fn new(kind: ChangeKind, node_id: impl Into<NodeId>, update: RingUpdate) -> Self {
        Self {
            kind,
            node_id: node_id.into(),
            before: update.before,
            after: update.after,
        }
    }

    /// Checkpoint key. Rerunning the same change resumes the same job.
    pub fn job_id(&self) -> String {
        format!("{}/{}", self.kind, self.node_id)
    }
}
