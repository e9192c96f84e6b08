use serde::{Deserialize, Serialize};

/// Lifecycle status of the remote node module as tracked by the controller.
/// Exactly one authoritative instance exists per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    NotStarted,
    Starting,
    Running,
    Stopping,
    Stopped,
    Error,
}

impl NodeStatus {
    /// True while the node is running or in the middle of starting, the only
    /// states from which a stop request is meaningful.
    pub fn is_active(self) -> bool {
        matches!(self, NodeStatus::Starting | NodeStatus::Running)
    }
}
