//! Scene configuration

use crate::constants;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Behaviour switches for a [`Scene`](crate::nodes::Scene)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// `create_node` is rejected when false; restoring from a snapshot is not affected
    pub allow_node_creation: bool,
    /// `remove_node` is rejected when false; `clear` and `load` are not affected
    pub allow_node_deletion: bool,
    /// Reject fully specified connections that would close a loop.
    ///
    /// With this off a cycle can be built, and data pushed into it keeps
    /// circulating for as long as the models report changed outputs.
    pub check_cycles: bool,
    /// Size hint given to new nodes
    pub default_node_size: Vec2,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            allow_node_creation: true,
            allow_node_deletion: true,
            check_cycles: true,
            default_node_size: Vec2::from_array(constants::node::DEFAULT_SIZE),
        }
    }
}
