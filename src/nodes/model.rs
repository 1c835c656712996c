//! Behaviour of a node: the data model trait implemented per node kind
//!
//! A model declares its port layout, receives input values and exposes output
//! values. It never talks to connections directly: when an input changes the
//! model records which outputs changed in [`DataUpdates`], and the scene pushes
//! those values along the attached connections.

use super::connection::ConnectionId;
use super::data::{DataKind, NodeData};
use super::port::{ConnectionPolicy, PortDirection, PortIndex};
use crate::error::GraphResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind-specific fields of a saved node (everything besides `name`)
pub type ModelState = Map<String, Value>;

/// Validation state reported by a model for display purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeValidationState {
    #[default]
    Valid,
    Warning,
    Error,
}

/// Output ports a model reports as changed during a call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DataUpdates {
    ports: Vec<PortIndex>,
}

impl DataUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an output port as updated; repeated marks are collapsed
    pub fn updated(&mut self, port: PortIndex) {
        if !self.ports.contains(&port) {
            self.ports.push(port);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn ports(&self) -> &[PortIndex] {
        &self.ports
    }

    pub fn take(&mut self) -> Vec<PortIndex> {
        std::mem::take(&mut self.ports)
    }
}

/// Trait implemented by every node kind.
///
/// The port layout (`num_ports`, `data_kind`, `port_out_connection_policy`) is
/// read once when the node is created and must not change afterwards.
pub trait NodeDataModel {
    /// Number of ports in the given direction
    fn num_ports(&self, direction: PortDirection) -> usize;

    /// Kind of value carried by a port
    fn data_kind(&self, direction: PortDirection, index: PortIndex) -> DataKind;

    /// Receive a new value (or `None` when the input lost its data).
    ///
    /// Outputs whose value changed as a result must be marked in `updates`.
    fn set_input(&mut self, data: Option<NodeData>, port: PortIndex, updates: &mut DataUpdates);

    /// Current value of an output port
    fn get_output(&self, port: PortIndex) -> Option<NodeData>;

    /// Caption shown by the renderer; empty means "use the kind name"
    fn caption(&self) -> String {
        String::new()
    }

    fn caption_visible(&self) -> bool {
        true
    }

    fn port_caption(&self, _direction: PortDirection, _index: PortIndex) -> String {
        String::new()
    }

    fn port_caption_visible(&self, _direction: PortDirection, _index: PortIndex) -> bool {
        false
    }

    /// Multiplicity of an output port
    fn port_out_connection_policy(&self, _index: PortIndex) -> ConnectionPolicy {
        ConnectionPolicy::Many
    }

    /// Kind-specific fields written next to the kind name when saving
    fn save(&self) -> ModelState {
        ModelState::new()
    }

    /// Re-apply fields produced by [`NodeDataModel::save`]
    fn restore(&mut self, _state: &ModelState) -> GraphResult<()> {
        Ok(())
    }

    fn resizable(&self) -> bool {
        false
    }

    fn validation_state(&self) -> NodeValidationState {
        NodeValidationState::Valid
    }

    fn validation_message(&self) -> String {
        String::new()
    }

    /// Called when a connection into one of this node's inputs becomes complete
    fn input_connection_created(&mut self, _connection: ConnectionId) {}

    /// Called when a connection into one of this node's inputs stops being complete
    fn input_connection_deleted(&mut self, _connection: ConnectionId) {}

    /// Called when a connection out of one of this node's outputs becomes complete
    fn output_connection_created(&mut self, _connection: ConnectionId) {}

    /// Called when a connection out of one of this node's outputs stops being complete
    fn output_connection_deleted(&mut self, _connection: ConnectionId) {}
}
