//! Node types and core node functionality

use super::connection::ConnectionId;
use super::data::{DataKind, NodeData};
use super::model::{DataUpdates, NodeDataModel};
use super::port::{ConnectionPolicy, Port, PortDirection, PortIndex, PortKey};
use crate::constants;
use crate::error::{GraphError, GraphResult};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node, preserved across save and restore
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn parse_str(input: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(input).map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transient feedback state while a connection is dragged near the node
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeReaction {
    #[default]
    NotReacting,
    Reacting {
        direction: PortDirection,
        kind: DataKind,
    },
}

/// A node placed in a scene: identity, position, ports and its model.
pub struct Node {
    id: NodeId,
    kind_name: String,
    model: Box<dyn NodeDataModel>,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
    position: Vec2,
    /// Size hint for the renderer
    pub size: Vec2,
    reaction: NodeReaction,
    dragging_position: Vec2,
}

impl Node {
    /// Build a node around a model, laying out its ports once.
    pub(crate) fn new(id: NodeId, kind_name: impl Into<String>, model: Box<dyn NodeDataModel>) -> Self {
        let inputs = Self::build_ports(id, PortDirection::Input, model.as_ref());
        let outputs = Self::build_ports(id, PortDirection::Output, model.as_ref());
        Self {
            id,
            kind_name: kind_name.into(),
            model,
            inputs,
            outputs,
            position: Vec2::ZERO,
            size: Vec2::from_array(constants::node::DEFAULT_SIZE),
            reaction: NodeReaction::NotReacting,
            dragging_position: Vec2::ZERO,
        }
    }

    fn build_ports(id: NodeId, direction: PortDirection, model: &dyn NodeDataModel) -> Vec<Port> {
        (0..model.num_ports(direction))
            .map(|index| {
                let policy = match direction {
                    PortDirection::Input => ConnectionPolicy::One,
                    PortDirection::Output => model.port_out_connection_policy(index),
                };
                let mut port = Port::new(
                    PortKey::new(id, direction, index),
                    model.data_kind(direction, index),
                    policy,
                );
                port.caption = model.port_caption(direction, index);
                port.caption_visible = model.port_caption_visible(direction, index);
                port
            })
            .collect()
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Registered kind this node was created from
    pub fn kind_name(&self) -> &str {
        &self.kind_name
    }

    pub fn model(&self) -> &dyn NodeDataModel {
        self.model.as_ref()
    }

    pub(crate) fn model_mut(&mut self) -> &mut dyn NodeDataModel {
        self.model.as_mut()
    }

    /// Model caption, or the kind name when the model has none
    pub fn caption(&self) -> String {
        let caption = self.model.caption();
        if caption.is_empty() {
            self.kind_name.clone()
        } else {
            caption
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    pub fn ports(&self, direction: PortDirection) -> &[Port] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    pub fn port(&self, direction: PortDirection, index: PortIndex) -> Option<&Port> {
        self.ports(direction).get(index)
    }

    pub(crate) fn port_mut(&mut self, direction: PortDirection, index: PortIndex) -> Option<&mut Port> {
        match direction {
            PortDirection::Input => self.inputs.get_mut(index),
            PortDirection::Output => self.outputs.get_mut(index),
        }
    }

    /// Connections attached to ports of one direction, port by port
    pub fn connections(&self, direction: PortDirection) -> impl Iterator<Item = ConnectionId> + '_ {
        self.ports(direction)
            .iter()
            .flat_map(|port| port.connections().iter().copied())
    }

    /// Input connections followed by output connections
    pub fn all_connections(&self) -> Vec<ConnectionId> {
        self.connections(PortDirection::Input)
            .chain(self.connections(PortDirection::Output))
            .collect()
    }

    /// Hand an incoming value to the model.
    ///
    /// Returns the output ports the model reported as changed; the caller is
    /// responsible for pushing them along the attached connections.
    pub fn propagate_incoming(&mut self, value: Option<NodeData>, input_port: PortKey) -> GraphResult<Vec<PortIndex>> {
        if input_port.node != self.id {
            return Err(GraphError::WrongOwner {
                port: input_port,
                node: self.id,
            });
        }
        if input_port.direction != PortDirection::Input {
            return Err(GraphError::NotAnInput(input_port));
        }
        if input_port.index >= self.inputs.len() {
            return Err(GraphError::UnknownPort(input_port));
        }

        let mut updates = DataUpdates::new();
        self.model.set_input(value, input_port.index, &mut updates);
        Ok(updates.take())
    }

    /// Start highlighting ports compatible with a dragged connection
    pub fn react_to_possible_connection(&mut self, direction: PortDirection, kind: DataKind, pointer_position: Vec2) {
        self.dragging_position = pointer_position - self.position;
        self.reaction = NodeReaction::Reacting { direction, kind };
    }

    pub fn reset_reaction(&mut self) {
        self.reaction = NodeReaction::NotReacting;
    }

    pub fn reaction(&self) -> &NodeReaction {
        &self.reaction
    }

    pub fn is_reacting(&self) -> bool {
        matches!(self.reaction, NodeReaction::Reacting { .. })
    }

    /// Pointer position relative to the node origin, as of the last reaction
    pub fn dragging_position(&self) -> Vec2 {
        self.dragging_position
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind_name)
            .field("position", &self.position)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .finish()
    }
}
