//! Connections between an output port and an input port
//!
//! A connection is either complete (both ends set) or pending: one end is set
//! and the other direction is marked as required, which is the state of a
//! connection being dragged by the user. This type holds the endpoint
//! bookkeeping only; registering on ports and moving data is done by the
//! [`Scene`](super::graph::Scene), which owns both nodes and connections.

use super::converter::TypeConverter;
use super::data::NodeData;
use super::node::NodeId;
use super::port::{PortDirection, PortKey};
use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionId({})", self.0)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// One end is set; the other direction is still required
    Pending(PortDirection),
    Complete,
}

/// Represents a (possibly partial) edge between two ports
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    input: Option<PortKey>,
    output: Option<PortKey>,
    required: Option<PortDirection>,
    converter: Option<TypeConverter>,
    last_hovered_node: Option<NodeId>,
}

impl Connection {
    /// Creates a connection from one port and optionally its opposite.
    pub(crate) fn new(port_a: PortKey, port_b: Option<PortKey>, converter: Option<TypeConverter>) -> GraphResult<Self> {
        let mut connection = Self {
            id: ConnectionId::new(),
            input: None,
            output: None,
            required: None,
            converter,
            last_hovered_node: None,
        };

        if let Some(port_b) = port_b {
            if port_a == port_b {
                return Err(GraphError::SamePort(port_a));
            }
            if port_a.direction == port_b.direction {
                return Err(GraphError::PortsOfSameDirection(port_a.direction));
            }
            *connection.slot_mut(port_b.direction) = Some(port_b);
        } else {
            connection.required = Some(port_a.direction.opposite());
        }
        *connection.slot_mut(port_a.direction) = Some(port_a);

        Ok(connection)
    }

    fn slot_mut(&mut self, direction: PortDirection) -> &mut Option<PortKey> {
        match direction {
            PortDirection::Input => &mut self.input,
            PortDirection::Output => &mut self.output,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Endpoint in the given direction, if set
    pub fn port(&self, direction: PortDirection) -> Option<PortKey> {
        match direction {
            PortDirection::Input => self.input,
            PortDirection::Output => self.output,
        }
    }

    pub fn input(&self) -> Option<PortKey> {
        self.input
    }

    pub fn output(&self) -> Option<PortKey> {
        self.output
    }

    /// (input, output) endpoints
    pub fn ports(&self) -> (Option<PortKey>, Option<PortKey>) {
        (self.input, self.output)
    }

    /// Endpoints that are currently set, input first
    pub fn valid_ports(&self) -> impl Iterator<Item = PortKey> {
        self.input.into_iter().chain(self.output)
    }

    pub fn node(&self, direction: PortDirection) -> Option<NodeId> {
        self.port(direction).map(|port| port.node)
    }

    /// Node on the input side
    pub fn input_node(&self) -> Option<NodeId> {
        self.node(PortDirection::Input)
    }

    /// Node on the output side
    pub fn output_node(&self) -> Option<NodeId> {
        self.node(PortDirection::Output)
    }

    pub fn touches_node(&self, node: NodeId) -> bool {
        self.valid_ports().any(|port| port.node == node)
    }

    pub fn required_direction(&self) -> Option<PortDirection> {
        self.required
    }

    pub fn requires_port(&self) -> bool {
        self.required.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.input.is_some() && self.output.is_some()
    }

    pub fn state(&self) -> ConnectionState {
        match self.required {
            Some(direction) if !self.is_complete() => ConnectionState::Pending(direction),
            _ => ConnectionState::Complete,
        }
    }

    pub fn type_converter(&self) -> Option<&TypeConverter> {
        self.converter.as_ref()
    }

    pub(crate) fn set_type_converter(&mut self, converter: Option<TypeConverter>) {
        self.converter = converter;
    }

    /// Node the dragged end was last hovering over
    pub fn last_hovered_node(&self) -> Option<NodeId> {
        self.last_hovered_node
    }

    pub(crate) fn set_last_hovered_node(&mut self, node: Option<NodeId>) -> Option<NodeId> {
        std::mem::replace(&mut self.last_hovered_node, node)
    }

    /// Fill the empty slot for `port.direction`.
    ///
    /// Returns `true` when this call moved the connection from pending to
    /// complete.
    pub(crate) fn connect_to(&mut self, port: PortKey) -> GraphResult<bool> {
        let id = self.id;
        let slot = self.slot_mut(port.direction);
        if slot.is_some() {
            return Err(GraphError::PortAlreadySet {
                connection: id,
                direction: port.direction,
            });
        }

        let was_incomplete = !self.is_complete();
        *self.slot_mut(port.direction) = Some(port);
        self.required = None;
        Ok(was_incomplete && self.is_complete())
    }

    /// Clear one end and mark that direction as required again.
    ///
    /// Returns the port that was detached.
    pub(crate) fn clear_node(&mut self, direction: PortDirection) -> GraphResult<PortKey> {
        let id = self.id;
        let port = self.slot_mut(direction).take().ok_or(GraphError::PortNotSet {
            connection: id,
            direction,
        })?;
        self.required = Some(direction);
        Ok(port)
    }

    /// Apply the converter to a value travelling output → input.
    ///
    /// "No data" is passed through untouched.
    pub fn convert(&self, data: Option<NodeData>) -> Option<NodeData> {
        match (data, &self.converter) {
            (Some(data), Some(converter)) => Some(converter.convert(data)),
            (data, _) => data,
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = |port: Option<PortKey>| port.map(|p| p.to_string()).unwrap_or_else(|| "?".into());
        write!(f, "{} -> {}", end(self.output), end(self.input))
    }
}
