//! Port types and functionality for node connections

use super::connection::ConnectionId;
use super::data::DataKind;
use super::node::NodeId;
use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based index of a port within its node and direction
pub type PortIndex = usize;

/// Direction of a port (input or output)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub const ALL: [PortDirection; 2] = [PortDirection::Input, PortDirection::Output];

    pub fn opposite(self) -> PortDirection {
        match self {
            PortDirection::Input => PortDirection::Output,
            PortDirection::Output => PortDirection::Input,
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => write!(f, "input"),
            PortDirection::Output => write!(f, "output"),
        }
    }
}

/// How many connections a port accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionPolicy {
    One,
    Many,
}

/// Stable address of a port: owning node, direction and index.
///
/// This is also the key the renderer uses to look up port geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortKey {
    pub node: NodeId,
    pub direction: PortDirection,
    pub index: PortIndex,
}

impl PortKey {
    pub fn new(node: NodeId, direction: PortDirection, index: PortIndex) -> Self {
        Self { node, direction, index }
    }

    pub fn input(node: NodeId, index: PortIndex) -> Self {
        Self::new(node, PortDirection::Input, index)
    }

    pub fn output(node: NodeId, index: PortIndex) -> Self {
        Self::new(node, PortDirection::Output, index)
    }
}

impl fmt::Display for PortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}[{}]", self.node, self.direction, self.index)
    }
}

/// Represents a connection point on a node
#[derive(Debug, Clone)]
pub struct Port {
    key: PortKey,
    data_kind: DataKind,
    policy: ConnectionPolicy,
    pub caption: String,
    pub caption_visible: bool,
    connections: Vec<ConnectionId>,
}

impl Port {
    /// Creates a new port. Input ports always use [`ConnectionPolicy::One`].
    pub fn new(key: PortKey, data_kind: DataKind, policy: ConnectionPolicy) -> Self {
        let policy = match key.direction {
            PortDirection::Input => ConnectionPolicy::One,
            PortDirection::Output => policy,
        };
        Self {
            key,
            data_kind,
            policy,
            caption: String::new(),
            caption_visible: false,
            connections: Vec::new(),
        }
    }

    pub fn key(&self) -> PortKey {
        self.key
    }

    pub fn node(&self) -> NodeId {
        self.key.node
    }

    pub fn direction(&self) -> PortDirection {
        self.key.direction
    }

    pub fn index(&self) -> PortIndex {
        self.key.index
    }

    pub fn data_kind(&self) -> &DataKind {
        &self.data_kind
    }

    pub fn policy(&self) -> ConnectionPolicy {
        self.policy
    }

    /// Checks if this port is an input
    pub fn is_input(&self) -> bool {
        matches!(self.key.direction, PortDirection::Input)
    }

    /// Checks if this port is an output
    pub fn is_output(&self) -> bool {
        matches!(self.key.direction, PortDirection::Output)
    }

    /// Attached connections in attachment order
    pub fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }

    pub fn has_connection(&self, connection: ConnectionId) -> bool {
        self.connections.contains(&connection)
    }

    pub fn can_accept_new_connection(&self) -> bool {
        self.connections.is_empty()
            || (self.is_output() && self.policy == ConnectionPolicy::Many)
    }

    /// Label for the UI: the caption when visible, the kind name otherwise
    pub fn display_text(&self) -> &str {
        if self.caption_visible {
            &self.caption
        } else {
            &self.data_kind.name
        }
    }

    pub fn add_connection(&mut self, connection: ConnectionId) -> GraphResult<()> {
        if self.has_connection(connection) {
            return Err(GraphError::DuplicateConnection {
                port: self.key,
                connection,
            });
        }
        self.connections.push(connection);
        Ok(())
    }

    /// Returns whether the connection was attached
    pub fn remove_connection(&mut self, connection: ConnectionId) -> bool {
        match self.connections.iter().position(|c| *c == connection) {
            Some(position) => {
                self.connections.remove(position);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind() -> DataKind {
        DataKind::new("x", "X")
    }

    #[test]
    fn test_input_port_forces_single_policy() {
        let node = NodeId::new();
        let port = Port::new(PortKey::input(node, 0), kind(), ConnectionPolicy::Many);
        assert_eq!(port.policy(), ConnectionPolicy::One);
        assert!(port.is_input());
    }

    #[test]
    fn test_capacity() {
        let node = NodeId::new();
        let mut input = Port::new(PortKey::input(node, 0), kind(), ConnectionPolicy::One);
        let mut many = Port::new(PortKey::output(node, 0), kind(), ConnectionPolicy::Many);
        let mut one = Port::new(PortKey::output(node, 1), kind(), ConnectionPolicy::One);

        for port in [&mut input, &mut many, &mut one] {
            assert!(port.can_accept_new_connection());
            port.add_connection(ConnectionId::new()).unwrap();
        }

        assert!(!input.can_accept_new_connection());
        assert!(many.can_accept_new_connection());
        assert!(!one.can_accept_new_connection());
    }

    #[test]
    fn test_duplicate_and_idempotent_removal() {
        let node = NodeId::new();
        let mut port = Port::new(PortKey::output(node, 0), kind(), ConnectionPolicy::Many);
        let connection = ConnectionId::new();

        port.add_connection(connection).unwrap();
        assert!(matches!(
            port.add_connection(connection),
            Err(GraphError::DuplicateConnection { .. })
        ));

        assert!(port.remove_connection(connection));
        assert!(!port.remove_connection(connection));
        assert!(port.connections().is_empty());
    }

    #[test]
    fn test_display_text_falls_back_to_kind_name() {
        let node = NodeId::new();
        let mut port = Port::new(PortKey::input(node, 0), kind(), ConnectionPolicy::One);
        port.caption = "Value".into();
        assert_eq!(port.display_text(), "X");
        port.caption_visible = true;
        assert_eq!(port.display_text(), "Value");
    }
}
