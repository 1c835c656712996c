//! Drag-to-connect protocol between a pending connection and a node
//!
//! The renderer resolves pointer positions; this module decides whether the
//! dragged end may attach to a port of the hovered node and performs the
//! attachment. Validation runs six checks in a fixed order and reports the
//! first one that fails.

use super::connection::ConnectionId;
use super::converter::TypeConverter;
use super::graph::Scene;
use super::node::{Node, NodeId};
use super::port::{PortDirection, PortIndex, PortKey};
use crate::error::{ConnectionFailure, GraphError, GraphResult};
use glam::Vec2;
use log::{debug, info};

/// Resolves which port of a node lies under a scene point
pub trait PortLocator {
    fn port_at(&self, node: &Node, direction: PortDirection, point: Vec2) -> Option<PortIndex>;
}

impl<F> PortLocator for F
where
    F: Fn(&Node, PortDirection, Vec2) -> Option<PortIndex>,
{
    fn port_at(&self, node: &Node, direction: PortDirection, point: Vec2) -> Option<PortIndex> {
        self(node, direction, point)
    }
}

/// Outcome of a successful validation
#[derive(Debug, Clone)]
pub struct ConnectionCandidate {
    pub port: PortKey,
    /// `None` when the kinds already match
    pub converter: Option<TypeConverter>,
}

/// Interaction between one node and one connection being dragged over it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeConnectionInteraction {
    node: NodeId,
    connection: ConnectionId,
}

impl NodeConnectionInteraction {
    pub fn new(node: NodeId, connection: ConnectionId) -> Self {
        Self { node, connection }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    /// Validate attaching the dragged end to the port of `node` under `point`.
    ///
    /// Checks, in order: the connection requires a port; the node is not the
    /// one already on the other end; a port of the required direction is
    /// under the point; that port has capacity; the edge would not close a
    /// loop; the kinds match or a converter exists. Validation failures come
    /// back as [`GraphError::Connection`].
    pub fn can_connect(&self, scene: &Scene, locator: &dyn PortLocator, point: Vec2) -> GraphResult<ConnectionCandidate> {
        let connection = scene
            .connection(self.connection)
            .ok_or(GraphError::UnknownConnection(self.connection))?;
        let node = scene.node(self.node).ok_or(GraphError::UnknownNode(self.node))?;

        // 1
        let required = connection
            .required_direction()
            .ok_or(ConnectionFailure::NoPortRequired(self.connection))?;

        // 2
        let attached = connection.node(required.opposite());
        if attached == Some(self.node) {
            return Err(ConnectionFailure::SelfConnection(self.node).into());
        }

        // 3
        let index = locator
            .port_at(node, required, point)
            .ok_or(ConnectionFailure::NoPortAtPoint {
                node: self.node,
                direction: required,
            })?;
        let port = node
            .port(required, index)
            .ok_or(ConnectionFailure::NoPortAtPoint {
                node: self.node,
                direction: required,
            })?;

        // 4
        if !port.can_accept_new_connection() {
            return Err(ConnectionFailure::PortFull(port.key()).into());
        }

        // 5
        if let Some(attached) = attached {
            if scene.has_connection_to(self.node, attached, required.opposite()) {
                let (output, input) = match required {
                    PortDirection::Input => (attached, self.node),
                    PortDirection::Output => (self.node, attached),
                };
                return Err(ConnectionFailure::WouldCreateCycle { output, input }.into());
            }
        }

        // 6
        let connection_kind = scene.connection_data_kind(self.connection, required.opposite())?;
        let candidate_kind = port.data_kind();
        let (output_kind, input_kind) = match required {
            PortDirection::Input => (&connection_kind, candidate_kind),
            PortDirection::Output => (candidate_kind, &connection_kind),
        };
        let converter = scene.converters().resolve(output_kind, input_kind, None)?;

        Ok(ConnectionCandidate {
            port: port.key(),
            converter,
        })
    }

    /// Attach the dragged end if [`can_connect`](Self::can_connect) allows it.
    ///
    /// On failure the scene is left untouched and the failure is returned so
    /// the gesture can carry on or be abandoned. On success the output value
    /// is pushed across the new edge before returning.
    pub fn try_connect(&self, scene: &mut Scene, locator: &dyn PortLocator, point: Vec2) -> GraphResult<PortKey> {
        let candidate = match self.can_connect(scene, locator, point) {
            Ok(candidate) => candidate,
            Err(err) => {
                debug!("Cannot connect node {}: {:?}", self.node, err);
                info!("Cannot connect node: {}", err);
                return Err(err);
            }
        };

        scene.complete_connection(self.connection, candidate.port, candidate.converter)?;
        self.reset_hover(scene);
        Ok(candidate.port)
    }

    /// Detach the `direction` end of a complete connection from this node and
    /// return the connection to pending, so the drag can resume from that end.
    pub fn disconnect(&self, scene: &mut Scene, direction: PortDirection) -> GraphResult<PortKey> {
        let connection = scene
            .connection(self.connection)
            .ok_or(GraphError::UnknownConnection(self.connection))?;
        let (Some(input), Some(output)) = connection.ports() else {
            return Err(GraphError::ConnectionIncomplete(self.connection));
        };
        let port = match direction {
            PortDirection::Input => input,
            PortDirection::Output => output,
        };
        if port.node != self.node {
            return Err(GraphError::WrongOwner { port, node: self.node });
        }

        scene.sever(self.connection, direction)
    }

    /// Drag feedback: make the node react to the dragged connection and
    /// remember it as the last hovered node.
    pub fn hover(&self, scene: &mut Scene, pointer_position: Vec2) -> GraphResult<()> {
        let connection = scene
            .connection(self.connection)
            .ok_or(GraphError::UnknownConnection(self.connection))?;
        let Some(required) = connection.required_direction() else {
            return Ok(());
        };
        let kind = scene.connection_data_kind(self.connection, required.opposite())?;

        scene
            .node_mut(self.node)
            .ok_or(GraphError::UnknownNode(self.node))?
            .react_to_possible_connection(required, kind, pointer_position);

        let previous = scene
            .connection_mut(self.connection)
            .and_then(|connection| connection.set_last_hovered_node(Some(self.node)));
        if let Some(previous) = previous.filter(|previous| *previous != self.node) {
            if let Some(node) = scene.node_mut(previous) {
                node.reset_reaction();
            }
        }
        Ok(())
    }

    /// Clear the reaction of the last hovered node
    pub fn reset_hover(&self, scene: &mut Scene) {
        let previous = scene
            .connection_mut(self.connection)
            .and_then(|connection| connection.set_last_hovered_node(None));
        if let Some(node) = previous.and_then(|id| scene.node_mut(id)) {
            node.reset_reaction();
        }
    }
}
