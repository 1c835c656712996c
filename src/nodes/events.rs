//! Change notifications raised by the scene
//!
//! Observers are called synchronously, in registration order, right after the
//! change they describe (or, for [`SceneEvent::NodeDeleted`], right before the
//! node's connections are severed). They get read access to the scene.

use super::connection::ConnectionId;
use super::graph::Scene;
use super::node::NodeId;
use super::port::PortKey;
use glam::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    NodeCreated(NodeId),
    /// Fired while the node and its connections are still in the scene
    NodeDeleted(NodeId),
    NodeMoved { node: NodeId, position: Vec2 },
    /// A connection entered the scene (complete or pending)
    ConnectionCreated(ConnectionId),
    /// A pending connection got its missing end
    ConnectionCompleted(ConnectionId),
    ConnectionMadeIncomplete(ConnectionId),
    ConnectionDeleted(ConnectionId),
    PortConnectionAdded { port: PortKey, connection: ConnectionId },
    PortConnectionRemoved { port: PortKey, connection: ConnectionId },
}

impl SceneEvent {
    /// Connection this event refers to, if any
    pub fn connection(&self) -> Option<ConnectionId> {
        match self {
            SceneEvent::ConnectionCreated(id)
            | SceneEvent::ConnectionCompleted(id)
            | SceneEvent::ConnectionMadeIncomplete(id)
            | SceneEvent::ConnectionDeleted(id) => Some(*id),
            SceneEvent::PortConnectionAdded { connection, .. }
            | SceneEvent::PortConnectionRemoved { connection, .. } => Some(*connection),
            _ => None,
        }
    }
}

/// Receiver of scene notifications
pub trait SceneObserver {
    fn on_event(&mut self, scene: &Scene, event: &SceneEvent);
}

impl<F> SceneObserver for F
where
    F: FnMut(&Scene, &SceneEvent),
{
    fn on_event(&mut self, scene: &Scene, event: &SceneEvent) {
        self(scene, event)
    }
}
