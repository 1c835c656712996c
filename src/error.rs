//! Error types for graph and connection operations
//!
//! Connection validation failures are expected outcomes of a drag gesture and
//! live in their own enum so callers can branch on them. Everything else is a
//! [`GraphError`].

use crate::nodes::{ConnectionId, DataKind, NodeId, PortDirection, PortKey};
use thiserror::Error;

/// Why a connection attempt was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionFailure {
    /// The connection already has both endpoints
    #[error("connection {0} does not require a port")]
    NoPortRequired(ConnectionId),

    /// Both ends would sit on the same node
    #[error("cannot connect node {0} to itself")]
    SelfConnection(NodeId),

    /// The pointer is not over a port of the required direction
    #[error("no {direction} port of node {node} under the connection point")]
    NoPortAtPoint { node: NodeId, direction: PortDirection },

    /// The candidate port has no spare capacity
    #[error("port {0} cannot accept another connection")]
    PortFull(PortKey),

    /// Completing the edge would close a loop
    #[error("connecting {output} to {input} would introduce a cycle")]
    WouldCreateCycle { output: NodeId, input: NodeId },

    /// Kinds differ and no converter is registered
    #[error("{output} cannot be converted to {input}")]
    IncompatibleTypes { output: DataKind, input: DataKind },
}

/// Errors raised by the scene, its registries and persistence.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("unknown node kind: {0}")]
    UnknownKind(String),

    #[error("connection {connection} already registered on port {port}")]
    DuplicateConnection { port: PortKey, connection: ConnectionId },

    #[error("port {port} does not belong to node {node}")]
    WrongOwner { port: PortKey, node: NodeId },

    #[error("port {0} is not an input port")]
    NotAnInput(PortKey),

    #[error("{direction} end of connection {connection} is already set")]
    PortAlreadySet { connection: ConnectionId, direction: PortDirection },

    #[error("{direction} end of connection {connection} is not set")]
    PortNotSet { connection: ConnectionId, direction: PortDirection },

    #[error("connection {0} is not complete")]
    ConnectionIncomplete(ConnectionId),

    #[error("cannot connect two {0} ports")]
    PortsOfSameDirection(PortDirection),

    #[error("cannot connect port {0} to itself")]
    SamePort(PortKey),

    #[error("ports {output} and {input} are already connected")]
    PortsAlreadyConnected { output: PortKey, input: PortKey },

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),

    #[error("unknown port {0}")]
    UnknownPort(PortKey),

    #[error("node creation is disabled for this scene")]
    NodeCreationDisabled,

    #[error("node deletion is disabled for this scene")]
    NodeDeletionDisabled,

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("scene is inconsistent: {0}")]
    Inconsistent(String),

    #[error(transparent)]
    Connection(#[from] ConnectionFailure),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    /// The connection validation failure wrapped by this error, if any
    pub fn connection_failure(&self) -> Option<&ConnectionFailure> {
        match self {
            GraphError::Connection(failure) => Some(failure),
            _ => None,
        }
    }
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;
