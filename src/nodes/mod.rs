//! Node system - graph model, connection protocol and node kinds

// Core node system modules
pub mod connection;
pub mod converter;
pub mod data;
pub mod events;
pub mod factory;
pub mod geometry;
pub mod graph;
pub mod interaction;
pub mod model;
pub mod node;
pub mod port;
pub mod serialization;

// Calculator node kinds
pub mod math;

// Re-export core types
pub use connection::{Connection, ConnectionId, ConnectionState};
pub use converter::{TypeConverter, TypeConverterRegistry};
pub use data::{DataKind, NodeData};
pub use events::{SceneEvent, SceneObserver};
pub use graph::Scene;
pub use model::{DataUpdates, ModelState, NodeDataModel, NodeValidationState};
pub use node::{Node, NodeId, NodeReaction};
pub use port::{ConnectionPolicy, Port, PortDirection, PortIndex, PortKey};

// Re-export factory types
pub use factory::{NodeCategory, NodeFactory, NodeMetadata, NodeRegistry};

// Re-export interaction types
pub use geometry::PortLayout;
pub use interaction::{ConnectionCandidate, NodeConnectionInteraction, PortLocator};
pub use serialization::{ConnectionRecord, ConverterRecord, GraphSnapshot, NodeRecord, Position};
