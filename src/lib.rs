//! Nodle flow library
//!
//! Graph connectivity and interaction core for visual dataflow editors: nodes
//! with typed ports, drag-to-connect validation, eager data propagation and
//! scene persistence. Rendering is left to the embedding application.

pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod nodes;

// Re-export commonly used types
pub use config::SceneConfig;
pub use error::{ConnectionFailure, GraphError, GraphResult};
pub use nodes::{NodeConnectionInteraction, NodeRegistry, Scene, TypeConverterRegistry};
