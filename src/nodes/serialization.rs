//! Persisted form of a scene
//!
//! ```text
//! { "nodes": [ { "id", "kind": { "name", ... }, "position": { "x", "y" } } ],
//!   "connections": [ { "in_id", "in_index", "out_id", "out_index",
//!                      "converter"?: { "in": {id, name}, "out": {id, name} } } ] }
//! ```

use super::data::DataKind;
use super::model::ModelState;
use super::port::PortIndex;
use crate::error::{GraphError, GraphResult};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whole-scene snapshot: nodes first, then the complete connections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeRecord>,
    pub connections: Vec<ConnectionRecord>,
}

impl GraphSnapshot {
    pub fn to_json(&self) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2> for Position {
    fn from(value: Vec2) -> Self {
        Self { x: value.x, y: value.y }
    }
}

impl From<Position> for Vec2 {
    fn from(value: Position) -> Self {
        Vec2::new(value.x, value.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    /// `name` of the registered kind plus whatever the model saved
    pub kind: ModelState,
    pub position: Position,
}

impl NodeRecord {
    pub fn kind_name(&self) -> GraphResult<&str> {
        self.kind
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| GraphError::InvalidSnapshot(format!("node {} has no kind name", self.id)))
    }

    /// Kind record without the `name` entry, as handed to the model
    pub fn model_state(&self) -> ModelState {
        let mut state = self.kind.clone();
        state.remove("name");
        state
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub in_id: String,
    pub in_index: PortIndex,
    pub out_id: String,
    pub out_index: PortIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<ConverterRecord>,
}

/// Kinds of a converter as seen from the connection: `in` is the input side
/// (the converter's destination), `out` the output side (its source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterRecord {
    #[serde(rename = "in")]
    pub input: DataKind,
    #[serde(rename = "out")]
    pub output: DataKind,
}
