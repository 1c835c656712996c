//! Number source nodes: no inputs, one output holding a user-entered value

use super::{decimal_kind, integer_kind};
use crate::error::{GraphError, GraphResult};
use crate::nodes::data::{DataKind, NodeData};
use crate::nodes::factory::{NodeCategory, NodeFactory, NodeMetadata};
use crate::nodes::model::{DataUpdates, ModelState, NodeDataModel};
use crate::nodes::port::{PortDirection, PortIndex};
use serde_json::{json, Value};

fn bad_field(kind: &str, value: &Value) -> GraphError {
    GraphError::InvalidSnapshot(format!("{} expects a numeric 'number', got {}", kind, value))
}

/// Emits a decimal number
#[derive(Debug, Clone, Default)]
pub struct NumberSourceModel {
    number: Option<f64>,
}

impl NumberSourceModel {
    pub fn new(number: Option<f64>) -> Self {
        Self { number }
    }

    pub fn number(&self) -> Option<f64> {
        self.number
    }

    /// Change the value, as an editor widget would
    pub fn set_number(&mut self, number: Option<f64>, updates: &mut DataUpdates) {
        self.number = number;
        updates.updated(0);
    }
}

impl NodeDataModel for NumberSourceModel {
    fn num_ports(&self, direction: PortDirection) -> usize {
        match direction {
            PortDirection::Input => 0,
            PortDirection::Output => 1,
        }
    }

    fn data_kind(&self, _direction: PortDirection, _index: PortIndex) -> DataKind {
        decimal_kind()
    }

    fn set_input(&mut self, _data: Option<NodeData>, _port: PortIndex, _updates: &mut DataUpdates) {}

    fn get_output(&self, _port: PortIndex) -> Option<NodeData> {
        self.number.map(NodeData::Decimal)
    }

    fn caption_visible(&self) -> bool {
        false
    }

    fn port_caption(&self, _direction: PortDirection, _index: PortIndex) -> String {
        "Result".to_string()
    }

    fn save(&self) -> ModelState {
        let mut state = ModelState::new();
        if let Some(number) = self.number {
            state.insert("number".to_string(), json!(number));
        }
        state
    }

    fn restore(&mut self, state: &ModelState) -> GraphResult<()> {
        if let Some(value) = state.get("number") {
            self.number = Some(value.as_f64().ok_or_else(|| bad_field("NumberSource", value))?);
        }
        Ok(())
    }
}

pub struct NumberSourceFactory;

impl NodeFactory for NumberSourceFactory {
    fn metadata() -> NodeMetadata {
        NodeMetadata::new("NumberSource", NodeCategory::data(), "Emits a decimal number")
            .with_default_args(json!({ "number": 0.0 }))
    }

    fn create(args: &Value) -> Box<dyn NodeDataModel> {
        Box::new(NumberSourceModel::new(args.get("number").and_then(Value::as_f64)))
    }
}

/// Emits an integer
#[derive(Debug, Clone, Default)]
pub struct IntegerSourceModel {
    number: Option<i64>,
}

impl IntegerSourceModel {
    pub fn new(number: Option<i64>) -> Self {
        Self { number }
    }

    pub fn number(&self) -> Option<i64> {
        self.number
    }

    pub fn set_number(&mut self, number: Option<i64>, updates: &mut DataUpdates) {
        self.number = number;
        updates.updated(0);
    }
}

impl NodeDataModel for IntegerSourceModel {
    fn num_ports(&self, direction: PortDirection) -> usize {
        match direction {
            PortDirection::Input => 0,
            PortDirection::Output => 1,
        }
    }

    fn data_kind(&self, _direction: PortDirection, _index: PortIndex) -> DataKind {
        integer_kind()
    }

    fn set_input(&mut self, _data: Option<NodeData>, _port: PortIndex, _updates: &mut DataUpdates) {}

    fn get_output(&self, _port: PortIndex) -> Option<NodeData> {
        self.number.map(NodeData::Integer)
    }

    fn caption_visible(&self) -> bool {
        false
    }

    fn save(&self) -> ModelState {
        let mut state = ModelState::new();
        if let Some(number) = self.number {
            state.insert("number".to_string(), json!(number));
        }
        state
    }

    fn restore(&mut self, state: &ModelState) -> GraphResult<()> {
        if let Some(value) = state.get("number") {
            self.number = Some(value.as_i64().ok_or_else(|| bad_field("IntegerSource", value))?);
        }
        Ok(())
    }
}

pub struct IntegerSourceFactory;

impl NodeFactory for IntegerSourceFactory {
    fn metadata() -> NodeMetadata {
        NodeMetadata::new("IntegerSource", NodeCategory::data(), "Emits an integer")
            .with_default_args(json!({ "number": 0 }))
    }

    fn create(args: &Value) -> Box<dyn NodeDataModel> {
        Box::new(IntegerSourceModel::new(args.get("number").and_then(Value::as_i64)))
    }
}
