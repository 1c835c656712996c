//! Sink node showing the number it receives

use super::decimal_kind;
use crate::nodes::data::{DataKind, NodeData};
use crate::nodes::factory::{NodeCategory, NodeFactory, NodeMetadata};
use crate::nodes::model::{DataUpdates, NodeDataModel, NodeValidationState};
use crate::nodes::port::{PortDirection, PortIndex};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct NumberDisplayModel {
    number: Option<NodeData>,
}

impl NumberDisplayModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last received value
    pub fn number(&self) -> Option<&NodeData> {
        self.number.as_ref()
    }

    /// Label text; empty while no number is connected
    pub fn text(&self) -> String {
        self.number.as_ref().map(NodeData::to_string).unwrap_or_default()
    }
}

impl NodeDataModel for NumberDisplayModel {
    fn num_ports(&self, direction: PortDirection) -> usize {
        match direction {
            PortDirection::Input => 1,
            PortDirection::Output => 0,
        }
    }

    fn data_kind(&self, _direction: PortDirection, _index: PortIndex) -> DataKind {
        decimal_kind()
    }

    fn set_input(&mut self, data: Option<NodeData>, _port: PortIndex, _updates: &mut DataUpdates) {
        self.number = data;
    }

    fn get_output(&self, _port: PortIndex) -> Option<NodeData> {
        None
    }

    fn caption_visible(&self) -> bool {
        false
    }

    fn port_caption(&self, _direction: PortDirection, _index: PortIndex) -> String {
        "Number".to_string()
    }

    fn validation_state(&self) -> NodeValidationState {
        match self.number {
            Some(_) => NodeValidationState::Valid,
            None => NodeValidationState::Warning,
        }
    }

    fn validation_message(&self) -> String {
        match self.validation_state() {
            NodeValidationState::Valid => String::new(),
            _ => "Missing or incorrect inputs".to_string(),
        }
    }
}

pub struct NumberDisplayFactory;

impl NodeFactory for NumberDisplayFactory {
    fn metadata() -> NodeMetadata {
        NodeMetadata::new("NumberDisplay", NodeCategory::output(), "Shows the incoming number")
    }

    fn create(_args: &Value) -> Box<dyn NodeDataModel> {
        Box::new(NumberDisplayModel::new())
    }
}
