//! Two-input math node

use super::functions::{MathError, Operation};
use crate::nodes::data::{DataKind, NodeData};
use crate::nodes::model::{DataUpdates, NodeDataModel, NodeValidationState};
use crate::nodes::port::{PortDirection, PortIndex};

/// Applies an [`Operation`] to its two inputs whenever either changes
#[derive(Debug, Clone)]
pub struct MathOperationModel {
    operation: Operation,
    inputs: [Option<NodeData>; 2],
    result: Option<NodeData>,
    state: NodeValidationState,
    message: String,
}

impl MathOperationModel {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            inputs: [None, None],
            result: None,
            state: NodeValidationState::Warning,
            message: "Uninitialized".to_string(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    fn compute(&mut self) {
        let outcome = match &self.inputs {
            [Some(lhs), Some(rhs)] => self.operation.apply(lhs, rhs),
            _ => Err(MathError::IncorrectInputs),
        };

        match outcome {
            Ok(value) => {
                self.result = Some(value);
                self.state = NodeValidationState::Valid;
                self.message.clear();
            }
            Err(err) => {
                self.result = None;
                self.state = match err {
                    MathError::DivisionByZero => NodeValidationState::Error,
                    MathError::IncorrectInputs => NodeValidationState::Warning,
                };
                self.message = err.to_string();
            }
        }
    }
}

impl NodeDataModel for MathOperationModel {
    fn num_ports(&self, direction: PortDirection) -> usize {
        match direction {
            PortDirection::Input => 2,
            PortDirection::Output => 1,
        }
    }

    fn data_kind(&self, _direction: PortDirection, _index: PortIndex) -> DataKind {
        self.operation.data_kind()
    }

    fn set_input(&mut self, data: Option<NodeData>, port: PortIndex, updates: &mut DataUpdates) {
        if let Some(slot) = self.inputs.get_mut(port) {
            *slot = data;
            self.compute();
            updates.updated(0);
        }
    }

    fn get_output(&self, _port: PortIndex) -> Option<NodeData> {
        self.result.clone()
    }

    fn caption(&self) -> String {
        self.operation.name().to_string()
    }

    fn port_caption(&self, direction: PortDirection, index: PortIndex) -> String {
        self.operation.port_caption(direction, index).to_string()
    }

    fn port_caption_visible(&self, _direction: PortDirection, _index: PortIndex) -> bool {
        true
    }

    fn validation_state(&self) -> NodeValidationState {
        self.state
    }

    fn validation_message(&self) -> String {
        self.message.clone()
    }
}
