//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

use nodle_flow::nodes::math::register_calculator_kinds;
use nodle_flow::nodes::{
    DataKind, DataUpdates, ModelState, Node, NodeCategory, NodeData, NodeDataModel, NodeId, NodeRegistry, PortDirection,
    PortIndex, Scene, TypeConverterRegistry,
};
use nodle_flow::{ConnectionFailure, GraphResult};
use serde_json::{json, Value};

pub fn x_kind() -> DataKind {
    DataKind::new("x", "X")
}

/// No inputs, one output holding a fixed value
pub struct Source {
    value: Option<NodeData>,
}

impl NodeDataModel for Source {
    fn num_ports(&self, direction: PortDirection) -> usize {
        match direction {
            PortDirection::Input => 0,
            PortDirection::Output => 1,
        }
    }

    fn data_kind(&self, _direction: PortDirection, _index: PortIndex) -> DataKind {
        x_kind()
    }

    fn set_input(&mut self, _data: Option<NodeData>, _port: PortIndex, _updates: &mut DataUpdates) {}

    fn get_output(&self, _port: PortIndex) -> Option<NodeData> {
        self.value.clone()
    }

    fn save(&self) -> ModelState {
        let mut state = ModelState::new();
        state.insert("value".to_string(), json!(self.value));
        state
    }

    fn restore(&mut self, state: &ModelState) -> GraphResult<()> {
        if let Some(value) = state.get("value") {
            self.value = serde_json::from_value(value.clone())?;
        }
        Ok(())
    }
}

/// One input, no outputs; remembers every value it was handed
#[derive(Default)]
pub struct Sink {
    received: Vec<Option<NodeData>>,
}

impl NodeDataModel for Sink {
    fn num_ports(&self, direction: PortDirection) -> usize {
        match direction {
            PortDirection::Input => 1,
            PortDirection::Output => 0,
        }
    }

    fn data_kind(&self, _direction: PortDirection, _index: PortIndex) -> DataKind {
        x_kind()
    }

    fn set_input(&mut self, data: Option<NodeData>, _port: PortIndex, _updates: &mut DataUpdates) {
        self.received.push(data);
    }

    fn get_output(&self, _port: PortIndex) -> Option<NodeData> {
        None
    }

    fn save(&self) -> ModelState {
        let mut state = ModelState::new();
        state.insert("received".to_string(), json!(self.received));
        state
    }
}

/// One input, one output, forwards what it receives
#[derive(Default)]
pub struct Pass {
    value: Option<NodeData>,
}

impl NodeDataModel for Pass {
    fn num_ports(&self, _direction: PortDirection) -> usize {
        1
    }

    fn data_kind(&self, _direction: PortDirection, _index: PortIndex) -> DataKind {
        x_kind()
    }

    fn set_input(&mut self, data: Option<NodeData>, _port: PortIndex, updates: &mut DataUpdates) {
        self.value = data;
        updates.updated(0);
    }

    fn get_output(&self, _port: PortIndex) -> Option<NodeData> {
        self.value.clone()
    }
}

/// Two inputs, one output; the output is the first input that is set
#[derive(Default)]
pub struct Merge {
    inputs: [Option<NodeData>; 2],
}

impl NodeDataModel for Merge {
    fn num_ports(&self, direction: PortDirection) -> usize {
        match direction {
            PortDirection::Input => 2,
            PortDirection::Output => 1,
        }
    }

    fn data_kind(&self, _direction: PortDirection, _index: PortIndex) -> DataKind {
        x_kind()
    }

    fn set_input(&mut self, data: Option<NodeData>, port: PortIndex, updates: &mut DataUpdates) {
        if let Some(slot) = self.inputs.get_mut(port) {
            *slot = data;
            updates.updated(0);
        }
    }

    fn get_output(&self, _port: PortIndex) -> Option<NodeData> {
        self.inputs.iter().flatten().next().cloned()
    }
}

/// Registry with the Source, Sink, Pass and Merge test kinds
pub fn test_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register_kind(
        "Source",
        |args: &Value| {
            Box::new(Source {
                value: args.get("value").and_then(Value::as_f64).map(NodeData::Decimal),
            })
        },
        json!({ "value": 42.0 }),
        NodeCategory::data(),
    );
    registry.register_kind("Sink", |_| Box::new(Sink::default()), Value::Null, NodeCategory::output());
    registry.register_kind("Pass", |_| Box::new(Pass::default()), Value::Null, NodeCategory::data());
    registry.register_kind("Merge", |_| Box::new(Merge::default()), Value::Null, NodeCategory::data());
    registry
}

pub fn test_scene() -> Scene {
    Scene::new(test_registry(), TypeConverterRegistry::new())
}

/// Scene with the calculator kinds and the decimal/integer converters
pub fn calculator_scene() -> Scene {
    let mut registry = NodeRegistry::new();
    let mut converters = TypeConverterRegistry::new();
    register_calculator_kinds(&mut registry, &mut converters);
    Scene::new(registry, converters)
}

/// Calculator kinds without any converter
pub fn calculator_scene_without_converters() -> Scene {
    let mut registry = NodeRegistry::new();
    register_calculator_kinds(&mut registry, &mut TypeConverterRegistry::new());
    Scene::new(registry, TypeConverterRegistry::new())
}

/// Values a Sink has been handed, oldest first
pub fn received(scene: &Scene, sink: NodeId) -> Vec<Option<NodeData>> {
    let state = scene.node(sink).expect("sink exists").model().save();
    serde_json::from_value(state["received"].clone()).expect("sink state")
}

/// Edit the `number` of a calculator source the way an editor widget would
pub fn set_number(scene: &mut Scene, id: NodeId, number: Value) {
    let mut state = ModelState::new();
    state.insert("number".to_string(), number);
    scene
        .update_model(id, |model, updates| {
            model.restore(&state).map(|()| updates.updated(0))
        })
        .expect("node exists")
        .expect("number accepted");
}

pub fn output(scene: &Scene, id: NodeId, index: PortIndex) -> Option<NodeData> {
    scene.node(id).expect("node exists").model().get_output(index)
}

/// Port locator that always picks the first port
pub fn first_port(_node: &Node, _direction: PortDirection, _point: glam::Vec2) -> Option<PortIndex> {
    Some(0)
}

pub fn failure<T: std::fmt::Debug>(result: GraphResult<T>) -> ConnectionFailure {
    result
        .expect_err("operation should fail")
        .connection_failure()
        .cloned()
        .expect("connection failure")
}
