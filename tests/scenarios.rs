//! Integration tests for the scene workflows
//!
//! These tests drive the public API the way an editor would:
//! - Connecting nodes directly and through the drag protocol
//! - Rejecting self loops, cycles and mismatched kinds
//! - Deleting nodes and connections
//! - Dependency ordering and persistence

mod common;

use common::*;
use glam::Vec2;
use nodle_flow::nodes::math::{decimal_kind, functions, integer_kind};
use nodle_flow::nodes::{
    GraphSnapshot, NodeConnectionInteraction, NodeData, NodeId, NodeValidationState, PortDirection, PortKey, Scene,
    SceneEvent,
};
use nodle_flow::{ConnectionFailure, GraphError, SceneConfig};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn record_events(scene: &mut Scene) -> Rc<RefCell<Vec<SceneEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    scene.add_observer(move |_: &Scene, event: &SceneEvent| sink.borrow_mut().push(event.clone()));
    events
}

fn chain(scene: &mut Scene) -> (NodeId, NodeId, NodeId) {
    let a = scene.create_node("Pass").unwrap();
    let b = scene.create_node("Pass").unwrap();
    let c = scene.create_node("Pass").unwrap();
    scene.create_connection_by_index(b, 0, a, 0, None).unwrap();
    scene.create_connection_by_index(c, 0, b, 0, None).unwrap();
    (a, b, c)
}

#[test]
fn test_source_value_reaches_sink_on_connect() {
    let mut scene = test_scene();
    let source = scene.create_node("Source").unwrap();
    let sink = scene.create_node("Sink").unwrap();

    scene.create_connection_by_index(sink, 0, source, 0, None).unwrap();

    assert_eq!(scene.connection_count(), 1);
    assert_eq!(received(&scene, sink), vec![Some(NodeData::Decimal(42.0))]);
    scene.validate().unwrap();
}

#[test]
fn test_self_loop_is_rejected() {
    let mut scene = test_scene();
    let node = scene.create_node("Pass").unwrap();

    assert_eq!(
        failure(scene.create_connection_by_index(node, 0, node, 0, None)),
        ConnectionFailure::SelfConnection(node)
    );
    assert_eq!(scene.connection_count(), 0);

    let pending = scene.create_connection(PortKey::output(node, 0), None, None).unwrap();
    let interaction = NodeConnectionInteraction::new(node, pending);
    assert_eq!(
        failure(interaction.try_connect(&mut scene, &first_port, Vec2::ZERO)),
        ConnectionFailure::SelfConnection(node)
    );
    assert!(!scene.connection(pending).unwrap().is_complete());
    scene.validate().unwrap();
}

#[test]
fn test_cycle_is_rejected_and_topology_kept() {
    let mut scene = test_scene();
    let (a, _b, c) = chain(&mut scene);
    let before = scene.save();

    assert_eq!(
        failure(scene.create_connection_by_index(a, 0, c, 0, None)),
        ConnectionFailure::WouldCreateCycle { output: c, input: a }
    );
    assert_eq!(scene.save(), before);

    // Same check when the loop is closed by dragging
    let pending = scene.create_connection(PortKey::output(c, 0), None, None).unwrap();
    let interaction = NodeConnectionInteraction::new(a, pending);
    assert_eq!(
        failure(interaction.can_connect(&scene, &first_port, Vec2::ZERO)),
        ConnectionFailure::WouldCreateCycle { output: c, input: a }
    );
    scene.delete_connection(pending).unwrap();
    assert_eq!(scene.save(), before);
}

#[test]
fn test_cycle_detection_applies_when_dragging_from_an_input() {
    let mut scene = test_scene();
    let (a, _b, c) = chain(&mut scene);

    // Drag starts on a's input and is dropped on c's output
    let pending = scene.create_connection(PortKey::input(a, 0), None, None).unwrap();
    let interaction = NodeConnectionInteraction::new(c, pending);
    assert_eq!(
        failure(interaction.can_connect(&scene, &first_port, Vec2::ZERO)),
        ConnectionFailure::WouldCreateCycle { output: c, input: a }
    );
}

#[test]
fn test_mismatched_kinds_need_a_converter() {
    let mut scene = calculator_scene_without_converters();
    let decimal = scene.create_node("NumberSource").unwrap();
    let divisor = scene.create_node("IntegerSource").unwrap();
    let modulo = scene.create_node("Modulo").unwrap();
    set_number(&mut scene, decimal, json!(7.9));
    set_number(&mut scene, divisor, json!(3));
    scene.create_connection_by_index(modulo, 1, divisor, 0, None).unwrap();

    assert_eq!(
        failure(scene.create_connection_by_index(modulo, 0, decimal, 0, None)),
        ConnectionFailure::IncompatibleTypes {
            output: decimal_kind(),
            input: integer_kind(),
        }
    );
    assert_eq!(scene.connection_count(), 1);

    scene
        .converters_mut()
        .register(decimal_kind(), integer_kind(), functions::decimal_to_integer);
    let id = scene.create_connection_by_index(modulo, 0, decimal, 0, None).unwrap();

    // 7.9 arrives as 7, so the remainder is an integer
    assert!(scene.connection(id).unwrap().type_converter().is_some());
    assert_eq!(output(&scene, modulo, 0), Some(NodeData::Integer(1)));
}

#[test]
fn test_dragged_connection_uses_registered_converter() {
    let mut scene = calculator_scene();
    let number = scene.create_node("NumberSource").unwrap();
    let one = scene.create_node("IntegerSource").unwrap();
    let modulo = scene.create_node("Modulo").unwrap();
    set_number(&mut scene, number, json!(9.5));
    set_number(&mut scene, one, json!(4));
    scene.create_connection_by_index(modulo, 1, one, 0, None).unwrap();

    let pending = scene.create_connection(PortKey::output(number, 0), None, None).unwrap();
    let interaction = NodeConnectionInteraction::new(modulo, pending);
    let candidate = interaction.can_connect(&scene, &first_port, Vec2::ZERO).unwrap();
    assert_eq!(candidate.port, PortKey::input(modulo, 0));
    assert!(candidate.converter.is_some());

    interaction.try_connect(&mut scene, &first_port, Vec2::ZERO).unwrap();
    assert_eq!(output(&scene, modulo, 0), Some(NodeData::Integer(1)));
    scene.validate().unwrap();
}

#[test]
fn test_removing_node_severs_connections_first() {
    let mut scene = test_scene();
    let source = scene.create_node("Source").unwrap();
    let middle = scene.create_node("Pass").unwrap();
    let sink = scene.create_node("Sink").unwrap();
    let upstream = scene.create_connection_by_index(middle, 0, source, 0, None).unwrap();
    let downstream = scene.create_connection_by_index(sink, 0, middle, 0, None).unwrap();

    let present_during_deletes = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&present_during_deletes);
    scene.add_observer(move |scene: &Scene, event: &SceneEvent| {
        if let SceneEvent::ConnectionDeleted(_) = event {
            seen.borrow_mut().push(scene.contains_node(middle));
        }
    });

    scene.remove_node(middle).unwrap();

    assert_eq!(*present_during_deletes.borrow(), vec![true, true]);
    assert!(!scene.contains_node(middle));
    assert!(!scene.contains_connection(upstream));
    assert!(!scene.contains_connection(downstream));
    assert!(scene.port(PortKey::output(source, 0)).unwrap().connections().is_empty());
    assert!(scene.port(PortKey::input(sink, 0)).unwrap().connections().is_empty());
    assert_eq!(received(&scene, sink).last(), Some(&None));
    scene.validate().unwrap();
}

#[test]
fn test_node_deleted_is_announced_with_topology_intact() {
    let mut scene = test_scene();
    let (a, b, c) = chain(&mut scene);

    let attached = Rc::new(RefCell::new(0));
    let count = Rc::clone(&attached);
    scene.add_observer(move |scene: &Scene, event: &SceneEvent| {
        if *event == SceneEvent::NodeDeleted(b) {
            *count.borrow_mut() = scene.node(b).map_or(0, |node| node.all_connections().len());
        }
    });

    scene.remove_node(b).unwrap();
    assert_eq!(*attached.borrow(), 2);
    assert!(!scene.contains_node(b));
    assert!(!scene.has_any_connection_to(a, c));
}

#[test]
fn test_diamond_dependency_order() {
    let mut scene = test_scene();
    // Created out of order on purpose
    let d = scene.create_node("Merge").unwrap();
    let c = scene.create_node("Pass").unwrap();
    let b = scene.create_node("Pass").unwrap();
    let a = scene.create_node("Source").unwrap();
    scene.create_connection_by_index(b, 0, a, 0, None).unwrap();
    scene
        .create_connection(PortKey::output(a, 0), Some(PortKey::input(c, 0)), None)
        .unwrap();
    scene.create_connection_by_index(d, 0, b, 0, None).unwrap();
    scene.create_connection_by_index(d, 1, c, 0, None).unwrap();

    let order = scene.dependency_order();
    let at = |id: NodeId| order.iter().position(|n| *n == id).unwrap();
    assert_eq!(order.len(), 4);
    assert!(at(a) < at(b) && at(a) < at(c));
    assert!(at(b) < at(d) && at(c) < at(d));
    assert_eq!(output(&scene, d, 0), Some(NodeData::Decimal(42.0)));
}

#[test]
fn test_delete_connection_is_idempotent() {
    let mut scene = test_scene();
    let source = scene.create_node("Source").unwrap();
    let sink = scene.create_node("Sink").unwrap();
    let id = scene.create_connection_by_index(sink, 0, source, 0, None).unwrap();

    assert!(scene.delete_connection(id).unwrap());
    assert!(!scene.delete_connection(id).unwrap());
    assert_eq!(received(&scene, sink), vec![Some(NodeData::Decimal(42.0)), None]);
}

#[test]
fn test_input_port_accepts_one_connection() {
    let mut scene = test_scene();
    let first = scene.create_node("Source").unwrap();
    let second = scene.create_node("Source").unwrap();
    let sink = scene.create_node("Sink").unwrap();
    scene.create_connection_by_index(sink, 0, first, 0, None).unwrap();

    assert_eq!(
        failure(scene.create_connection_by_index(sink, 0, second, 0, None)),
        ConnectionFailure::PortFull(PortKey::input(sink, 0))
    );
    // Outputs fan out freely
    let other = scene.create_node("Sink").unwrap();
    scene.create_connection_by_index(other, 0, first, 0, None).unwrap();
    assert_eq!(scene.port(PortKey::output(first, 0)).unwrap().connections().len(), 2);
}

#[test]
fn test_duplicate_edge_is_rejected() {
    let mut scene = test_scene();
    let source = scene.create_node("Source").unwrap();
    let merge = scene.create_node("Merge").unwrap();
    scene.create_connection_by_index(merge, 0, source, 0, None).unwrap();

    let result = scene.create_connection_by_index(merge, 0, source, 0, None);
    assert!(matches!(result, Err(GraphError::PortsAlreadyConnected { .. })));
}

#[test]
fn test_drag_events_follow_the_gesture() {
    let mut scene = test_scene();
    let source = scene.create_node("Source").unwrap();
    let sink = scene.create_node("Sink").unwrap();
    let events = record_events(&mut scene);

    let pending = scene.create_connection(PortKey::output(source, 0), None, None).unwrap();
    let interaction = NodeConnectionInteraction::new(sink, pending);
    interaction.hover(&mut scene, Vec2::ZERO).unwrap();
    assert!(scene.node(sink).unwrap().is_reacting());

    interaction.try_connect(&mut scene, &first_port, Vec2::ZERO).unwrap();
    assert!(!scene.node(sink).unwrap().is_reacting());
    assert_eq!(received(&scene, sink), vec![Some(NodeData::Decimal(42.0))]);

    interaction.disconnect(&mut scene, PortDirection::Input).unwrap();
    assert_eq!(received(&scene, sink).last(), Some(&None));

    let connection_events: Vec<SceneEvent> = events
        .borrow()
        .iter()
        .filter(|event| {
            matches!(
                event,
                SceneEvent::ConnectionCreated(_)
                    | SceneEvent::ConnectionCompleted(_)
                    | SceneEvent::ConnectionMadeIncomplete(_)
            )
        })
        .cloned()
        .collect();
    assert_eq!(
        connection_events,
        vec![
            SceneEvent::ConnectionCreated(pending),
            SceneEvent::ConnectionCompleted(pending),
            SceneEvent::ConnectionMadeIncomplete(pending),
        ]
    );
    scene.validate().unwrap();
}

#[test]
fn test_disconnect_requires_owning_node() {
    let mut scene = test_scene();
    let source = scene.create_node("Source").unwrap();
    let sink = scene.create_node("Sink").unwrap();
    let id = scene.create_connection_by_index(sink, 0, source, 0, None).unwrap();

    let wrong = NodeConnectionInteraction::new(source, id);
    assert!(matches!(
        wrong.disconnect(&mut scene, PortDirection::Input),
        Err(GraphError::WrongOwner { .. })
    ));
    assert!(scene.connection(id).unwrap().is_complete());
}

#[test]
fn test_save_and_load_round_trip() {
    let mut scene = calculator_scene();
    let a = scene.create_node("NumberSource").unwrap();
    let b = scene.create_node("NumberSource").unwrap();
    let add = scene.create_node("Addition").unwrap();
    let display = scene.create_node("NumberDisplay").unwrap();
    set_number(&mut scene, a, json!(1.5));
    set_number(&mut scene, b, json!(2.0));
    scene.set_node_position(add, Vec2::new(10.0, 20.0)).unwrap();
    scene.create_connection_by_index(add, 0, a, 0, None).unwrap();
    scene.create_connection_by_index(add, 1, b, 0, None).unwrap();
    scene.create_connection_by_index(display, 0, add, 0, None).unwrap();

    let json = scene.save().to_json().unwrap();
    let mut restored = calculator_scene();
    restored.load(&GraphSnapshot::from_json(&json).unwrap()).unwrap();

    assert_eq!(restored.node_count(), 4);
    assert_eq!(restored.connection_count(), 3);
    assert_eq!(restored.node(add).unwrap().position(), Vec2::new(10.0, 20.0));
    assert_eq!(restored.node(display).unwrap().kind_name(), "NumberDisplay");
    assert!(restored.ports_connected(PortKey::output(add, 0), PortKey::input(display, 0)));
    assert_eq!(output(&restored, add, 0), Some(NodeData::Decimal(3.5)));
    assert_eq!(restored.save(), scene.save());
    restored.validate().unwrap();
}

#[test]
fn test_converter_survives_round_trip() {
    let mut scene = calculator_scene();
    let number = scene.create_node("NumberSource").unwrap();
    let modulo = scene.create_node("Modulo").unwrap();
    let id = scene.create_connection_by_index(modulo, 0, number, 0, None).unwrap();
    assert!(scene.connection(id).unwrap().type_converter().is_some());

    let snapshot = scene.save();
    let record = snapshot.connections[0].converter.as_ref().unwrap();
    assert_eq!(record.output, decimal_kind());
    assert_eq!(record.input, integer_kind());

    let mut restored = calculator_scene();
    restored.load(&snapshot).unwrap();
    assert!(restored.iter_connections().all(|c| c.type_converter().is_some()));
}

#[test]
fn test_failed_load_leaves_scene_untouched() {
    let mut scene = test_scene();
    let (a, b, c) = chain(&mut scene);
    let before = scene.save();
    let source_id = a.to_string();

    let mut unknown_kind = before.clone();
    unknown_kind.nodes[0].kind.insert("name".into(), json!("Nope"));
    assert!(matches!(scene.load(&unknown_kind), Err(GraphError::UnknownKind(_))));

    let mut dangling = before.clone();
    dangling.connections[0].out_id = NodeId::new().to_string();
    assert!(matches!(scene.load(&dangling), Err(GraphError::UnknownNode(_))));

    let mut bad_id = before.clone();
    bad_id.nodes[0].id = "not-a-uuid".to_string();
    assert!(matches!(scene.load(&bad_id), Err(GraphError::InvalidSnapshot(_))));

    let mut duplicated = before.clone();
    duplicated.nodes[1].id = source_id;
    assert!(matches!(scene.load(&duplicated), Err(GraphError::InvalidSnapshot(_))));

    assert_eq!(scene.save(), before);
    for id in [a, b, c] {
        assert!(scene.contains_node(id));
    }
}

#[test]
fn test_load_replaces_content_and_announces_it() {
    let mut scene = test_scene();
    let (_a, _b, _c) = chain(&mut scene);
    let snapshot = scene.save();

    let mut other = test_scene();
    other.create_node("Sink").unwrap();
    let events = record_events(&mut other);
    other.load(&snapshot).unwrap();

    assert_eq!(other.node_count(), 3);
    let created = events
        .borrow()
        .iter()
        .filter(|event| matches!(event, SceneEvent::NodeCreated(_)))
        .count();
    let deleted = events
        .borrow()
        .iter()
        .filter(|event| matches!(event, SceneEvent::NodeDeleted(_)))
        .count();
    assert_eq!((created, deleted), (3, 1));
}

#[test]
fn test_config_gates_creation_and_deletion() {
    let config = SceneConfig {
        allow_node_creation: false,
        ..SceneConfig::default()
    };
    let mut scene = Scene::with_config(test_registry(), Default::default(), config);
    assert!(matches!(scene.create_node("Pass"), Err(GraphError::NodeCreationDisabled)));

    scene.config_mut().allow_node_creation = true;
    scene.config_mut().allow_node_deletion = false;
    let id = scene.create_node("Pass").unwrap();
    assert!(matches!(scene.remove_node(id), Err(GraphError::NodeDeletionDisabled)));
    scene.clear().unwrap();
    assert_eq!(scene.node_count(), 0);
}

#[test]
fn test_division_by_zero_reports_error_state() {
    let mut scene = calculator_scene();
    let a = scene.create_node("NumberSource").unwrap();
    let b = scene.create_node("NumberSource").unwrap();
    let division = scene.create_node("Division").unwrap();
    scene.create_connection_by_index(division, 0, a, 0, None).unwrap();
    scene.create_connection_by_index(division, 1, b, 0, None).unwrap();
    set_number(&mut scene, a, json!(5.0));
    set_number(&mut scene, b, json!(0.0));

    let model = scene.node(division).unwrap().model();
    assert_eq!(model.validation_state(), NodeValidationState::Error);
    assert_eq!(model.get_output(0), None);

    set_number(&mut scene, b, json!(2.0));
    assert_eq!(output(&scene, division, 0), Some(NodeData::Decimal(2.5)));
}

#[test]
fn test_clear_severs_connections_before_removing_nodes() {
    let mut scene = test_scene();
    let source = scene.create_node("Source").unwrap();
    let sink = scene.create_node("Sink").unwrap();
    scene.create_connection_by_index(sink, 0, source, 0, None).unwrap();
    let events = record_events(&mut scene);

    // Observers can still read the sink while it is being deleted
    let last_seen = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&last_seen);
    scene.add_observer(move |scene: &Scene, event: &SceneEvent| {
        if *event == SceneEvent::NodeDeleted(sink) {
            seen.borrow_mut().push(received(scene, sink).last().cloned().flatten());
        }
    });

    scene.clear().unwrap();

    assert_eq!(scene.node_count(), 0);
    assert_eq!(scene.connection_count(), 0);
    assert_eq!(*last_seen.borrow(), vec![None]);

    let events = events.borrow();
    let last_connection_deleted = events
        .iter()
        .rposition(|event| matches!(event, SceneEvent::ConnectionDeleted(_)))
        .expect("connection deleted");
    let first_node_deleted = events
        .iter()
        .position(|event| matches!(event, SceneEvent::NodeDeleted(_)))
        .expect("node deleted");
    assert!(last_connection_deleted < first_node_deleted);
}

#[test]
fn test_disconnect_requires_a_complete_connection() {
    let mut scene = test_scene();
    let source = scene.create_node("Source").unwrap();
    let sink = scene.create_node("Sink").unwrap();
    let pending = scene.create_connection(PortKey::output(source, 0), None, None).unwrap();

    let interaction = NodeConnectionInteraction::new(source, pending);
    let result = interaction.disconnect(&mut scene, PortDirection::Output);
    assert!(matches!(result, Err(GraphError::ConnectionIncomplete(id)) if id == pending));

    let connection = scene.connection(pending).unwrap();
    assert_eq!(connection.port(PortDirection::Output), Some(PortKey::output(source, 0)));
    assert_eq!(connection.required_direction(), Some(PortDirection::Input));
    scene.validate().unwrap();

    // The gesture can still be finished
    NodeConnectionInteraction::new(sink, pending)
        .try_connect(&mut scene, &first_port, Vec2::ZERO)
        .unwrap();
    assert_eq!(received(&scene, sink), vec![Some(NodeData::Decimal(42.0))]);
}

#[test]
fn test_loop_without_cycle_checks_settles() {
    let config = SceneConfig {
        check_cycles: false,
        ..SceneConfig::default()
    };
    let mut scene = Scene::with_config(test_registry(), Default::default(), config);
    let source = scene.create_node("Source").unwrap();
    let merge = scene.create_node("Merge").unwrap();
    let pass = scene.create_node("Pass").unwrap();
    scene.create_connection_by_index(merge, 0, source, 0, None).unwrap();
    scene.create_connection_by_index(pass, 0, merge, 0, None).unwrap();

    scene.create_connection_by_index(merge, 1, pass, 0, None).unwrap();

    assert_eq!(scene.connection_count(), 3);
    assert_eq!(output(&scene, pass, 0), Some(NodeData::Decimal(42.0)));
    assert!(matches!(scene.validate(), Err(GraphError::Inconsistent(_))));

    // Values keep flowing around the loop once per edit
    let mut state = nodle_flow::nodes::ModelState::new();
    state.insert("value".to_string(), json!(Some(NodeData::Decimal(7.0))));
    scene
        .update_model(source, |model, updates| model.restore(&state).map(|()| updates.updated(0)))
        .unwrap()
        .unwrap();
    assert_eq!(output(&scene, pass, 0), Some(NodeData::Decimal(7.0)));
}
