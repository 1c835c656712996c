//! The scene: sole owner of nodes and connections
//!
//! Nodes live in an arena keyed by [`NodeId`]; ports store connection ids and
//! connections store [`PortKey`]s, so every cross reference goes through the
//! scene. All mutation is synchronous: data pushed into a node settles through
//! the whole downstream graph before the call returns.

use super::connection::{Connection, ConnectionId};
use super::converter::{TypeConverter, TypeConverterRegistry};
use super::data::{DataKind, NodeData};
use super::events::{SceneEvent, SceneObserver};
use super::factory::NodeRegistry;
use super::model::{DataUpdates, NodeDataModel};
use super::node::{Node, NodeId};
use super::port::{Port, PortDirection, PortIndex, PortKey};
use super::serialization::{ConnectionRecord, ConverterRecord, GraphSnapshot, NodeRecord};
use crate::config::SceneConfig;
use crate::error::{ConnectionFailure, GraphError, GraphResult};
use glam::Vec2;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

pub struct Scene {
    config: SceneConfig,
    registry: NodeRegistry,
    converters: TypeConverterRegistry,
    nodes: HashMap<NodeId, Node>,
    node_order: Vec<NodeId>,
    connections: HashMap<ConnectionId, Connection>,
    connection_order: Vec<ConnectionId>,
    observers: Vec<Box<dyn SceneObserver>>,
    /// Nodes currently handling an incoming value, innermost last
    propagating: Vec<NodeId>,
}

impl Scene {
    pub fn new(registry: NodeRegistry, converters: TypeConverterRegistry) -> Self {
        Self::with_config(registry, converters, SceneConfig::default())
    }

    pub fn with_config(registry: NodeRegistry, converters: TypeConverterRegistry, config: SceneConfig) -> Self {
        Self {
            config,
            registry,
            converters,
            nodes: HashMap::new(),
            node_order: Vec::new(),
            connections: HashMap::new(),
            connection_order: Vec::new(),
            observers: Vec::new(),
            propagating: Vec::new(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SceneConfig {
        &mut self.config
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut NodeRegistry {
        &mut self.registry
    }

    pub fn converters(&self) -> &TypeConverterRegistry {
        &self.converters
    }

    pub fn converters_mut(&mut self) -> &mut TypeConverterRegistry {
        &mut self.converters
    }

    /// Register an observer; observers are notified in registration order
    pub fn add_observer<O: SceneObserver + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: SceneEvent) {
        if self.observers.is_empty() {
            return;
        }
        let mut observers = std::mem::take(&mut self.observers);
        for observer in observers.iter_mut() {
            observer.on_event(self, &event);
        }
        self.observers = observers;
    }

    // Lookup

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    fn require_node(&self, id: NodeId) -> GraphResult<&Node> {
        self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))
    }

    fn require_node_mut(&mut self, id: NodeId) -> GraphResult<&mut Node> {
        self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))
    }

    /// Port addressed by `key`
    pub fn port(&self, key: PortKey) -> GraphResult<&Port> {
        self.require_node(key.node)?
            .port(key.direction, key.index)
            .ok_or(GraphError::UnknownPort(key))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub(crate) fn connection_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        self.connections.get_mut(&id)
    }

    fn require_connection(&self, id: ConnectionId) -> GraphResult<&Connection> {
        self.connections.get(&id).ok_or(GraphError::UnknownConnection(id))
    }

    pub fn contains_connection(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Nodes in creation order
    pub fn iter_nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Models in creation order
    pub fn iter_models(&self) -> impl Iterator<Item = (NodeId, &dyn NodeDataModel)> {
        self.iter_nodes().map(|node| (node.id(), node.model()))
    }

    /// Connections in creation order, pending ones included
    pub fn iter_connections(&self) -> impl Iterator<Item = &Connection> {
        self.connection_order.iter().filter_map(|id| self.connections.get(id))
    }

    // Nodes

    /// Create a node of a registered kind
    pub fn create_node(&mut self, kind: &str) -> GraphResult<NodeId> {
        if !self.config.allow_node_creation {
            return Err(GraphError::NodeCreationDisabled);
        }
        let model = self.registry.create(kind)?;
        let id = self.insert_node(NodeId::new(), kind, model, Vec2::ZERO);
        info!("Created node {} of kind '{}'", id, kind);
        Ok(id)
    }

    fn insert_node(&mut self, id: NodeId, kind: &str, model: Box<dyn NodeDataModel>, position: Vec2) -> NodeId {
        let mut node = Node::new(id, kind, model);
        node.size = self.config.default_node_size;
        node.set_position(position);
        self.nodes.insert(id, node);
        self.node_order.push(id);
        self.emit(SceneEvent::NodeCreated(id));
        id
    }

    /// Delete a node after severing every connection attached to it
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<()> {
        if !self.config.allow_node_deletion {
            return Err(GraphError::NodeDeletionDisabled);
        }
        self.remove_node_unchecked(id)
    }

    fn remove_node_unchecked(&mut self, id: NodeId) -> GraphResult<()> {
        let attached = self.require_node(id)?.all_connections();

        self.emit(SceneEvent::NodeDeleted(id));
        for connection in attached {
            self.delete_connection(connection)?;
        }

        self.nodes.remove(&id);
        self.node_order.retain(|node| *node != id);
        debug!("Removed node {}", id);
        Ok(())
    }

    pub fn set_node_position(&mut self, id: NodeId, position: Vec2) -> GraphResult<()> {
        self.require_node_mut(id)?.set_position(position);
        self.emit(SceneEvent::NodeMoved { node: id, position });
        Ok(())
    }

    // Connections

    /// Create a connection from `port_a`, fully specified when `port_b` is given.
    ///
    /// A fully specified connection is type checked (using `converter` or the
    /// converter registry), checked for capacity and, when enabled, for
    /// cycles; it then receives the current output value immediately. A
    /// partial connection is only registered on `port_a` and waits for the
    /// interaction protocol to complete it.
    pub fn create_connection(
        &mut self,
        port_a: PortKey,
        port_b: Option<PortKey>,
        converter: Option<TypeConverter>,
    ) -> GraphResult<ConnectionId> {
        let kind_a = self.port(port_a)?.data_kind().clone();

        let Some(port_b) = port_b else {
            if !self.port(port_a)?.can_accept_new_connection() {
                return Err(ConnectionFailure::PortFull(port_a).into());
            }
            let connection = Connection::new(port_a, None, converter)?;
            return self.insert_connection(connection);
        };

        let kind_b = self.port(port_b)?.data_kind().clone();
        let mut connection = Connection::new(port_a, Some(port_b), None)?;
        let (Some(input), Some(output)) = connection.ports() else {
            return Err(GraphError::PortsOfSameDirection(port_a.direction));
        };
        let (output_kind, input_kind) = match port_a.direction {
            PortDirection::Output => (kind_a, kind_b),
            PortDirection::Input => (kind_b, kind_a),
        };

        if input.node == output.node {
            return Err(ConnectionFailure::SelfConnection(input.node).into());
        }
        let converter = self.converters.resolve(&output_kind, &input_kind, converter)?;
        if self.ports_connected(output, input) {
            return Err(GraphError::PortsAlreadyConnected { output, input });
        }
        for key in [output, input] {
            if !self.port(key)?.can_accept_new_connection() {
                return Err(ConnectionFailure::PortFull(key).into());
            }
        }
        if self.config.check_cycles && self.would_create_cycle(output.node, input.node) {
            return Err(ConnectionFailure::WouldCreateCycle {
                output: output.node,
                input: input.node,
            }
            .into());
        }

        connection.set_type_converter(converter);
        let id = self.insert_connection(connection)?;
        self.on_connection_complete(id)?;
        Ok(id)
    }

    /// Connect output `out_index` of `out_node` to input `in_index` of `in_node`
    pub fn create_connection_by_index(
        &mut self,
        in_node: NodeId,
        in_index: PortIndex,
        out_node: NodeId,
        out_index: PortIndex,
        converter: Option<TypeConverter>,
    ) -> GraphResult<ConnectionId> {
        self.create_connection(
            PortKey::output(out_node, out_index),
            Some(PortKey::input(in_node, in_index)),
            converter,
        )
    }

    fn insert_connection(&mut self, connection: Connection) -> GraphResult<ConnectionId> {
        let id = connection.id();
        let ports: Vec<PortKey> = connection.valid_ports().collect();
        self.connections.insert(id, connection);
        self.connection_order.push(id);

        for port in ports {
            if let Err(err) = self.attach(id, port) {
                self.discard_connection(id);
                return Err(err);
            }
        }

        debug!("Created connection {}", id);
        self.emit(SceneEvent::ConnectionCreated(id));
        Ok(id)
    }

    /// Drop a connection that never became visible to observers
    fn discard_connection(&mut self, id: ConnectionId) {
        if let Some(connection) = self.connections.remove(&id) {
            for port in connection.valid_ports() {
                if let Some(port) = self
                    .nodes
                    .get_mut(&port.node)
                    .and_then(|node| node.port_mut(port.direction, port.index))
                {
                    port.remove_connection(id);
                }
            }
        }
        self.connection_order.retain(|connection| *connection != id);
    }

    /// Register `connection` on a port
    pub(crate) fn attach(&mut self, connection: ConnectionId, port: PortKey) -> GraphResult<()> {
        self.require_node_mut(port.node)?
            .port_mut(port.direction, port.index)
            .ok_or(GraphError::UnknownPort(port))?
            .add_connection(connection)?;
        self.emit(SceneEvent::PortConnectionAdded { port, connection });
        Ok(())
    }

    /// Unregister `connection` from a port; absent registrations are ignored
    pub(crate) fn detach(&mut self, connection: ConnectionId, port: PortKey) {
        let removed = self
            .nodes
            .get_mut(&port.node)
            .and_then(|node| node.port_mut(port.direction, port.index))
            .map(|p| p.remove_connection(connection))
            .unwrap_or(false);
        if removed {
            self.emit(SceneEvent::PortConnectionRemoved { port, connection });
        }
    }

    /// Tell both models about a connection that just became complete, then
    /// push the current output value across it.
    fn on_connection_complete(&mut self, id: ConnectionId) -> GraphResult<()> {
        let connection = self.require_connection(id)?;
        let (Some(input), Some(output)) = connection.ports() else {
            return Ok(());
        };

        self.require_node_mut(output.node)?.model_mut().output_connection_created(id);
        self.require_node_mut(input.node)?.model_mut().input_connection_created(id);
        self.on_output_updated(output)
    }

    fn on_connection_incomplete(&mut self, id: ConnectionId, input: PortKey, output: PortKey) {
        if let Some(node) = self.nodes.get_mut(&output.node) {
            node.model_mut().output_connection_deleted(id);
        }
        if let Some(node) = self.nodes.get_mut(&input.node) {
            node.model_mut().input_connection_deleted(id);
        }
    }

    /// Fill the missing end of a pending connection.
    ///
    /// Used by the interaction protocol after validation: attaches the
    /// converter, registers on `port`, completes the connection and sends the
    /// output value downstream.
    pub(crate) fn complete_connection(
        &mut self,
        id: ConnectionId,
        port: PortKey,
        converter: Option<TypeConverter>,
    ) -> GraphResult<()> {
        self.require_connection(id)?;
        self.port(port)?;

        self.attach(id, port)?;
        let connection = self
            .connections
            .get_mut(&id)
            .ok_or(GraphError::UnknownConnection(id))?;
        connection.set_type_converter(converter);
        let completed = match connection.connect_to(port) {
            Ok(completed) => completed,
            Err(err) => {
                self.detach(id, port);
                return Err(err);
            }
        };

        if completed {
            self.emit(SceneEvent::ConnectionCompleted(id));
            self.on_connection_complete(id)?;
        }
        Ok(())
    }

    /// Detach one end of a connection, returning it to the pending state.
    ///
    /// The input side receives "no data" before the end is cleared.
    pub(crate) fn sever(&mut self, id: ConnectionId, direction: PortDirection) -> GraphResult<PortKey> {
        let connection = self.require_connection(id)?;
        // A pending connection has a single end; clearing it would leave nothing to drag
        let (Some(input), Some(output)) = connection.ports() else {
            return Err(GraphError::ConnectionIncomplete(id));
        };
        let port = match direction {
            PortDirection::Input => input,
            PortDirection::Output => output,
        };

        self.detach(id, port);
        self.propagate_empty(id)?;
        self.on_connection_incomplete(id, input, output);

        self.connections
            .get_mut(&id)
            .ok_or(GraphError::UnknownConnection(id))?
            .clear_node(direction)?;
        self.emit(SceneEvent::ConnectionMadeIncomplete(id));
        Ok(port)
    }

    /// Delete a connection. Returns `false` when it was already gone.
    ///
    /// A complete connection sends "no data" downstream before it is unlinked.
    pub fn delete_connection(&mut self, id: ConnectionId) -> GraphResult<bool> {
        let Some(connection) = self.connections.get(&id) else {
            return Ok(false);
        };
        let ports: Vec<PortKey> = connection.valid_ports().collect();
        let ends = match connection.ports() {
            (Some(input), Some(output)) => Some((input, output)),
            _ => None,
        };

        if let Some((input, output)) = ends {
            self.propagate_empty(id)?;
            self.on_connection_incomplete(id, input, output);
        }
        for port in ports {
            self.detach(id, port);
        }

        self.connections.remove(&id);
        self.connection_order.retain(|connection| *connection != id);
        debug!("Deleted connection {}", id);
        self.emit(SceneEvent::ConnectionDeleted(id));
        Ok(true)
    }

    /// Remove every connection, then every node, through the regular
    /// deletion paths so downstream models observe the emptied inputs.
    pub fn clear(&mut self) -> GraphResult<()> {
        for connection in self.connection_order.clone() {
            self.delete_connection(connection)?;
        }
        for node in self.node_order.clone() {
            self.remove_node_unchecked(node)?;
        }
        Ok(())
    }

    // Data propagation

    /// Send a value across a connection; a no-op while it has no input end
    pub fn propagate_data(&mut self, id: ConnectionId, value: Option<NodeData>) -> GraphResult<()> {
        let connection = self.require_connection(id)?;
        let Some(input) = connection.input() else {
            return Ok(());
        };
        let value = connection.convert(value);
        self.propagate_incoming(input, value)
    }

    pub fn propagate_empty(&mut self, id: ConnectionId) -> GraphResult<()> {
        self.propagate_data(id, None)
    }

    /// Hand a value to the model owning `input_port`, then push every output
    /// the model reports as changed.
    ///
    /// A value that would reach a node still busy with an earlier input (a
    /// loop, possible only with cycle checks disabled) is dropped with a
    /// warning instead of recursing.
    pub fn propagate_incoming(&mut self, input_port: PortKey, value: Option<NodeData>) -> GraphResult<()> {
        let node = input_port.node;
        if self.propagating.contains(&node) {
            warn!("Propagation loops back into node {}, stopping at {}", node, input_port);
            return Ok(());
        }

        self.propagating.push(node);
        let result = self.deliver(input_port, value);
        self.propagating.pop();
        result
    }

    fn deliver(&mut self, input_port: PortKey, value: Option<NodeData>) -> GraphResult<()> {
        let updated = self
            .require_node_mut(input_port.node)?
            .propagate_incoming(value, input_port)?;
        for index in updated {
            self.on_output_updated(PortKey::output(input_port.node, index))?;
        }
        Ok(())
    }

    /// Push the model's current value for `output_port` along every attached
    /// connection, in attachment order.
    pub fn on_output_updated(&mut self, output_port: PortKey) -> GraphResult<()> {
        if output_port.direction != PortDirection::Output {
            return Err(GraphError::UnknownPort(output_port));
        }
        let node = self.require_node(output_port.node)?;
        let attached = node
            .port(PortDirection::Output, output_port.index)
            .ok_or(GraphError::UnknownPort(output_port))?
            .connections()
            .to_vec();
        let value = node.model().get_output(output_port.index);

        for connection in attached {
            self.propagate_data(connection, value.clone())?;
        }
        Ok(())
    }

    /// Mutate a model from outside (e.g. a UI editor) and propagate the
    /// outputs it reports as changed.
    pub fn update_model<F, R>(&mut self, id: NodeId, update: F) -> GraphResult<R>
    where
        F: FnOnce(&mut dyn NodeDataModel, &mut DataUpdates) -> R,
    {
        let mut updates = DataUpdates::new();
        let result = update(self.require_node_mut(id)?.model_mut(), &mut updates);
        for index in updates.take() {
            self.on_output_updated(PortKey::output(id, index))?;
        }
        Ok(result)
    }

    // Queries

    /// Kind carried by a connection on one side. While the connection is
    /// pending this falls back to the side that is set.
    pub fn connection_data_kind(&self, id: ConnectionId, direction: PortDirection) -> GraphResult<DataKind> {
        let connection = self.require_connection(id)?;
        let port = connection
            .port(direction)
            .or_else(|| connection.port(direction.opposite()))
            .ok_or(GraphError::PortNotSet { connection: id, direction })?;
        Ok(self.port(port)?.data_kind().clone())
    }

    /// Whether `output` and `input` are already linked by a connection
    pub fn ports_connected(&self, output: PortKey, input: PortKey) -> bool {
        self.port(output)
            .map(|port| {
                port.connections().iter().any(|id| {
                    self.connections
                        .get(id)
                        .is_some_and(|c| c.output() == Some(output) && c.input() == Some(input))
                })
            })
            .unwrap_or(false)
    }

    /// Breadth-first search from `from` following complete connections on
    /// its `via` ports: downstream for outputs, upstream for inputs.
    pub fn has_connection_to(&self, from: NodeId, to: NodeId, via: PortDirection) -> bool {
        self.reachable(from, to, &[via])
    }

    /// Whether `from` and `to` are linked by any chain of connections,
    /// regardless of direction
    pub fn has_any_connection_to(&self, from: NodeId, to: NodeId) -> bool {
        self.reachable(from, to, &PortDirection::ALL)
    }

    fn reachable(&self, from: NodeId, to: NodeId, directions: &[PortDirection]) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            if current == to {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            for &direction in directions {
                for id in node.connections(direction) {
                    let next = self
                        .connections
                        .get(&id)
                        .filter(|c| c.is_complete())
                        .and_then(|c| c.node(direction.opposite()));
                    if let Some(next) = next {
                        if !visited.contains(&next) {
                            queue.push_back(next);
                        }
                    }
                }
            }
        }
        false
    }

    /// Whether a new edge `output_node → input_node` would close a loop
    pub fn would_create_cycle(&self, output_node: NodeId, input_node: NodeId) -> bool {
        self.has_connection_to(input_node, output_node, PortDirection::Output)
    }

    // Ordering

    /// Kahn's algorithm over complete connections. Second value is false when
    /// a cycle kept some nodes from being ordered; those are appended at the
    /// end in creation order.
    fn topological_order(&self) -> (Vec<NodeId>, bool) {
        let mut in_degree: HashMap<NodeId, usize> = self.node_order.iter().map(|id| (*id, 0)).collect();
        let mut downstream: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

        for connection in self.iter_connections() {
            if let (Some(input), Some(output)) = (connection.input_node(), connection.output_node()) {
                downstream.entry(output).or_default().push(input);
                if let Some(degree) = in_degree.get_mut(&input) {
                    *degree += 1;
                }
            }
        }

        let mut queue: VecDeque<NodeId> = self
            .node_order
            .iter()
            .copied()
            .filter(|id| in_degree.get(id) == Some(&0))
            .collect();
        let mut order = Vec::with_capacity(self.node_order.len());
        let mut placed = HashSet::new();

        while let Some(id) = queue.pop_front() {
            order.push(id);
            placed.insert(id);
            for next in downstream.get(&id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(next) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*next);
                    }
                }
            }
        }

        let acyclic = order.len() == self.node_order.len();
        order.extend(self.node_order.iter().filter(|id| !placed.contains(*id)));
        (order, acyclic)
    }

    /// Nodes ordered so that every node comes after all of its upstream nodes
    pub fn dependency_order(&self) -> Vec<NodeId> {
        let (order, acyclic) = self.topological_order();
        if !acyclic {
            warn!("Cycle detected in scene, dependency order is partial");
        }
        order
    }

    /// Models in dependency order
    pub fn dependency_order_models(&self) -> Vec<(NodeId, &dyn NodeDataModel)> {
        self.dependency_order()
            .into_iter()
            .filter_map(|id| self.nodes.get(&id).map(|node| (id, node.model())))
            .collect()
    }

    /// Check the structural invariants: port/connection symmetry, input
    /// arity, pending markers and acyclicity.
    pub fn validate(&self) -> GraphResult<()> {
        let inconsistent = |message: String| Err(GraphError::Inconsistent(message));

        for connection in self.iter_connections() {
            if connection.valid_ports().next().is_none() {
                return inconsistent(format!("{} has no ends", connection.id()));
            }
            for port in connection.valid_ports() {
                if !self.port(port)?.has_connection(connection.id()) {
                    return inconsistent(format!("{} missing from port {}", connection.id(), port));
                }
            }
            if connection.is_complete() == connection.requires_port() {
                return inconsistent(format!("{} has a stale required marker", connection.id()));
            }
        }

        for node in self.iter_nodes() {
            for port in node.inputs().iter().chain(node.outputs()) {
                if port.is_input() && port.connections().len() > 1 {
                    return inconsistent(format!("input {} holds several connections", port.key()));
                }
                for id in port.connections() {
                    let references = self
                        .connections
                        .get(id)
                        .is_some_and(|c| c.port(port.direction()) == Some(port.key()));
                    if !references {
                        return inconsistent(format!("port {} lists foreign connection {}", port.key(), id));
                    }
                }
            }
        }

        if !self.topological_order().1 {
            return inconsistent("scene contains a cycle".to_string());
        }
        Ok(())
    }

    // Persistence

    /// Snapshot of all nodes and complete connections
    pub fn save(&self) -> GraphSnapshot {
        let nodes = self
            .iter_nodes()
            .map(|node| {
                let mut kind = node.model().save();
                kind.insert("name".to_string(), Value::String(node.kind_name().to_string()));
                NodeRecord {
                    id: node.id().to_string(),
                    kind,
                    position: node.position().into(),
                }
            })
            .collect();

        let connections = self
            .iter_connections()
            .filter_map(|connection| {
                let (Some(input), Some(output)) = connection.ports() else {
                    return None;
                };
                Some(ConnectionRecord {
                    in_id: input.node.to_string(),
                    in_index: input.index,
                    out_id: output.node.to_string(),
                    out_index: output.index,
                    converter: connection.type_converter().map(|converter| ConverterRecord {
                        input: converter.to_kind().clone(),
                        output: converter.from_kind().clone(),
                    }),
                })
            })
            .collect();

        GraphSnapshot { nodes, connections }
    }

    /// Replace the scene content with a snapshot.
    ///
    /// The snapshot is rebuilt in a staging scene first; when any record is
    /// malformed the error is returned and this scene is left untouched.
    pub fn load(&mut self, snapshot: &GraphSnapshot) -> GraphResult<()> {
        let mut staged = Scene::with_config(self.registry.clone(), self.converters.clone(), self.config.clone());
        for record in &snapshot.nodes {
            staged.restore_node(record)?;
        }
        for record in &snapshot.connections {
            staged.restore_connection(record)?;
        }

        self.clear()?;
        self.adopt(staged);
        info!(
            "Loaded scene with {} nodes and {} connections",
            self.nodes.len(),
            self.connections.len()
        );
        Ok(())
    }

    /// Take over the content of a staging scene, announcing it to observers
    fn adopt(&mut self, mut staged: Scene) {
        for id in std::mem::take(&mut staged.node_order) {
            if let Some(node) = staged.nodes.remove(&id) {
                self.nodes.insert(id, node);
                self.node_order.push(id);
                self.emit(SceneEvent::NodeCreated(id));
            }
        }
        for id in std::mem::take(&mut staged.connection_order) {
            if let Some(connection) = staged.connections.remove(&id) {
                self.connections.insert(id, connection);
                self.connection_order.push(id);
                self.emit(SceneEvent::ConnectionCreated(id));
            }
        }
    }

    /// Recreate a node from its record, keeping its id
    pub fn restore_node(&mut self, record: &NodeRecord) -> GraphResult<NodeId> {
        let id = parse_node_id(&record.id)?;
        if self.nodes.contains_key(&id) {
            return Err(GraphError::InvalidSnapshot(format!("duplicate node id {}", id)));
        }

        let name = record.kind_name()?;
        let mut model = self.registry.create(name)?;
        model.restore(&record.model_state())?;
        Ok(self.insert_node(id, name, model, record.position.into()))
    }

    /// Recreate a connection between already restored nodes
    pub fn restore_connection(&mut self, record: &ConnectionRecord) -> GraphResult<ConnectionId> {
        let in_node = parse_node_id(&record.in_id)?;
        let out_node = parse_node_id(&record.out_id)?;
        for id in [in_node, out_node] {
            self.require_node(id)?;
        }

        let converter = match &record.converter {
            Some(recorded) => Some(self.converters.lookup(&recorded.output, &recorded.input).ok_or_else(|| {
                ConnectionFailure::IncompatibleTypes {
                    output: recorded.output.clone(),
                    input: recorded.input.clone(),
                }
            })?),
            None => None,
        };

        self.create_connection_by_index(in_node, record.in_index, out_node, record.out_index, converter)
    }
}

fn parse_node_id(raw: &str) -> GraphResult<NodeId> {
    NodeId::parse_str(raw).map_err(|err| GraphError::InvalidSnapshot(format!("bad node id '{}': {}", raw, err)))
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes.len())
            .field("connections", &self.connections.len())
            .field("kinds", &self.registry)
            .finish()
    }
}
