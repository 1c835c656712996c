//! Node kind registry: named factories grouped into categories

use super::model::NodeDataModel;
use crate::error::{GraphError, GraphResult};
use log::{debug, warn};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

/// Hierarchical category system for organizing node kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeCategory {
    path: Vec<String>,
}

impl NodeCategory {
    /// Create a new category from path components
    pub fn new(path: &[&str]) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parse a `" > "` separated label, the inverse of [`display_string`](Self::display_string)
    pub fn from_label(label: &str) -> Self {
        Self {
            path: label
                .split('>')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    /// Get the full path as a slice
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Get the category name (last component)
    pub fn name(&self) -> &str {
        self.path.last().map(|s| s.as_str()).unwrap_or("")
    }

    /// Get the parent category
    pub fn parent(&self) -> Option<NodeCategory> {
        if self.path.len() > 1 {
            Some(NodeCategory {
                path: self.path[..self.path.len() - 1].to_vec(),
            })
        } else {
            None
        }
    }

    /// Check if this category is a child of another
    pub fn is_child_of(&self, other: &NodeCategory) -> bool {
        self.path.len() > other.path.len() && self.path[..other.path.len()] == other.path
    }

    /// Get display string for UI
    pub fn display_string(&self) -> String {
        self.path.join(" > ")
    }
}

// Standard categories
impl NodeCategory {
    pub fn math() -> Self {
        Self::new(&["Math"])
    }
    pub fn data() -> Self {
        Self::new(&["Data"])
    }
    pub fn output() -> Self {
        Self::new(&["Output"])
    }
}

impl Default for NodeCategory {
    fn default() -> Self {
        Self::new(&["Nodes"])
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

/// Descriptive data for a registered kind
#[derive(Debug, Clone)]
pub struct NodeMetadata {
    pub name: String,
    pub category: NodeCategory,
    pub description: String,
    /// Arguments handed to the creator by [`NodeRegistry::create`]
    pub default_args: Value,
}

impl NodeMetadata {
    pub fn new(name: &str, category: NodeCategory, description: &str) -> Self {
        Self {
            name: name.to_string(),
            category,
            description: description.to_string(),
            default_args: Value::Null,
        }
    }

    pub fn with_default_args(mut self, args: Value) -> Self {
        self.default_args = args;
        self
    }
}

/// Node kind with a static factory, registered through [`NodeRegistry::register`]
pub trait NodeFactory {
    fn metadata() -> NodeMetadata
    where
        Self: Sized;

    /// Build a fresh model from the registered default arguments
    fn create(args: &Value) -> Box<dyn NodeDataModel>
    where
        Self: Sized;
}

/// Function creating a model from its default arguments
pub type NodeCreator = Rc<dyn Fn(&Value) -> Box<dyn NodeDataModel>>;

#[derive(Clone)]
struct KindEntry {
    metadata: NodeMetadata,
    creator: NodeCreator,
}

/// Registry for managing node kinds
#[derive(Clone, Default)]
pub struct NodeRegistry {
    kinds: BTreeMap<String, KindEntry>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node factory type
    pub fn register<T: NodeFactory + 'static>(&mut self) {
        let metadata = T::metadata();
        self.insert(metadata, Rc::new(|args: &Value| T::create(args)));
    }

    /// Register a kind from a closure. An existing kind with the same name is
    /// replaced.
    pub fn register_kind<F>(&mut self, name: &str, factory: F, default_args: Value, category: NodeCategory)
    where
        F: Fn(&Value) -> Box<dyn NodeDataModel> + 'static,
    {
        let metadata = NodeMetadata::new(name, category, "").with_default_args(default_args);
        self.insert(metadata, Rc::new(factory));
    }

    fn insert(&mut self, metadata: NodeMetadata, creator: NodeCreator) {
        let name = metadata.name.clone();
        if self.kinds.insert(name.clone(), KindEntry { metadata, creator }).is_some() {
            warn!("Node kind '{}' registered twice, replacing previous factory", name);
        } else {
            debug!("Registered node kind '{}'", name);
        }
    }

    /// Create a model of the named kind using its default arguments
    pub fn create(&self, name: &str) -> GraphResult<Box<dyn NodeDataModel>> {
        let entry = self
            .kinds
            .get(name)
            .ok_or_else(|| GraphError::UnknownKind(name.to_string()))?;
        debug!("Creating model for kind '{}'", name);
        Ok((entry.creator)(&entry.metadata.default_args))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    pub fn metadata(&self, name: &str) -> Option<&NodeMetadata> {
        self.kinds.get(name).map(|entry| &entry.metadata)
    }

    /// Get all registered kind names, sorted
    pub fn node_types(&self) -> Vec<&str> {
        self.kinds.keys().map(|s| s.as_str()).collect()
    }

    /// Get all categories
    pub fn categories(&self) -> BTreeSet<NodeCategory> {
        self.kinds
            .values()
            .map(|entry| entry.metadata.category.clone())
            .collect()
    }

    /// Kind names grouped by category
    pub fn kinds_by_category(&self) -> BTreeMap<NodeCategory, Vec<String>> {
        let mut grouped: BTreeMap<NodeCategory, Vec<String>> = BTreeMap::new();
        for (name, entry) in &self.kinds {
            grouped
                .entry(entry.metadata.category.clone())
                .or_default()
                .push(name.clone());
        }
        grouped
    }

    /// Get kinds in a specific category
    pub fn nodes_in_category(&self, category: &NodeCategory) -> Vec<&str> {
        self.kinds
            .iter()
            .filter(|(_, entry)| entry.metadata.category == *category)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.kinds.keys()).finish()
    }
}
