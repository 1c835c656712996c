//! Values flowing between nodes and the kinds that describe them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity and display name of a value type carried by ports.
///
/// Two kinds are the same kind when their ids match; the name is only a
/// label for the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataKind {
    pub id: String,
    pub name: String,
}

impl DataKind {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Same identifier as `other`
    pub fn same_kind(&self, other: &DataKind) -> bool {
        self.id == other.id
    }
}

impl PartialEq for DataKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DataKind {}

impl Hash for DataKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Data carried across a connection.
///
/// "No data" is represented by `Option<NodeData>::None` at every call site, so
/// a connection that loses its source delivers `None` downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeData {
    Decimal(f64),
    Integer(i64),
}

impl NodeData {
    /// Numeric value, widening integers
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            NodeData::Decimal(value) => Some(*value),
            NodeData::Integer(value) => Some(*value as f64),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            NodeData::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeData::Decimal(value) => write!(f, "{}", value),
            NodeData::Integer(value) => write!(f, "{}", value),
        }
    }
}
