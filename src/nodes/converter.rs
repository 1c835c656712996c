//! Type converters and their registry
//!
//! A converter transforms a value of one [`DataKind`] into another and is
//! registered under the ordered pair (source kind, destination kind). Lookup is
//! exact; equal kinds never need a converter, which is handled once in
//! [`TypeConverterRegistry::resolve`].

use super::data::{DataKind, NodeData};
use crate::error::ConnectionFailure;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Conversion function stored by a [`TypeConverter`]
pub type ConvertFn = dyn Fn(NodeData) -> NodeData;

/// A conversion from values of kind `from` to values of kind `to`
#[derive(Clone)]
pub struct TypeConverter {
    from: DataKind,
    to: DataKind,
    func: Rc<ConvertFn>,
}

impl TypeConverter {
    pub fn new<F>(from: DataKind, to: DataKind, func: F) -> Self
    where
        F: Fn(NodeData) -> NodeData + 'static,
    {
        Self {
            from,
            to,
            func: Rc::new(func),
        }
    }

    /// Source kind (the output side of a connection)
    pub fn from_kind(&self) -> &DataKind {
        &self.from
    }

    /// Destination kind (the input side of a connection)
    pub fn to_kind(&self) -> &DataKind {
        &self.to
    }

    /// Converts exactly `from` into `to`
    pub fn converts(&self, from: &DataKind, to: &DataKind) -> bool {
        self.from == *from && self.to == *to
    }

    pub fn convert(&self, data: NodeData) -> NodeData {
        (self.func)(data)
    }
}

impl fmt::Debug for TypeConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeConverter")
            .field("from", &self.from.id)
            .field("to", &self.to.id)
            .finish()
    }
}

/// Registry of converters keyed by (source kind id, destination kind id)
#[derive(Default, Clone)]
pub struct TypeConverterRegistry {
    converters: HashMap<(String, String), TypeConverter>,
}

impl TypeConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a conversion function. An existing entry for the same pair is
    /// replaced: last write wins.
    pub fn register<F>(&mut self, from: DataKind, to: DataKind, func: F)
    where
        F: Fn(NodeData) -> NodeData + 'static,
    {
        self.register_converter(TypeConverter::new(from, to, func));
    }

    pub fn register_converter(&mut self, converter: TypeConverter) {
        let key = (converter.from.id.clone(), converter.to.id.clone());
        if self.converters.insert(key, converter).is_some() {
            warn!("Replaced existing type converter");
        }
    }

    /// Exact-pair lookup. Equal kinds are not special-cased here.
    pub fn lookup(&self, from: &DataKind, to: &DataKind) -> Option<TypeConverter> {
        let found = self.converters.get(&(from.id.clone(), to.id.clone())).cloned();
        if found.is_none() && from != to {
            debug!("No type converter available for {} -> {}", from, to);
        }
        found
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeConverter> {
        self.converters.values()
    }

    /// Decide which converter, if any, a connection from `output` to `input`
    /// needs.
    ///
    /// `Ok(None)` means the kinds already match. An explicit converter is used
    /// when it converts exactly this pair; otherwise the registry is consulted.
    pub fn resolve(
        &self,
        output: &DataKind,
        input: &DataKind,
        explicit: Option<TypeConverter>,
    ) -> Result<Option<TypeConverter>, ConnectionFailure> {
        let incompatible = || ConnectionFailure::IncompatibleTypes {
            output: output.clone(),
            input: input.clone(),
        };

        match explicit {
            Some(converter) if converter.converts(output, input) => Ok(Some(converter)),
            _ if output.same_kind(input) => Ok(None),
            Some(_) => Err(incompatible()),
            None => self.lookup(output, input).map(Some).ok_or_else(incompatible),
        }
    }
}

impl fmt::Debug for TypeConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.converters.values()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal() -> DataKind {
        DataKind::new("decimal", "Decimal")
    }

    fn integer() -> DataKind {
        DataKind::new("integer", "Integer")
    }

    fn truncate(data: NodeData) -> NodeData {
        match data {
            NodeData::Decimal(value) => NodeData::Integer(value as i64),
            other => other,
        }
    }

    #[test]
    fn test_lookup_is_exact_pair() {
        let mut registry = TypeConverterRegistry::new();
        registry.register(decimal(), integer(), truncate);

        assert!(registry.lookup(&decimal(), &integer()).is_some());
        assert!(registry.lookup(&integer(), &decimal()).is_none());
        assert!(registry.lookup(&decimal(), &decimal()).is_none());
    }

    #[test]
    fn test_reregistration_overwrites() {
        let mut registry = TypeConverterRegistry::new();
        registry.register(decimal(), integer(), |_| NodeData::Integer(1));
        registry.register(decimal(), integer(), |_| NodeData::Integer(2));
        assert_eq!(registry.len(), 1);

        let converter = registry.lookup(&decimal(), &integer()).unwrap();
        assert_eq!(converter.convert(NodeData::Decimal(0.0)), NodeData::Integer(2));
    }

    #[test]
    fn test_resolve_identity_and_failure() {
        let mut registry = TypeConverterRegistry::new();
        assert!(matches!(registry.resolve(&decimal(), &decimal(), None), Ok(None)));
        assert!(matches!(
            registry.resolve(&decimal(), &integer(), None),
            Err(ConnectionFailure::IncompatibleTypes { .. })
        ));

        registry.register(decimal(), integer(), truncate);
        let converter = registry.resolve(&decimal(), &integer(), None).unwrap().unwrap();
        assert_eq!(converter.convert(NodeData::Decimal(3.7)), NodeData::Integer(3));
    }

    #[test]
    fn test_resolve_rejects_mismatched_explicit_converter() {
        let registry = TypeConverterRegistry::new();
        let backwards = TypeConverter::new(integer(), decimal(), |data| data);
        assert!(registry.resolve(&decimal(), &integer(), Some(backwards.clone())).is_err());
        assert!(registry.resolve(&integer(), &decimal(), Some(backwards)).unwrap().is_some());
    }
}
