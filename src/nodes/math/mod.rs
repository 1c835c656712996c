//! Calculator node kinds
//!
//! Number sources, the four arithmetic operations plus integer modulo, a
//! number display, and converters between the decimal and integer kinds.

pub mod display;
pub mod functions;
pub mod operation;
pub mod source;

pub use display::{NumberDisplayFactory, NumberDisplayModel};
pub use functions::{MathError, Operation};
pub use operation::MathOperationModel;
pub use source::{IntegerSourceFactory, IntegerSourceModel, NumberSourceFactory, NumberSourceModel};

use crate::nodes::converter::TypeConverterRegistry;
use crate::nodes::data::DataKind;
use crate::nodes::factory::{NodeCategory, NodeRegistry};
use serde_json::Value;

pub fn decimal_kind() -> DataKind {
    DataKind::new("decimal", "Decimal")
}

pub fn integer_kind() -> DataKind {
    DataKind::new("integer", "Integer")
}

/// Register the calculator kinds and the decimal/integer converters
pub fn register_calculator_kinds(registry: &mut NodeRegistry, converters: &mut TypeConverterRegistry) {
    registry.register::<NumberSourceFactory>();
    registry.register::<IntegerSourceFactory>();
    registry.register::<NumberDisplayFactory>();

    for operation in Operation::ALL {
        registry.register_kind(
            operation.name(),
            move |_| Box::new(MathOperationModel::new(operation)),
            Value::Null,
            NodeCategory::math(),
        );
    }

    converters.register(decimal_kind(), integer_kind(), functions::decimal_to_integer);
    converters.register(integer_kind(), decimal_kind(), functions::integer_to_decimal);
}
