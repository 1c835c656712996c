//! Core computation logic for the calculator nodes

use super::{decimal_kind, integer_kind};
use crate::nodes::data::{DataKind, NodeData};
use crate::nodes::port::{PortDirection, PortIndex};
use thiserror::Error;

/// Why an operation produced no result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    #[error("Missing or incorrect inputs")]
    IncorrectInputs,

    #[error("Division by zero error")]
    DivisionByZero,
}

/// Binary operation computed by a math node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
        Operation::Modulo,
    ];

    /// Registered kind name
    pub fn name(self) -> &'static str {
        match self {
            Operation::Addition => "Addition",
            Operation::Subtraction => "Subtraction",
            Operation::Multiplication => "Multiplication",
            Operation::Division => "Division",
            Operation::Modulo => "Modulo",
        }
    }

    /// Kind of both inputs and the output
    pub fn data_kind(self) -> DataKind {
        match self {
            Operation::Modulo => integer_kind(),
            _ => decimal_kind(),
        }
    }

    pub fn port_caption(self, direction: PortDirection, index: PortIndex) -> &'static str {
        match (direction, index) {
            (PortDirection::Output, _) => "Result",
            (PortDirection::Input, 0) => match self {
                Operation::Subtraction => "Minuend",
                Operation::Division | Operation::Modulo => "Dividend",
                _ => "A",
            },
            (PortDirection::Input, _) => match self {
                Operation::Subtraction => "Subtrahend",
                Operation::Division | Operation::Modulo => "Divisor",
                _ => "B",
            },
        }
    }

    /// Apply the operation. Decimal operations accept integers too.
    pub fn apply(self, lhs: &NodeData, rhs: &NodeData) -> Result<NodeData, MathError> {
        let decimals = || {
            lhs.as_decimal()
                .zip(rhs.as_decimal())
                .ok_or(MathError::IncorrectInputs)
        };

        match self {
            Operation::Addition => decimals().map(|(a, b)| NodeData::Decimal(a + b)),
            Operation::Subtraction => decimals().map(|(a, b)| NodeData::Decimal(a - b)),
            Operation::Multiplication => decimals().map(|(a, b)| NodeData::Decimal(a * b)),
            Operation::Division => match decimals()? {
                (_, b) if b == 0.0 => Err(MathError::DivisionByZero),
                (a, b) => Ok(NodeData::Decimal(a / b)),
            },
            Operation::Modulo => {
                let (a, b) = lhs
                    .as_integer()
                    .zip(rhs.as_integer())
                    .ok_or(MathError::IncorrectInputs)?;
                if b == 0 {
                    Err(MathError::DivisionByZero)
                } else {
                    Ok(NodeData::Integer(a.wrapping_rem(b)))
                }
            }
        }
    }
}

/// Decimal → Integer, truncating toward zero
pub fn decimal_to_integer(data: NodeData) -> NodeData {
    match data.as_decimal() {
        Some(value) => NodeData::Integer(value as i64),
        None => data,
    }
}

/// Integer → Decimal
pub fn integer_to_decimal(data: NodeData) -> NodeData {
    match data.as_decimal() {
        Some(value) => NodeData::Decimal(value),
        None => data,
    }
}
