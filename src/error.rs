use crate::ast::{NoCodeDataType, Value};
use thiserror::Error;

/// Errors that can occur while evaluating a condition set or an expression.
///
/// Every variant is local to a single tree node. Callers evaluating many elements
/// (see [`crate::state`]) record these per element instead of aborting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Operator '{0}' is not registered")]
    UnknownOperator(String),

    #[error("Operator '{operator}' is missing operand {index} of type {expected}")]
    MissingOperand {
        operator: String,
        index: usize,
        expected: NoCodeDataType,
    },

    #[error("Type mismatch in '{context}': expected {expected}, but found '{found}'")]
    TypeMismatch {
        context: String,
        expected: NoCodeDataType,
        found: String,
    },

    #[error("Reference '{0}' does not point to a known field")]
    UnresolvedReference(String),

    #[error("Malformed logic tree: {0}")]
    MalformedTree(String),

    #[error("Operator '{operator}' failed: {message}")]
    OperatorFailed { operator: String, message: String },
}

impl EvaluationError {
    pub(crate) fn type_mismatch(
        context: impl Into<String>,
        expected: NoCodeDataType,
        found: &Value,
    ) -> Self {
        EvaluationError::TypeMismatch {
            context: context.into(),
            expected,
            found: found.to_string(),
        }
    }

    pub(crate) fn literal_mismatch(
        context: impl Into<String>,
        expected: NoCodeDataType,
        literal: &str,
    ) -> Self {
        EvaluationError::TypeMismatch {
            context: context.into(),
            expected,
            found: literal.to_string(),
        }
    }

    /// Stable name of the failure kind, as reported in error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            EvaluationError::UnknownOperator(_) => "UnknownOperator",
            EvaluationError::MissingOperand { .. } => "MissingOperand",
            EvaluationError::TypeMismatch { .. } => "TypeMismatch",
            EvaluationError::UnresolvedReference(_) => "UnresolvedReference",
            EvaluationError::MalformedTree(_) => "MalformedTree",
            EvaluationError::OperatorFailed { .. } => "OperatorFailed",
        }
    }
}

/// Errors raised by an operator's semantic function.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperatorError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Expected {expected}, but received '{found}'")]
    InvalidArgument {
        expected: NoCodeDataType,
        found: Value,
    },

    #[error("Result is too large to represent")]
    Overflow,

    #[error("No local implementation is available")]
    NotImplementedLocally,

    #[error("{0}")]
    Failed(String),
}

/// Errors that can occur while building an operator registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Operator '{0}' is already registered")]
    DuplicateOperator(String),

    #[error("Failed to parse operator catalog JSON: {0}")]
    CatalogParse(#[from] serde_json::Error),
}

/// Errors raised by structural edits on a logic tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("No node exists at index {index} (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Operand at path {0:?} is not a nested expression")]
    NotAnExpression(Vec<usize>),
}

/// Errors that can occur while loading files consumed by the CLI.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
