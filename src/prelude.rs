//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! nocode-logic crate. Import it to get the evaluators, the rule trees and the data
//! context without naming each module.
//!
//! # Example
//!
//! ```rust,no_run
//! use nocode_logic::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let registry = OperatorRegistry::with_builtins();
//! let form = FormLogic::from_file("path/to/form.json")?;
//! let data = SampleData::from_file("path/to/answers.json")?.to_context();
//!
//! let state = FormStateEvaluator::new(&registry).determine_state(
//!     &form,
//!     &data,
//!     &DetermineStateRequest::all(),
//! );
//! println!("Form valid: {}", state.is_valid());
//! # Ok(())
//! # }
//! ```

// Evaluators
pub use crate::evaluator::{
    ConditionEvaluator, DecimalSeparator, Evaluated, EvaluatorOptions, ExpressionEvaluator,
    TypeWarning,
};
pub use crate::state::{
    DetermineStateRequest, ElementState, FormElement, FormLogic, FormState,
    FormStateEvaluator, Steps,
};

// Rule trees and values
pub use crate::ast::{
    Comparand, Condition, ConditionOperator, ConditionSet, ConditionSetOperator,
    ConditionTrace, EvaluationTrace, NoCodeDataType, NoCodeExpression, NoCodeOperand, Value,
};

// Operators
pub use crate::registry::{
    NoCodeOperator, NoCodeOperatorDetails, NoCodeOperatorParameter, OperatorCatalog,
    OperatorQuery, OperatorRegistry,
};

// Data structures
pub use crate::data::{DataContext, ReferenceResolver, Resolution, SampleData};

// Error types
pub use crate::error::{EditError, EvaluationError, LoadError, OperatorError, RegistryError};

// Editor checks and trace formatting
pub use crate::trace::TraceFormatter;
pub use crate::validation::{
    TreeIssue, validate_condition_set, validate_condition_set_with_options, validate_expression,
    validate_expression_with_options,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
