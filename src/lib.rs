//! # nocode-logic - Form Logic Evaluation Engine
//!
//! **nocode-logic** evaluates the rules that non-programmers attach to form fields:
//! whether a field is *visible*, whether its answer is *valid*, and what *value* it
//! should be computed to. Rules are data, not code. They are stored as JSON trees in
//! one of two dialects:
//!
//! * **Condition sets**: nested `Any`/`All` groups of atomic comparisons such as
//!   "`age` is greater than or equal to `18`". Evaluated by [`ConditionEvaluator`].
//! * **Expressions**: typed operator trees whose operands are literals, field
//!   references or nested expressions. Operators come from an [`OperatorRegistry`]
//!   and are evaluated by [`ExpressionEvaluator`].
//!
//! ## Core Workflow
//!
//! 1.  **Load the rules**: deserialize a [`ConditionSet`] or [`NoCodeExpression`] from
//!     the stored JSON, or build one with the immutable `with_*` edit methods.
//! 2.  **Describe the data**: build a [`DataContext`] from the form's field types and
//!     the citizen's current answers.
//! 3.  **Evaluate**: run an evaluator for a single rule, or a [`FormStateEvaluator`]
//!     to determine the state of a whole form in one batch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nocode_logic::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let set: ConditionSet = serde_json::from_str(
//!         r#"{
//!             "operator": "All",
//!             "conditions": [
//!                 { "reference": "age", "operator": "GreaterThanOrEquals", "value": "18" }
//!             ],
//!             "conditionsSets": []
//!         }"#,
//!     )?;
//!
//!     let data = DataContext::new().with_answer("age", NoCodeDataType::Number, Value::Number(21.0));
//!
//!     let evaluator = ConditionEvaluator::new();
//!     let trace = evaluator.explain(&set, &data)?;
//!     println!("-> Visible: {:?}", trace.get_outcome());
//!     println!("-> Reason: {}", TraceFormatter::format_condition_trace(&trace));
//!
//!     let registry = OperatorRegistry::with_builtins();
//!     let expression = NoCodeExpression::with_operands(
//!         "add",
//!         vec![
//!             Some(NoCodeOperand::reference("age")),
//!             Some(NoCodeOperand::literal("1")),
//!         ],
//!     );
//!     let evaluated = ExpressionEvaluator::new(&registry).evaluate(
//!         &expression,
//!         &data,
//!         NoCodeDataType::Number,
//!     )?;
//!     println!("-> Next year: {} ({})", evaluated.value, evaluated.reason());
//!
//!     Ok(())
//! }
//! ```

pub mod ast;
pub mod data;
pub mod error;
pub mod evaluator;
pub mod prelude;
pub mod registry;
pub mod remote;
pub mod state;
pub mod trace;
pub mod validation;

pub use ast::{
    Comparand, Condition, ConditionOperator, ConditionSet, ConditionSetOperator,
    NoCodeDataType, NoCodeExpression, NoCodeOperand, Value,
};
pub use data::{DataContext, ReferenceResolver, Resolution};
pub use evaluator::{ConditionEvaluator, EvaluatorOptions, ExpressionEvaluator};
pub use registry::{OperatorCatalog, OperatorRegistry};
pub use state::FormStateEvaluator;
