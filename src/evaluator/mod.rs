//! Evaluation of condition sets and expressions against a data snapshot.
//!
//! Both evaluators are pure: they hold only configuration and borrowed, read-only
//! collaborators, so a single instance can be shared across threads and invoked on
//! every keystroke.

use serde::{Deserialize, Serialize};

mod condition;
mod expression;
pub(crate) mod literal;

pub use condition::{ConditionEvaluator, ConditionEvaluatorBuilder};
pub use expression::{Evaluated, ExpressionEvaluator, ExpressionEvaluatorBuilder, TypeWarning};

/// Which character a `Number` literal uses as its decimal separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecimalSeparator {
    /// Infer from the literal; see the number parsing rules on [`EvaluatorOptions`].
    #[default]
    Auto,
    Dot,
    Comma,
}

/// Settings shared by both evaluators.
///
/// Number literals are read with `decimal_separator`. In `Auto` mode the last of `.`
/// and `,` is the decimal separator when both appear, and a single separator character
/// that appears once is read as decimal, so `1,5` and `1.5` both mean one and a half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatorOptions {
    /// Deepest allowed nesting of expressions or condition sets.
    pub max_depth: usize,
    pub decimal_separator: DecimalSeparator,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            max_depth: 128,
            decimal_separator: DecimalSeparator::Auto,
        }
    }
}
