use crate::ast::{ConditionTrace, EvaluationTrace, Value};
use itertools::Itertools;

/// Formats evaluation traces into human-readable strings
pub struct TraceFormatter;

impl TraceFormatter {
    /// Format an expression trace, e.g. `greaterThanOrEquals($age (was 21), 18)`.
    pub fn format_trace(trace: &EvaluationTrace) -> String {
        match trace {
            EvaluationTrace::Operator {
                identifier,
                arguments,
                ..
            } => format!(
                "{}({})",
                identifier,
                arguments.iter().map(Self::format_trace).join(", ")
            ),
            EvaluationTrace::Leaf { source, value } => Self::format_leaf(source, value),
        }
    }

    /// Format a condition trace, e.g. `$age (was 21) >= 18 AND $name IS NOT EMPTY`.
    ///
    /// Members skipped by short-circuiting are left out, so the output shows only the
    /// part of the set that decided the result.
    pub fn format_condition_trace(trace: &ConditionTrace) -> String {
        // Start the recursive formatting with the lowest possible parent precedence.
        Self::format_condition_recursive(trace, 0)
    }

    fn format_condition_recursive(trace: &ConditionTrace, parent_precedence: u8) -> String {
        let current_precedence = trace.precedence();
        let needs_parens = current_precedence < parent_precedence;

        let body = match trace {
            ConditionTrace::Set {
                operator,
                members,
                outcome,
                ..
            } => {
                let evaluated: Vec<String> = members
                    .iter()
                    .filter(|m| !matches!(m, ConditionTrace::NotEvaluated))
                    .map(|m| Self::format_condition_recursive(m, current_precedence))
                    .collect();
                if evaluated.is_empty() {
                    // A vacuous set has nothing to show but its identity value.
                    outcome.to_string()
                } else {
                    evaluated.join(&format!(" {} ", operator.symbol()))
                }
            }
            ConditionTrace::Condition {
                subject,
                subject_value,
                operator,
                comparand,
                ..
            } => {
                let subject = Self::format_leaf(subject, subject_value);
                match comparand {
                    Some(comparand) => {
                        format!("{} {} {}", subject, operator, Self::format_trace(comparand))
                    }
                    None => format!("{} {}", subject, operator),
                }
            }
            ConditionTrace::NotEvaluated => String::new(),
        };

        if needs_parens {
            format!("({})", body)
        } else {
            body
        }
    }

    fn format_leaf(source: &str, value: &Value) -> String {
        if source.starts_with('$') {
            format!("{} (was {})", source, value)
        } else {
            source.to_string()
        }
    }
}
