use super::literal::parse_literal;
use super::{DecimalSeparator, EvaluatorOptions};
use crate::ast::{
    Comparand, Condition, ConditionOperator, ConditionSet, ConditionSetOperator,
    ConditionTrace, EvaluationTrace, NoCodeDataType, Value,
};
use crate::data::ReferenceResolver;
use crate::error::EvaluationError;
use std::cmp::Ordering;

/// Evaluates legacy condition sets.
///
/// The evaluator returns the literal truth value of the set. Whether `true` means
/// "show this field" or "this answer is invalid" is decided by the caller.
#[derive(Debug, Clone, Default)]
pub struct ConditionEvaluator {
    options: EvaluatorOptions,
}

pub struct ConditionEvaluatorBuilder {
    options: EvaluatorOptions,
}

impl ConditionEvaluatorBuilder {
    pub fn with_options(mut self, options: EvaluatorOptions) -> Self {
        self.options = options;
        self
    }
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }
    pub fn with_decimal_separator(mut self, separator: DecimalSeparator) -> Self {
        self.options.decimal_separator = separator;
        self
    }
    pub fn build(self) -> ConditionEvaluator {
        ConditionEvaluator {
            options: self.options,
        }
    }
}

enum Member<'a> {
    Condition(&'a Condition),
    Set(&'a ConditionSet),
}

impl ConditionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ConditionEvaluatorBuilder {
        ConditionEvaluatorBuilder {
            options: EvaluatorOptions::default(),
        }
    }

    pub fn options(&self) -> &EvaluatorOptions {
        &self.options
    }

    /// Evaluates the set. An empty `All` set is `true` and an empty `Any` set is `false`.
    pub fn evaluate(
        &self,
        set: &ConditionSet,
        data: &dyn ReferenceResolver,
    ) -> Result<bool, EvaluationError> {
        Ok(self.evaluate_set(set, data, 1)?.get_outcome().unwrap_or(false))
    }

    /// Evaluates the set and returns the full trace, including unmet messages.
    pub fn explain(
        &self,
        set: &ConditionSet,
        data: &dyn ReferenceResolver,
    ) -> Result<ConditionTrace, EvaluationError> {
        log::debug!(
            "Evaluating condition set ({} conditions, {} nested sets)",
            set.conditions.len(),
            set.conditions_sets.len()
        );
        self.evaluate_set(set, data, 1)
    }

    /// Evaluates a single condition.
    pub fn evaluate_condition(
        &self,
        condition: &Condition,
        data: &dyn ReferenceResolver,
    ) -> Result<bool, EvaluationError> {
        Ok(self
            .condition_trace(condition, data)?
            .get_outcome()
            .unwrap_or(false))
    }

    fn evaluate_set(
        &self,
        set: &ConditionSet,
        data: &dyn ReferenceResolver,
        depth: usize,
    ) -> Result<ConditionTrace, EvaluationError> {
        if depth > self.options.max_depth {
            return Err(EvaluationError::MalformedTree(format!(
                "condition sets nested deeper than {} levels",
                self.options.max_depth
            )));
        }

        // The value that ends evaluation early: one false for All, one true for Any.
        let decisive = set.operator == ConditionSetOperator::Any;
        let mut outcome = !decisive;
        let mut short_circuited = false;
        let mut members = Vec::with_capacity(set.conditions.len() + set.conditions_sets.len());

        let all_members = set
            .conditions
            .iter()
            .map(Member::Condition)
            .chain(set.conditions_sets.iter().map(Member::Set));

        // A failing member only fails the set when no other member decides it.
        let mut first_error = None;

        for member in all_members {
            if short_circuited {
                members.push(ConditionTrace::NotEvaluated);
                continue;
            }
            let result = match member {
                Member::Condition(condition) => self.condition_trace(condition, data),
                Member::Set(nested) => self.evaluate_set(nested, data, depth + 1),
            };
            let trace = match result {
                Ok(trace) => trace,
                Err(e) => {
                    first_error.get_or_insert(e);
                    members.push(ConditionTrace::NotEvaluated);
                    continue;
                }
            };
            if trace.get_outcome() == Some(decisive) {
                outcome = decisive;
                short_circuited = true;
            }
            members.push(trace);
        }

        if let (false, Some(e)) = (short_circuited, first_error) {
            return Err(e);
        }

        Ok(ConditionTrace::Set {
            operator: set.operator,
            members,
            outcome,
            unmet_message: set.condition_set_unmet_message.clone(),
        })
    }

    fn condition_trace(
        &self,
        condition: &Condition,
        data: &dyn ReferenceResolver,
    ) -> Result<ConditionTrace, EvaluationError> {
        if condition.reference.is_empty() {
            return Err(EvaluationError::MalformedTree(
                "condition has no reference".to_string(),
            ));
        }
        let operator = condition.operator.ok_or_else(|| {
            EvaluationError::MalformedTree(format!(
                "condition on '{}' has no operator",
                condition.reference
            ))
        })?;
        let (subject_type, subject_value) = data
            .resolve(&condition.reference)
            .into_typed_value(&condition.reference)?;

        let (outcome, comparand) = if operator.is_unary() {
            let empty = subject_value.is_empty();
            let outcome = match operator {
                ConditionOperator::IsEmpty => empty,
                _ => !empty,
            };
            (outcome, None)
        } else {
            let comparand = self.comparand_trace(condition, operator, subject_type, data)?;
            let outcome = compare(
                operator,
                &subject_value,
                &comparand.get_outcome(),
                &condition.reference,
                subject_type,
            )?;
            (outcome, Some(Box::new(comparand)))
        };

        log::trace!(
            "Condition ${} {} -> {}",
            condition.reference,
            operator,
            outcome
        );

        Ok(ConditionTrace::Condition {
            subject: format!("${}", condition.reference),
            subject_value,
            operator,
            comparand,
            outcome,
            unmet_message: condition.condition_unmet_message.clone(),
        })
    }

    fn comparand_trace(
        &self,
        condition: &Condition,
        operator: ConditionOperator,
        subject_type: NoCodeDataType,
        data: &dyn ReferenceResolver,
    ) -> Result<EvaluationTrace, EvaluationError> {
        match &condition.comparand {
            None | Some(Comparand::EmptyValue | Comparand::EmptyTarget) => Err(EvaluationError::MissingOperand {
                operator: format!("{:?}", operator),
                index: 1,
                expected: subject_type,
            }),
            Some(Comparand::Value(literal)) => {
                // Text operators compare against the literal as written.
                let literal_type = match operator {
                    ConditionOperator::Contains
                    | ConditionOperator::NotContains
                    | ConditionOperator::StartsWith
                    | ConditionOperator::EndsWith => NoCodeDataType::String,
                    _ => subject_type,
                };
                let value = parse_literal(literal, literal_type, self.options.decimal_separator)
                    .ok_or_else(|| {
                        EvaluationError::literal_mismatch(
                            format!("condition on '{}'", condition.reference),
                            subject_type,
                            literal,
                        )
                    })?;
                Ok(EvaluationTrace::Leaf {
                    source: value.to_string(),
                    value,
                })
            }
            Some(Comparand::Target(target)) => {
                let (_, value) = data.resolve(target).into_typed_value(target)?;
                Ok(EvaluationTrace::Leaf {
                    source: format!("${}", target),
                    value,
                })
            }
        }
    }
}

/// Applies a binary comparison. An empty subject fails every comparison except the
/// negated ones; values of different kinds are never equal.
fn compare(
    operator: ConditionOperator,
    subject: &Value,
    other: &Value,
    reference: &str,
    subject_type: NoCodeDataType,
) -> Result<bool, EvaluationError> {
    if subject.is_null() {
        return Ok(matches!(
            operator,
            ConditionOperator::NotEquals | ConditionOperator::NotContains
        ));
    }

    let context = || format!("condition on '{}'", reference);
    match operator {
        ConditionOperator::Equals => Ok(subject == other),
        ConditionOperator::NotEquals => Ok(subject != other),
        ConditionOperator::Contains | ConditionOperator::NotContains => {
            let contains = match (subject, other) {
                (Value::String(s), Value::String(o)) => s.to_lowercase().contains(&o.to_lowercase()),
                (Value::List(items), Value::String(text)) => items
                    .iter()
                    .any(|item| item == other || plain_text(item) == *text),
                (Value::List(items), _) => items.contains(other),
                (_, Value::Null) => false,
                _ => return Err(EvaluationError::type_mismatch(context(), subject_type, other)),
            };
            Ok(contains == (operator == ConditionOperator::Contains))
        }
        ConditionOperator::StartsWith | ConditionOperator::EndsWith => match (subject, other) {
            (Value::String(s), Value::String(o)) => {
                let (s, o) = (s.to_lowercase(), o.to_lowercase());
                Ok(if operator == ConditionOperator::StartsWith {
                    s.starts_with(&o)
                } else {
                    s.ends_with(&o)
                })
            }
            (_, Value::Null) => Ok(false),
            _ => Err(EvaluationError::type_mismatch(
                context(),
                NoCodeDataType::String,
                subject,
            )),
        },
        ConditionOperator::GreaterThan
        | ConditionOperator::GreaterThanOrEquals
        | ConditionOperator::LessThan
        | ConditionOperator::LessThanOrEquals => {
            let ordering = match (subject, other) {
                (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
                (Value::Number(_) | Value::Date(_), Value::Null) => None,
                (Value::Number(_) | Value::Date(_), _) => {
                    return Err(EvaluationError::type_mismatch(context(), subject_type, other));
                }
                _ => {
                    return Err(EvaluationError::type_mismatch(
                        context(),
                        NoCodeDataType::Number,
                        subject,
                    ));
                }
            };
            Ok(match ordering {
                Some(Ordering::Greater) => matches!(
                    operator,
                    ConditionOperator::GreaterThan | ConditionOperator::GreaterThanOrEquals
                ),
                Some(Ordering::Equal) => matches!(
                    operator,
                    ConditionOperator::GreaterThanOrEquals | ConditionOperator::LessThanOrEquals
                ),
                Some(Ordering::Less) => matches!(
                    operator,
                    ConditionOperator::LessThan | ConditionOperator::LessThanOrEquals
                ),
                None => false,
            })
        }
        ConditionOperator::IsEmpty => Ok(subject.is_empty()),
        ConditionOperator::IsNotEmpty => Ok(!subject.is_empty()),
    }
}

/// Text of a value without the quotes `Display` puts around strings.
fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
