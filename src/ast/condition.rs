use crate::error::EditError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Comparison kinds available to a legacy [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
    IsEmpty,
    IsNotEmpty,
}

impl ConditionOperator {
    /// Unary operators inspect the subject only and take no comparison value.
    pub fn is_unary(self) -> bool {
        matches!(self, ConditionOperator::IsEmpty | ConditionOperator::IsNotEmpty)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ConditionOperator::Equals => "==",
            ConditionOperator::NotEquals => "!=",
            ConditionOperator::Contains => "CONTAINS",
            ConditionOperator::NotContains => "NOT CONTAINS",
            ConditionOperator::StartsWith => "STARTS WITH",
            ConditionOperator::EndsWith => "ENDS WITH",
            ConditionOperator::GreaterThan => ">",
            ConditionOperator::GreaterThanOrEquals => ">=",
            ConditionOperator::LessThan => "<",
            ConditionOperator::LessThanOrEquals => "<=",
            ConditionOperator::IsEmpty => "IS EMPTY",
            ConditionOperator::IsNotEmpty => "IS NOT EMPTY",
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// What a binary condition compares its subject against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparand {
    /// A literal, read with the subject field's type.
    Value(String),
    /// The id of another field whose current value is used.
    Target(String),
    /// Literal mode chosen but nothing entered yet, persisted as `"value": null`.
    EmptyValue,
    /// Target mode chosen but no field picked yet, persisted as `"target": null`.
    EmptyTarget,
}

impl Comparand {
    /// Whether the comparand still needs input before the condition can be evaluated.
    pub fn is_pending(&self) -> bool {
        matches!(self, Comparand::EmptyValue | Comparand::EmptyTarget)
    }
}

/// One atomic comparison of a field against a literal or another field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawCondition", into = "RawCondition")]
pub struct Condition {
    pub reference: String,
    pub operator: Option<ConditionOperator>,
    pub comparand: Option<Comparand>,
    pub condition_unmet_message: Option<String>,
}

/// Persisted shape of a [`Condition`]. `value` and `target` are mutually exclusive.
///
/// The outer `Option` of `value`/`target` is key presence, the inner one is `null`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCondition {
    reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operator: Option<ConditionOperator>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    value: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    target: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition_unmet_message: Option<String>,
}

impl TryFrom<RawCondition> for Condition {
    type Error = String;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        let comparand = match (raw.value, raw.target) {
            (Some(_), Some(_)) => {
                return Err(format!(
                    "condition on '{}' sets both 'value' and 'target'",
                    raw.reference
                ));
            }
            (Some(Some(value)), None) => Some(Comparand::Value(value)),
            (Some(None), None) => Some(Comparand::EmptyValue),
            (None, Some(Some(target))) => Some(Comparand::Target(target)),
            (None, Some(None)) => Some(Comparand::EmptyTarget),
            (None, None) => None,
        };
        Ok(Condition {
            reference: raw.reference,
            operator: raw.operator,
            comparand,
            condition_unmet_message: raw.condition_unmet_message,
        })
    }
}

/// Maps a key that is present to `Some`, so a `null` value stays distinguishable from
/// a missing key.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl From<Condition> for RawCondition {
    fn from(condition: Condition) -> Self {
        let (value, target) = match condition.comparand {
            Some(Comparand::Value(v)) => (Some(Some(v)), None),
            Some(Comparand::Target(t)) => (None, Some(Some(t))),
            Some(Comparand::EmptyValue) => (Some(None), None),
            Some(Comparand::EmptyTarget) => (None, Some(None)),
            None => (None, None),
        };
        RawCondition {
            reference: condition.reference,
            operator: condition.operator,
            value,
            target,
            condition_unmet_message: condition.condition_unmet_message,
        }
    }
}

impl Condition {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_operator(&self, operator: ConditionOperator) -> Self {
        Self {
            operator: Some(operator),
            ..self.clone()
        }
    }

    /// Compares against a literal; any previously chosen target is dropped.
    #[must_use]
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self {
            comparand: Some(Comparand::Value(value.into())),
            ..self.clone()
        }
    }

    /// Compares against another field; any previously entered literal is dropped.
    #[must_use]
    pub fn with_target(&self, target: impl Into<String>) -> Self {
        Self {
            comparand: Some(Comparand::Target(target.into())),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_unmet_message(&self, message: impl Into<String>) -> Self {
        Self {
            condition_unmet_message: Some(message.into()),
            ..self.clone()
        }
    }

    pub fn value(&self) -> Option<&str> {
        match &self.comparand {
            Some(Comparand::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match &self.comparand {
            Some(Comparand::Target(t)) => Some(t),
            _ => None,
        }
    }
}

/// How the members of a [`ConditionSet`] are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConditionSetOperator {
    /// Disjunction: true when at least one member is true.
    Any,
    /// Conjunction: true when every member is true.
    #[default]
    All,
}

impl ConditionSetOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            ConditionSetOperator::Any => "OR",
            ConditionSetOperator::All => "AND",
        }
    }
}

/// A nested AND/OR group of conditions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionSet {
    pub operator: ConditionSetOperator,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub conditions_sets: Vec<ConditionSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_set_unmet_message: Option<String>,
}

impl ConditionSet {
    pub fn new(operator: ConditionSetOperator) -> Self {
        Self {
            operator,
            ..Self::default()
        }
    }

    pub fn all() -> Self {
        Self::new(ConditionSetOperator::All)
    }

    pub fn any() -> Self {
        Self::new(ConditionSetOperator::Any)
    }

    pub fn is_vacuous(&self) -> bool {
        self.conditions.is_empty() && self.conditions_sets.is_empty()
    }

    #[must_use]
    pub fn with_operator(&self, operator: ConditionSetOperator) -> Self {
        Self {
            operator,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_unmet_message(&self, message: impl Into<String>) -> Self {
        Self {
            condition_set_unmet_message: Some(message.into()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_condition(&self, condition: Condition) -> Self {
        let mut next = self.clone();
        next.conditions.push(condition);
        next
    }

    pub fn with_condition_replaced(
        &self,
        index: usize,
        condition: Condition,
    ) -> Result<Self, EditError> {
        let mut next = self.clone();
        let len = next.conditions.len();
        let slot = next
            .conditions
            .get_mut(index)
            .ok_or(EditError::IndexOutOfRange { index, len })?;
        *slot = condition;
        Ok(next)
    }

    pub fn without_condition(&self, index: usize) -> Result<Self, EditError> {
        if index >= self.conditions.len() {
            return Err(EditError::IndexOutOfRange {
                index,
                len: self.conditions.len(),
            });
        }
        let mut next = self.clone();
        next.conditions.remove(index);
        Ok(next)
    }

    #[must_use]
    pub fn with_nested_set(&self, set: ConditionSet) -> Self {
        let mut next = self.clone();
        next.conditions_sets.push(set);
        next
    }

    pub fn without_nested_set(&self, index: usize) -> Result<Self, EditError> {
        if index >= self.conditions_sets.len() {
            return Err(EditError::IndexOutOfRange {
                index,
                len: self.conditions_sets.len(),
            });
        }
        let mut next = self.clone();
        next.conditions_sets.remove(index);
        Ok(next)
    }

    /// Collects every field id referenced anywhere in the set, subjects and targets alike.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_references(&mut fields);
        fields
    }

    fn collect_references<'a>(&'a self, fields: &mut Vec<&'a str>) {
        for condition in &self.conditions {
            fields.push(condition.reference.as_str());
            if let Some(target) = condition.target() {
                fields.push(target);
            }
        }
        for set in &self.conditions_sets {
            set.collect_references(fields);
        }
    }
}
