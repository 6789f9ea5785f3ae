use super::NoCodeDataType;
use chrono::NaiveDate;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Runtime value types used during evaluation.
///
/// `Null` stands for an empty answer and carries no kind of its own; it reports
/// [`NoCodeDataType::Any`] as its runtime type.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(NaiveDate),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn data_type(&self) -> NoCodeDataType {
        match self {
            Value::Null => NoCodeDataType::Any,
            Value::Bool(_) => NoCodeDataType::Boolean,
            Value::Number(_) => NoCodeDataType::Number,
            Value::String(_) => NoCodeDataType::String,
            Value::Date(_) => NoCodeDataType::Date,
            Value::List(_) => NoCodeDataType::List,
            Value::Object(_) => NoCodeDataType::Object,
        }
    }

    /// The value an unanswered or hidden field of the given kind resolves to.
    pub fn empty_for(data_type: NoCodeDataType) -> Value {
        match data_type {
            NoCodeDataType::String => Value::String(String::new()),
            NoCodeDataType::Boolean => Value::Bool(false),
            NoCodeDataType::List => Value::List(Vec::new()),
            NoCodeDataType::Object => Value::Object(BTreeMap::new()),
            NoCodeDataType::Any | NoCodeDataType::Number | NoCodeDataType::Date => Value::Null,
        }
    }

    /// Whether the value counts as "not filled in" for the `IsEmpty` family of checks.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Bool(_) | Value::Number(_) | Value::Date(_) => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts a JSON answer into a runtime value. A JSON string is read as a date
    /// only when the field is declared as `Date`; no other coercion takes place.
    pub fn from_json(json: &serde_json::Value, declared: NoCodeDataType) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => {
                if declared == NoCodeDataType::Date {
                    if let Ok(date) = NaiveDate::parse_from_str(s.trim(), DATE_FORMAT) {
                        return Value::Date(date);
                    }
                }
                Value::String(s.clone())
            }
            serde_json::Value::Array(items) => Value::List(
                items
                    .iter()
                    .map(|item| Value::from_json(item, NoCodeDataType::Any))
                    .collect(),
            ),
            serde_json::Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v, NoCodeDataType::Any)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map_or(serde_json::Value::Null, serde_json::Value::Number)
                }
            }
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.format(DATE_FORMAT).to_string()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Object(map) => write!(
                f,
                "{{{}}}",
                map.iter().map(|(k, v)| format!("{}: {}", k, v)).join(", ")
            ),
        }
    }
}
