use crate::ast::{NoCodeDataType, Value};
use crate::error::EvaluationError;
use ahash::AHashMap;

/// The outcome of looking up a field by id.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The field exists and holds a value.
    Answered {
        data_type: NoCodeDataType,
        value: Value,
    },
    /// The field exists but is unanswered or hidden. `value` is the empty value for
    /// the field's type.
    Empty {
        data_type: NoCodeDataType,
        value: Value,
    },
    /// No field with this id exists, typically because the element was deleted.
    NotFound,
}

impl Resolution {
    /// Turns a lookup into the typed value used by the evaluators; only `NotFound` fails.
    pub fn into_typed_value(
        self,
        element_id: &str,
    ) -> Result<(NoCodeDataType, Value), EvaluationError> {
        match self {
            Resolution::Answered { data_type, value } | Resolution::Empty { data_type, value } => {
                Ok((data_type, value))
            }
            Resolution::NotFound => Err(EvaluationError::UnresolvedReference(
                element_id.to_string(),
            )),
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Resolution::NotFound)
    }
}

/// Looks up the current value of a form field.
pub trait ReferenceResolver {
    fn resolve(&self, element_id: &str) -> Resolution;

    /// Declared type of a field, or `None` when the field is unknown.
    fn declared_type(&self, element_id: &str) -> Option<NoCodeDataType> {
        match self.resolve(element_id) {
            Resolution::Answered { data_type, .. } | Resolution::Empty { data_type, .. } => {
                Some(data_type)
            }
            Resolution::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FieldEntry {
    data_type: NoCodeDataType,
    value: Value,
    hidden: bool,
}

/// An immutable-by-convention snapshot of a form's fields and the citizen's answers.
///
/// Fields must be declared (directly or by answering them) before they can be
/// referenced; a reference to an undeclared field resolves to
/// [`Resolution::NotFound`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataContext {
    fields: AHashMap<String, FieldEntry>,
}

impl DataContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from a field schema and a JSON object of answers. Answers for
    /// fields missing from the schema are declared with their runtime type.
    pub fn from_json(
        schema: &AHashMap<String, NoCodeDataType>,
        answers: &serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let mut context = Self::new();
        for (id, data_type) in schema {
            context.declare(id, *data_type);
        }
        for (id, json) in answers {
            let declared = schema.get(id).copied().unwrap_or(NoCodeDataType::Any);
            context.set_answer(id, Value::from_json(json, declared));
        }
        context
    }

    /// Builds a context where exactly the keys of `answers` are known fields.
    pub fn from_answers(answers: &serde_json::Map<String, serde_json::Value>) -> Self {
        Self::from_json(&AHashMap::new(), answers)
    }

    #[must_use]
    pub fn with_field(mut self, id: &str, data_type: NoCodeDataType) -> Self {
        self.declare(id, data_type);
        self
    }

    #[must_use]
    pub fn with_answer(mut self, id: &str, data_type: NoCodeDataType, value: Value) -> Self {
        self.declare(id, data_type);
        self.set_answer(id, value);
        self
    }

    /// Declares a field. Redeclaring keeps the current answer and updates the type.
    pub fn declare(&mut self, id: &str, data_type: NoCodeDataType) {
        self.fields
            .entry(id.to_string())
            .and_modify(|entry| entry.data_type = data_type)
            .or_insert(FieldEntry {
                data_type,
                value: Value::Null,
                hidden: false,
            });
    }

    /// Stores an answer. Undeclared fields are declared with the value's runtime type.
    pub fn set_answer(&mut self, id: &str, value: Value) {
        match self.fields.get_mut(id) {
            Some(entry) => entry.value = value,
            None => {
                self.fields.insert(
                    id.to_string(),
                    FieldEntry {
                        data_type: value.data_type(),
                        value,
                        hidden: false,
                    },
                );
            }
        }
    }

    /// Marks a field as hidden; hidden fields resolve as empty.
    pub fn set_hidden(&mut self, id: &str, hidden: bool) {
        if let Some(entry) = self.fields.get_mut(id) {
            entry.hidden = hidden;
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fields.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The stored answer, ignoring visibility.
    pub fn answer(&self, id: &str) -> Option<&Value> {
        self.fields.get(id).map(|entry| &entry.value)
    }
}

impl ReferenceResolver for DataContext {
    fn resolve(&self, element_id: &str) -> Resolution {
        let Some(entry) = self.fields.get(element_id) else {
            return Resolution::NotFound;
        };
        let data_type = match entry.data_type {
            NoCodeDataType::Any => entry.value.data_type(),
            declared => declared,
        };
        if entry.hidden || entry.value.is_empty() {
            Resolution::Empty {
                data_type,
                value: Value::empty_for(data_type),
            }
        } else {
            Resolution::Answered {
                data_type,
                value: entry.value.clone(),
            }
        }
    }
}
