//! The operator registry: descriptors and semantic functions for expression operators.
//!
//! The registry is always handed to evaluators explicitly, so tests can run against a
//! fixed operator set and the remote catalog can be cached per session.

use crate::ast::{NoCodeDataType, Value};
use crate::error::{OperatorError, RegistryError};
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

mod builtin;
mod query;

pub use builtin::{builtin_operator, register_builtin_operators};
pub use query::OperatorQuery;

/// One declared parameter of an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoCodeOperatorParameter {
    #[serde(rename = "type")]
    pub data_type: NoCodeDataType,
    /// When present, a literal placed in this slot must be one of these values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl NoCodeOperatorParameter {
    pub fn new(data_type: NoCodeDataType) -> Self {
        Self {
            data_type,
            options: None,
        }
    }

    pub fn with_options(data_type: NoCodeDataType, options: &[&str]) -> Self {
        Self {
            data_type,
            options: Some(options.iter().map(|o| o.to_string()).collect()),
        }
    }
}

/// Immutable descriptor of an operator, as served by the operator catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoCodeOperatorDetails {
    pub identifier: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<NoCodeOperatorParameter>,
    pub return_type: NoCodeDataType,
}

/// An operator the engine can execute locally.
pub trait NoCodeOperator: Send + Sync {
    fn details(&self) -> &NoCodeOperatorDetails;

    /// Applies the operator. `arguments` is index-aligned with the declared parameters
    /// and every argument has already been checked against its parameter type, though
    /// any of them may be `Value::Null` for an empty answer.
    fn apply(&self, arguments: &[Value]) -> Result<Value, OperatorError>;
}

/// Read-only view of an operator catalog, as consumed by the evaluators.
pub trait OperatorCatalog: Send + Sync {
    fn describe(&self, identifier: &str) -> Option<&NoCodeOperatorDetails>;

    fn list_operators(&self, query: &OperatorQuery) -> Vec<&NoCodeOperatorDetails>;

    fn apply(&self, identifier: &str, arguments: &[Value]) -> Result<Value, OperatorError>;
}

struct RegisteredOperator {
    details: NoCodeOperatorDetails,
    implementation: Option<Arc<dyn NoCodeOperator>>,
}

/// In-memory operator catalog.
///
/// Operators registered with [`OperatorRegistry::register`] carry a local semantic
/// function. Descriptors loaded from the remote catalog can be described and listed,
/// but fail with [`OperatorError::NotImplementedLocally`] when applied.
#[derive(Default)]
pub struct OperatorRegistry {
    operators: AHashMap<String, RegisteredOperator>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in local operators.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtin_operators(&mut registry);
        registry
    }

    /// Builds a registry from the JSON body of the `operators` catalog endpoint.
    pub fn from_catalog_json(json: &str) -> Result<Self, RegistryError> {
        let descriptors: Vec<NoCodeOperatorDetails> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for details in descriptors {
            registry.register_descriptor(details)?;
        }
        Ok(registry)
    }

    /// A registry holding only the named built-in operators. Unknown names are skipped.
    pub fn with_builtin_subset(identifiers: &[&str]) -> Self {
        let mut registry = Self::new();
        for identifier in identifiers {
            match builtin_operator(identifier) {
                Some(operator) => {
                    if let Err(e) = registry.register_boxed(operator) {
                        log::warn!("Skipping built-in operator: {}", e);
                    }
                }
                None => log::warn!("No built-in operator named '{}'", identifier),
            }
        }
        registry
    }

    pub fn register<O: NoCodeOperator + 'static>(
        &mut self,
        operator: O,
    ) -> Result<(), RegistryError> {
        let details = operator.details().clone();
        self.insert(details, Some(Arc::new(operator)))
    }

    pub fn register_boxed(&mut self, operator: Box<dyn NoCodeOperator>) -> Result<(), RegistryError> {
        let details = operator.details().clone();
        self.insert(details, Some(Arc::from(operator)))
    }

    /// Registers a descriptor without a local implementation.
    pub fn register_descriptor(
        &mut self,
        details: NoCodeOperatorDetails,
    ) -> Result<(), RegistryError> {
        self.insert(details, None)
    }

    /// Adds remote descriptors for identifiers the registry does not know yet and
    /// returns how many were added. Local implementations are never replaced.
    pub fn merge_catalog(&mut self, descriptors: Vec<NoCodeOperatorDetails>) -> usize {
        let mut added = 0;
        for details in descriptors {
            if !self.operators.contains_key(&details.identifier) {
                self.operators.insert(
                    details.identifier.clone(),
                    RegisteredOperator {
                        details,
                        implementation: None,
                    },
                );
                added += 1;
            }
        }
        log::debug!("Merged {} remote operator descriptors", added);
        added
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn has_local_implementation(&self, identifier: &str) -> bool {
        self.operators
            .get(identifier)
            .is_some_and(|op| op.implementation.is_some())
    }

    fn insert(
        &mut self,
        details: NoCodeOperatorDetails,
        implementation: Option<Arc<dyn NoCodeOperator>>,
    ) -> Result<(), RegistryError> {
        if self.operators.contains_key(&details.identifier) {
            return Err(RegistryError::DuplicateOperator(details.identifier));
        }
        self.operators.insert(
            details.identifier.clone(),
            RegisteredOperator {
                details,
                implementation,
            },
        );
        Ok(())
    }
}

impl OperatorCatalog for OperatorRegistry {
    fn describe(&self, identifier: &str) -> Option<&NoCodeOperatorDetails> {
        self.operators.get(identifier).map(|op| &op.details)
    }

    fn list_operators(&self, query: &OperatorQuery) -> Vec<&NoCodeOperatorDetails> {
        self.operators
            .values()
            .map(|op| &op.details)
            .filter(|details| query.matches(details))
            .sorted_by(|a, b| a.label.cmp(&b.label).then(a.identifier.cmp(&b.identifier)))
            .collect()
    }

    fn apply(&self, identifier: &str, arguments: &[Value]) -> Result<Value, OperatorError> {
        match self.operators.get(identifier) {
            Some(RegisteredOperator {
                implementation: Some(implementation),
                ..
            }) => implementation.apply(arguments),
            _ => Err(OperatorError::NotImplementedLocally),
        }
    }
}
