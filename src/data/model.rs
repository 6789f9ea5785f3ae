use super::DataContext;
use crate::ast::NoCodeDataType;
use crate::error::LoadError;
use ahash::AHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;

/// Sample runtime data in the JSON layout used by the CLI and the remote test endpoint:
/// an optional field schema plus the answers keyed by field id.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct SampleData {
    #[serde(default)]
    pub fields: AHashMap<String, NoCodeDataType>,
    #[serde(default)]
    pub answers: serde_json::Map<String, serde_json::Value>,
}

impl SampleData {
    /// Load sample data from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, LoadError> {
        read_json_file(path)
    }

    pub fn to_context(&self) -> DataContext {
        DataContext::from_json(&self.fields, &self.answers)
    }
}

/// Reads and deserializes a JSON file, keeping the path in the error.
pub(crate) fn read_json_file<T: DeserializeOwned>(path: &str) -> Result<T, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.to_string(),
        source,
    })
}
