//! Payloads and endpoint URLs of the logic service.
//!
//! The crate does no networking itself. These types describe the JSON bodies so a
//! caller can talk to the remote catalog and test-evaluate endpoints, or answer them
//! locally.

use crate::ast::{NoCodeDataType, NoCodeExpression};
use crate::data::DataContext;
use crate::error::EvaluationError;
use crate::evaluator::{EvaluatorOptions, ExpressionEvaluator};
use crate::registry::{OperatorCatalog, OperatorQuery};
use serde::{Deserialize, Serialize};
use url::Url;

/// Body of `POST evaluate`, the editor's "test expression" call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub expression: NoCodeExpression,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl EvaluateRequest {
    pub fn new(expression: NoCodeExpression) -> Self {
        Self {
            expression,
            data: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: serde_json::Map<String, serde_json::Value>) -> Self {
        self.data = data;
        self
    }

    /// Answers the request with the local evaluator. Only the keys of `data` are known
    /// fields, so any other reference fails as unresolved.
    pub fn evaluate_locally(
        &self,
        registry: &dyn OperatorCatalog,
        options: EvaluatorOptions,
    ) -> EvaluateResponse {
        let context = DataContext::from_answers(&self.data);
        let evaluator = ExpressionEvaluator::builder(registry)
            .with_options(options)
            .build();
        match evaluator.evaluate(&self.expression, &context, NoCodeDataType::Any) {
            Ok(evaluated) => EvaluateResponse::Success {
                result: evaluated.value.to_json(),
            },
            Err(e) => {
                log::debug!("Test evaluation failed: {}", e);
                EvaluateResponse::from(&e)
            }
        }
    }
}

/// The error half of an [`EvaluateResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: String,
    pub message: String,
}

/// Body returned by `POST evaluate`: either `{"result": ..}` or `{"error": {..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvaluateResponse {
    Success { result: serde_json::Value },
    Failure { error: ErrorPayload },
}

impl EvaluateResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, EvaluateResponse::Success { .. })
    }
}

impl From<&EvaluationError> for EvaluateResponse {
    fn from(error: &EvaluationError) -> Self {
        EvaluateResponse::Failure {
            error: ErrorPayload {
                kind: error.kind().to_string(),
                message: error.to_string(),
            },
        }
    }
}

/// URL of the operator catalog under `base`, filtered by `query`.
pub fn operators_url(base: &Url, query: &OperatorQuery) -> Result<Url, url::ParseError> {
    let mut url = base.join("operators")?;
    let encoded = query.to_query_string();
    url.set_query((!encoded.is_empty()).then_some(encoded.as_str()));
    Ok(url)
}

/// URL of the test-evaluate endpoint under `base`.
pub fn evaluate_url(base: &Url) -> Result<Url, url::ParseError> {
    base.join("evaluate")
}
