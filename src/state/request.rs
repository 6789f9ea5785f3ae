use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a step of the determine-state pipeline runs. On the wire this is the
/// single-item list `["ALL"]` or `["NONE"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub enum Steps {
    #[default]
    All,
    None,
}

impl Steps {
    pub fn is_enabled(self) -> bool {
        self == Steps::All
    }
}

impl TryFrom<Vec<String>> for Steps {
    type Error = String;

    fn try_from(items: Vec<String>) -> Result<Self, Self::Error> {
        match items.as_slice() {
            [item] if item == "ALL" => Ok(Steps::All),
            [] => Ok(Steps::None),
            [item] if item == "NONE" => Ok(Steps::None),
            other => Err(format!(
                "expected [\"ALL\"] or [\"NONE\"], found {:?}",
                other
            )),
        }
    }
}

impl From<Steps> for Vec<String> {
    fn from(steps: Steps) -> Self {
        let item = match steps {
            Steps::All => "ALL",
            Steps::None => "NONE",
        };
        vec![item.to_string()]
    }
}

/// Selects which steps of the pipeline to run. Every step runs by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetermineStateRequest {
    pub steps_to_validate: Steps,
    pub steps_to_calculate_visibilities: Steps,
    pub steps_to_calculate_values: Steps,
    pub steps_to_calculate_overrides: Steps,
}

impl DetermineStateRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn none() -> Self {
        Self {
            steps_to_validate: Steps::None,
            steps_to_calculate_visibilities: Steps::None,
            steps_to_calculate_values: Steps::None,
            steps_to_calculate_overrides: Steps::None,
        }
    }

    #[must_use]
    pub fn with_step(mut self, step: StateStep, steps: Steps) -> Self {
        match step {
            StateStep::Visibility => self.steps_to_calculate_visibilities = steps,
            StateStep::Value => self.steps_to_calculate_values = steps,
            StateStep::Override => self.steps_to_calculate_overrides = steps,
            StateStep::Validation => self.steps_to_validate = steps,
        }
        self
    }

    pub fn runs(&self, step: StateStep) -> bool {
        match step {
            StateStep::Visibility => self.steps_to_calculate_visibilities,
            StateStep::Value => self.steps_to_calculate_values,
            StateStep::Override => self.steps_to_calculate_overrides,
            StateStep::Validation => self.steps_to_validate,
        }
        .is_enabled()
    }
}

/// One step of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StateStep {
    Visibility,
    Value,
    Override,
    Validation,
}

impl fmt::Display for StateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateStep::Visibility => "visibility",
            StateStep::Value => "value",
            StateStep::Override => "override",
            StateStep::Validation => "validation",
        };
        write!(f, "{}", name)
    }
}
