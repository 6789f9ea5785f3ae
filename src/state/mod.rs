//! The form-wide "determine state" pipeline.
//!
//! A form's logic is evaluated in one batch: visibilities first, then computed values,
//! then overrides, then validation of the visible elements. Each element is evaluated
//! independently, so a broken rule on one element is reported on that element and the
//! rest of the form is still evaluated.

use crate::ast::{ConditionSet, NoCodeDataType, NoCodeExpression, Value};
use crate::data::DataContext;
use crate::data::model::read_json_file;
use crate::error::{EvaluationError, LoadError};
use crate::evaluator::{ConditionEvaluator, EvaluatorOptions, ExpressionEvaluator, TypeWarning};
use crate::registry::OperatorCatalog;
use serde::{Deserialize, Serialize};

mod request;

pub use request::{DetermineStateRequest, StateStep, Steps};

/// Shown when a validation set is violated but neither it nor its true conditions
/// carry a message.
pub const DEFAULT_VALIDATION_MESSAGE: &str = "This answer is not valid";

/// The logic attached to a single form element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormElement {
    pub id: String,
    #[serde(default = "default_element_type")]
    pub data_type: NoCodeDataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility_conditions: Option<ConditionSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_conditions: Option<ConditionSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_expression: Option<NoCodeExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_expression: Option<NoCodeExpression>,
}

fn default_element_type() -> NoCodeDataType {
    NoCodeDataType::Any
}

impl FormElement {
    pub fn new(id: &str, data_type: NoCodeDataType) -> Self {
        Self {
            id: id.to_string(),
            data_type,
            visibility_conditions: None,
            validation_conditions: None,
            value_expression: None,
            override_expression: None,
        }
    }

    #[must_use]
    pub fn with_visibility(mut self, set: ConditionSet) -> Self {
        self.visibility_conditions = Some(set);
        self
    }

    #[must_use]
    pub fn with_validation(mut self, set: ConditionSet) -> Self {
        self.validation_conditions = Some(set);
        self
    }

    #[must_use]
    pub fn with_value(mut self, expr: NoCodeExpression) -> Self {
        self.value_expression = Some(expr);
        self
    }

    #[must_use]
    pub fn with_override(mut self, expr: NoCodeExpression) -> Self {
        self.override_expression = Some(expr);
        self
    }
}

/// The elements of a form, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormLogic {
    #[serde(default)]
    pub elements: Vec<FormElement>,
}

impl FormLogic {
    pub fn new(elements: Vec<FormElement>) -> Self {
        Self { elements }
    }

    pub fn from_file(path: &str) -> Result<Self, LoadError> {
        read_json_file(path)
    }
}

/// An evaluation failure on one step of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFailure {
    pub step: StateStep,
    pub error: EvaluationError,
}

/// The computed state of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementState {
    pub id: String,
    pub visible: bool,
    pub valid: bool,
    /// Validation messages; empty when the element is valid.
    pub messages: Vec<String>,
    pub value: Option<Value>,
    pub override_value: Option<Value>,
    pub warnings: Vec<TypeWarning>,
    pub failures: Vec<StepFailure>,
}

impl ElementState {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            visible: true,
            valid: true,
            messages: Vec::new(),
            value: None,
            override_value: None,
            warnings: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn record_failure(&mut self, step: StateStep, error: EvaluationError) {
        log::warn!("{} of element '{}' failed: {}", step, self.id, error);
        self.failures.push(StepFailure { step, error });
    }

    /// The value the element ends up with: the override when one was computed.
    pub fn effective_value(&self) -> Option<&Value> {
        self.override_value.as_ref().or(self.value.as_ref())
    }
}

/// The state of every element, in the form's element order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub elements: Vec<ElementState>,
}

impl FormState {
    pub fn element(&self, id: &str) -> Option<&ElementState> {
        self.elements.iter().find(|state| state.id == id)
    }

    /// Whether every visible element passed validation.
    pub fn is_valid(&self) -> bool {
        self.elements.iter().all(|state| !state.visible || state.valid)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &StepFailure)> {
        self.elements.iter().flat_map(|state| {
            state
                .failures
                .iter()
                .map(move |failure| (state.id.as_str(), failure))
        })
    }
}

/// Runs the determine-state pipeline for a whole form.
pub struct FormStateEvaluator<'r> {
    conditions: ConditionEvaluator,
    expressions: ExpressionEvaluator<'r>,
}

impl<'r> FormStateEvaluator<'r> {
    pub fn new(registry: &'r dyn OperatorCatalog) -> Self {
        Self::with_options(registry, EvaluatorOptions::default())
    }

    pub fn with_options(registry: &'r dyn OperatorCatalog, options: EvaluatorOptions) -> Self {
        Self {
            conditions: ConditionEvaluator::builder().with_options(options).build(),
            expressions: ExpressionEvaluator::builder(registry)
                .with_options(options)
                .build(),
        }
    }

    /// Evaluates the requested steps of every element against `data`.
    ///
    /// Elements of the form that `data` does not know yet are treated as declared but
    /// unanswered. Hidden elements resolve as empty in every later step, and values and
    /// overrides are visible to the elements after them.
    pub fn determine_state(
        &self,
        form: &FormLogic,
        data: &DataContext,
        request: &DetermineStateRequest,
    ) -> FormState {
        log::info!("Determining state of {} elements", form.elements.len());
        let mut context = data.clone();
        for element in &form.elements {
            if !context.contains(&element.id) {
                context.declare(&element.id, element.data_type);
            }
        }
        let mut states: Vec<ElementState> = form
            .elements
            .iter()
            .map(|element| ElementState::new(&element.id))
            .collect();

        if request.runs(StateStep::Visibility) {
            self.calculate_visibilities(form, &context, &mut states);
            for state in states.iter().filter(|state| !state.visible) {
                context.set_hidden(&state.id, true);
            }
        }
        if request.runs(StateStep::Value) {
            self.calculate_values(form, &mut context, &mut states, StateStep::Value);
        }
        if request.runs(StateStep::Override) {
            self.calculate_values(form, &mut context, &mut states, StateStep::Override);
        }
        if request.runs(StateStep::Validation) {
            self.validate(form, &context, &mut states);
        }

        let failed = states.iter().filter(|s| !s.failures.is_empty()).count();
        if failed > 0 {
            log::warn!("{} of {} elements had evaluation failures", failed, states.len());
        }
        FormState { elements: states }
    }

    fn calculate_visibilities(
        &self,
        form: &FormLogic,
        context: &DataContext,
        states: &mut [ElementState],
    ) {
        log::debug!("Calculating visibilities");
        for (element, state) in form.elements.iter().zip(states.iter_mut()) {
            let Some(set) = &element.visibility_conditions else {
                continue;
            };
            // A broken visibility rule leaves the element visible.
            match self.conditions.evaluate(set, context) {
                Ok(visible) => state.visible = visible,
                Err(e) => state.record_failure(StateStep::Visibility, e),
            }
        }
    }

    fn calculate_values(
        &self,
        form: &FormLogic,
        context: &mut DataContext,
        states: &mut [ElementState],
        step: StateStep,
    ) {
        log::debug!("Calculating {} expressions", step);
        for (element, state) in form.elements.iter().zip(states.iter_mut()) {
            let expression = match step {
                StateStep::Override => &element.override_expression,
                _ => &element.value_expression,
            };
            let Some(expression) = expression else {
                continue;
            };
            match self
                .expressions
                .evaluate(expression, &*context, element.data_type)
            {
                Ok(evaluated) => {
                    context.set_answer(&element.id, evaluated.value.clone());
                    state.warnings.extend(evaluated.warnings);
                    match step {
                        StateStep::Override => state.override_value = Some(evaluated.value),
                        _ => state.value = Some(evaluated.value),
                    }
                }
                Err(e) => state.record_failure(step, e),
            }
        }
    }

    fn validate(&self, form: &FormLogic, context: &DataContext, states: &mut [ElementState]) {
        log::debug!("Validating visible elements");
        for (element, state) in form.elements.iter().zip(states.iter_mut()) {
            let Some(set) = &element.validation_conditions else {
                continue;
            };
            if !state.visible {
                continue;
            }
            // In validation mode a true set is a violation.
            match self.conditions.explain(set, context) {
                Ok(trace) if trace.get_outcome() == Some(true) => {
                    state.valid = false;
                    state.messages = trace.messages_of_true_conditions();
                    if state.messages.is_empty() {
                        state.messages.push(DEFAULT_VALIDATION_MESSAGE.to_string());
                    }
                }
                Ok(_) => {}
                Err(e) => state.record_failure(StateStep::Validation, e),
            }
        }
    }
}
