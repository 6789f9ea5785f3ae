//! Tests for the form-wide determine-state pipeline.
mod common;
use common::*;
use nocode_logic::prelude::*;
use nocode_logic::state::{DEFAULT_VALIDATION_MESSAGE, StateStep};
use pretty_assertions::assert_eq;
use std::result::Result;
use serde_json::json;

/// A small benefits form:
/// * `age`: answered by the citizen
/// * `guardian`: visible only for minors, must not be empty
/// * `nextYearAge`: computed as `age + 1`
/// * `tariff`: computed from `nextYearAge`, overridden to "standard" without `consent`
/// * `email`: must contain an `@`
fn benefits_form() -> FormLogic {
    FormLogic::new(vec![
        FormElement::new("age", NoCodeDataType::Number).with_validation(
            ConditionSet::any().with_condition(
                Condition::new("age")
                    .with_operator(ConditionOperator::LessThan)
                    .with_value("0")
                    .with_unmet_message("Age cannot be negative"),
            ),
        ),
        FormElement::new("guardian", NoCodeDataType::String)
            .with_visibility(
                ConditionSet::all().with_condition(
                    Condition::new("age")
                        .with_operator(ConditionOperator::LessThan)
                        .with_value("18"),
                ),
            )
            .with_validation(
                ConditionSet::all()
                    .with_condition(Condition::new("guardian").with_operator(ConditionOperator::IsEmpty)),
            ),
        FormElement::new("nextYearAge", NoCodeDataType::Number)
            .with_value(call("add", vec![reference("age"), literal("1")])),
        FormElement::new("tariff", NoCodeDataType::String)
            .with_value(call(
                "ifThenElse",
                vec![
                    nested(call("greaterThanOrEquals", vec![reference("nextYearAge"), literal("65")])),
                    literal("senior"),
                    literal("standard"),
                ],
            ))
            .with_override(call(
                "ifThenElse",
                vec![reference("consent"), reference("tariff"), literal("standard")],
            )),
        FormElement::new("email", NoCodeDataType::String).with_validation(
            ConditionSet::all()
                .with_condition(
                    Condition::new("email")
                        .with_operator(ConditionOperator::NotContains)
                        .with_value("@"),
                )
                .with_unmet_message("Enter a valid e-mail address"),
        ),
    ])
}

fn data(answers: serde_json::Value) -> DataContext {
    let sample: SampleData = serde_json::from_value(json!({
        "fields": { "consent": "Boolean" },
        "answers": answers
    }))
    .unwrap();
    sample.to_context()
}

fn determine(answers: serde_json::Value) -> FormState {
    let registry = OperatorRegistry::with_builtins();
    FormStateEvaluator::new(&registry).determine_state(
        &benefits_form(),
        &data(answers),
        &DetermineStateRequest::all(),
    )
}

#[test]
fn test_adult_form_state() {
    let state = determine(json!({ "age": 70, "consent": true, "email": "a@b.nl" }));

    let guardian = state.element("guardian").unwrap();
    assert!(!guardian.visible);
    // Hidden elements are not validated.
    assert!(guardian.valid);

    assert_eq!(state.element("nextYearAge").unwrap().value, Some(Value::Number(71.0)));
    let tariff = state.element("tariff").unwrap();
    assert_eq!(tariff.value, Some(text("senior")));
    assert_eq!(tariff.override_value, Some(text("senior")));
    assert_eq!(tariff.effective_value(), Some(&text("senior")));
    assert!(state.is_valid());
    assert_eq!(state.failures().count(), 0);
}

#[test]
fn test_minor_without_guardian_is_invalid() {
    let state = determine(json!({ "age": 12, "consent": false, "email": "kid" }));

    let guardian = state.element("guardian").unwrap();
    assert!(guardian.visible);
    assert!(!guardian.valid);
    assert_eq!(guardian.messages, vec![DEFAULT_VALIDATION_MESSAGE.to_string()]);

    let email = state.element("email").unwrap();
    assert!(!email.valid);
    assert_eq!(email.messages, vec!["Enter a valid e-mail address".to_string()]);

    let tariff = state.element("tariff").unwrap();
    assert_eq!(tariff.value, Some(text("standard")));
    assert_eq!(tariff.override_value, Some(text("standard")));
    assert!(!state.is_valid());
}

#[test]
fn test_failures_are_recorded_per_element() {
    let registry = OperatorRegistry::with_builtins();
    let mut form = benefits_form();
    form.elements.push(
        FormElement::new("broken", NoCodeDataType::Number)
            .with_value(call("add", vec![reference("deletedField"), literal("1")]))
            .with_visibility(
                ConditionSet::all()
                    .with_condition(Condition::new("deletedField").with_operator(ConditionOperator::IsEmpty)),
            ),
    );
    let state = FormStateEvaluator::new(&registry).determine_state(
        &form,
        &data(json!({ "age": 30, "consent": true, "email": "a@b.nl" })),
        &DetermineStateRequest::all(),
    );

    let broken = state.element("broken").unwrap();
    assert!(broken.visible, "a failing visibility rule leaves the element visible");
    assert_eq!(broken.value, None);
    let steps: Vec<StateStep> = broken.failures.iter().map(|f| f.step).collect();
    assert_eq!(steps, vec![StateStep::Visibility, StateStep::Value]);
    assert_eq!(
        broken.failures[0].error,
        EvaluationError::UnresolvedReference("deletedField".to_string())
    );

    // Every other element was still evaluated.
    assert_eq!(state.element("nextYearAge").unwrap().value, Some(Value::Number(31.0)));
    assert_eq!(state.failures().count(), 2);
}

#[test]
fn test_skipped_steps_leave_defaults() {
    let registry = OperatorRegistry::with_builtins();
    let request = DetermineStateRequest::none().with_step(StateStep::Value, Steps::All);
    let state = FormStateEvaluator::new(&registry).determine_state(
        &benefits_form(),
        &data(json!({ "age": 12, "consent": false, "email": "kid" })),
        &request,
    );

    let guardian = state.element("guardian").unwrap();
    assert!(guardian.visible);
    assert!(guardian.valid);
    assert_eq!(state.element("nextYearAge").unwrap().value, Some(Value::Number(13.0)));
    assert_eq!(state.element("tariff").unwrap().override_value, None);
}

#[test]
fn test_hidden_field_is_empty_for_later_steps() {
    let registry = OperatorRegistry::with_builtins();
    let form = FormLogic::new(vec![
        FormElement::new("name", NoCodeDataType::String).with_visibility(
            ConditionSet::all().with_condition(
                Condition::new("showName")
                    .with_operator(ConditionOperator::Equals)
                    .with_value("true"),
            ),
        ),
        FormElement::new("greeting", NoCodeDataType::String)
            .with_value(call("concat", vec![literal("Hello "), reference("name")])),
    ]);
    let context = DataContext::new()
        .with_answer("showName", NoCodeDataType::Boolean, Value::Bool(false))
        .with_answer("name", NoCodeDataType::String, text("Alice"));
    let state = FormStateEvaluator::new(&registry).determine_state(
        &form,
        &context,
        &DetermineStateRequest::all(),
    );
    assert_eq!(state.element("greeting").unwrap().value, Some(text("Hello ")));
}

#[test]
fn test_request_wire_shape() {
    let request: DetermineStateRequest = serde_json::from_value(json!({
        "stepsToValidate": ["NONE"],
        "stepsToCalculateVisibilities": ["ALL"],
        "stepsToCalculateValues": ["ALL"],
        "stepsToCalculateOverrides": ["NONE"]
    }))
    .unwrap();
    assert!(!request.runs(StateStep::Validation));
    assert!(request.runs(StateStep::Visibility));
    assert!(!request.runs(StateStep::Override));
    assert_eq!(
        serde_json::to_value(DetermineStateRequest::all()).unwrap(),
        json!({
            "stepsToValidate": ["ALL"],
            "stepsToCalculateVisibilities": ["ALL"],
            "stepsToCalculateValues": ["ALL"],
            "stepsToCalculateOverrides": ["ALL"]
        })
    );

    let invalid: Result<DetermineStateRequest, _> =
        serde_json::from_value(json!({ "stepsToValidate": ["SOME"] }));
    assert!(invalid.is_err());
}

#[test]
fn test_form_logic_json_shape() {
    let form: FormLogic = serde_json::from_value(json!({
        "elements": [
            {
                "id": "age",
                "dataType": "Number",
                "validationConditions": {
                    "operator": "All",
                    "conditions": [{ "reference": "age", "operator": "IsEmpty" }],
                    "conditionsSets": []
                }
            },
            { "id": "note" }
        ]
    }))
    .unwrap();
    assert_eq!(form.elements.len(), 2);
    assert_eq!(form.elements[1].data_type, NoCodeDataType::Any);
    assert!(form.elements[0].validation_conditions.is_some());
}
