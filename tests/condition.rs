//! Tests for condition set evaluation.
mod common;
use common::*;
use nocode_logic::prelude::*;
use pretty_assertions::assert_eq;
use std::result::Result;
use rstest::rstest;

fn condition(reference: &str, operator: ConditionOperator, value: &str) -> Condition {
    Condition::new(reference)
        .with_operator(operator)
        .with_value(value)
}

fn evaluate(set: &ConditionSet, data: &DataContext) -> Result<bool, EvaluationError> {
    ConditionEvaluator::new().evaluate(set, data)
}

#[test]
fn test_adult_scenario() {
    let set = adult_condition_set();
    assert_eq!(evaluate(&set, &age_context(Some(21.0))), Ok(true));
    assert_eq!(evaluate(&set, &age_context(Some(18.0))), Ok(true));
    assert_eq!(evaluate(&set, &age_context(Some(16.0))), Ok(false));
}

#[test]
fn test_unanswered_field_fails_comparison_deterministically() {
    let set = adult_condition_set();
    let context = age_context(None);
    for _ in 0..3 {
        assert_eq!(evaluate(&set, &context), Ok(false));
    }
}

#[test]
fn test_unknown_field_is_unresolved_reference() {
    let set = adult_condition_set();
    let result = evaluate(&set, &DataContext::new());
    assert_eq!(
        result,
        Err(EvaluationError::UnresolvedReference("age".to_string()))
    );
}

#[test]
fn test_vacuous_sets() {
    let context = DataContext::new();
    assert_eq!(evaluate(&ConditionSet::all(), &context), Ok(true));
    assert_eq!(evaluate(&ConditionSet::any(), &context), Ok(false));
}

#[test]
fn test_nested_vacuous_set_counts_as_member() {
    let context = citizen_context();
    // An empty ALL inside an ANY makes the ANY true.
    let set = ConditionSet::any()
        .with_condition(condition("age", ConditionOperator::LessThan, "10"))
        .with_nested_set(ConditionSet::all());
    assert_eq!(evaluate(&set, &context), Ok(true));
}

#[test]
fn test_all_short_circuits_on_first_false() {
    // The second condition refers to a deleted field and would fail if evaluated.
    let set = ConditionSet::all()
        .with_condition(condition("age", ConditionOperator::LessThan, "10"))
        .with_condition(condition("deleted", ConditionOperator::Equals, "x"));
    let trace = ConditionEvaluator::new()
        .explain(&set, &citizen_context())
        .unwrap();

    assert_eq!(trace.get_outcome(), Some(false));
    let ConditionTrace::Set { members, .. } = trace else {
        panic!("expected a set trace");
    };
    assert_eq!(members[1], ConditionTrace::NotEvaluated);
}

#[test]
fn test_any_short_circuits_on_first_true() {
    let set = ConditionSet::any()
        .with_condition(condition("age", ConditionOperator::GreaterThan, "10"))
        .with_nested_set(
            ConditionSet::all().with_condition(condition("deleted", ConditionOperator::Equals, "x")),
        );
    assert_eq!(evaluate(&set, &citizen_context()), Ok(true));
}

#[test]
fn test_error_without_short_circuit_propagates() {
    let set = ConditionSet::all()
        .with_condition(condition("age", ConditionOperator::GreaterThan, "10"))
        .with_condition(condition("deleted", ConditionOperator::Equals, "x"));
    assert_eq!(
        evaluate(&set, &citizen_context()),
        Err(EvaluationError::UnresolvedReference("deleted".to_string()))
    );
}

#[rstest]
#[case::all_false_first(ConditionSet::all(), "10", true, Ok(false))]
#[case::all_false_last(ConditionSet::all(), "10", false, Ok(false))]
#[case::any_true_first(ConditionSet::any(), "30", true, Ok(true))]
#[case::any_true_last(ConditionSet::any(), "30", false, Ok(true))]
fn test_deciding_member_wins_over_failure_in_any_order(
    #[case] set: ConditionSet,
    #[case] age_limit: &str,
    #[case] deciding_first: bool,
    #[case] expected: Result<bool, EvaluationError>,
) {
    // `age < limit` decides the set; the deleted field fails when evaluated.
    let deciding = condition("age", ConditionOperator::LessThan, age_limit);
    let failing = condition("deleted", ConditionOperator::Equals, "x");
    let set = if deciding_first {
        set.with_condition(deciding).with_condition(failing)
    } else {
        set.with_condition(failing).with_condition(deciding)
    };
    assert_eq!(evaluate(&set, &citizen_context()), expected);
}

#[test]
fn test_failure_in_nested_set_is_overruled_by_later_member() {
    let set = ConditionSet::all()
        .with_nested_set(
            ConditionSet::all().with_condition(condition("deleted", ConditionOperator::Equals, "x")),
        )
        .with_condition(condition("age", ConditionOperator::GreaterThan, "30"));
    assert_eq!(evaluate(&set, &citizen_context()), Ok(false));

    // Without a deciding member the failure is reported.
    let undecided = ConditionSet::any()
        .with_condition(condition("deleted", ConditionOperator::Equals, "x"))
        .with_condition(condition("age", ConditionOperator::GreaterThan, "30"));
    assert_eq!(
        evaluate(&undecided, &citizen_context()),
        Err(EvaluationError::UnresolvedReference("deleted".to_string()))
    );
}

#[rstest]
#[case(ConditionOperator::Equals, false)]
#[case(ConditionOperator::NotEquals, true)]
#[case(ConditionOperator::GreaterThanOrEquals, false)]
#[case(ConditionOperator::LessThanOrEquals, false)]
fn test_two_unanswered_fields(#[case] operator: ConditionOperator, #[case] expected: bool) {
    let context = DataContext::new()
        .with_field("income", NoCodeDataType::Number)
        .with_field("previousIncome", NoCodeDataType::Number);
    let condition = Condition::new("income")
        .with_operator(operator)
        .with_target("previousIncome");
    assert_eq!(
        ConditionEvaluator::new().evaluate_condition(&condition, &context),
        Ok(expected)
    );
}

#[rstest]
#[case(condition("name", ConditionOperator::Equals, "Alice"), true)]
#[case(condition("name", ConditionOperator::NotEquals, "Alice"), false)]
#[case(condition("name", ConditionOperator::Contains, "LIC"), true)]
#[case(condition("name", ConditionOperator::NotContains, "bob"), true)]
#[case(condition("name", ConditionOperator::StartsWith, "al"), true)]
#[case(condition("name", ConditionOperator::EndsWith, "CE"), true)]
#[case(condition("income", ConditionOperator::GreaterThan, "1500,25"), true)]
#[case(condition("income", ConditionOperator::LessThanOrEquals, "1.500,5"), true)]
#[case(condition("birthDate", ConditionOperator::LessThan, "2001-01-01"), true)]
#[case(condition("birthDate", ConditionOperator::Equals, "2000-05-15"), true)]
#[case(condition("consent", ConditionOperator::Equals, "true"), true)]
#[case(condition("pets", ConditionOperator::Contains, "dog"), true)]
#[case(condition("pets", ConditionOperator::NotContains, "fish"), true)]
fn test_condition_operators(#[case] condition: Condition, #[case] expected: bool) {
    let result = ConditionEvaluator::new().evaluate_condition(&condition, &citizen_context());
    assert_eq!(result, Ok(expected));
}

#[rstest]
#[case(ConditionOperator::IsEmpty, "nickname", true)]
#[case(ConditionOperator::IsNotEmpty, "nickname", false)]
#[case(ConditionOperator::IsEmpty, "name", false)]
#[case(ConditionOperator::IsNotEmpty, "consent", true)]
fn test_unary_operators_ignore_comparand(
    #[case] operator: ConditionOperator,
    #[case] reference: &str,
    #[case] expected: bool,
) {
    // A leftover literal from an earlier operator choice is ignored.
    let condition = Condition::new(reference)
        .with_operator(operator)
        .with_value("leftover");
    let result = ConditionEvaluator::new().evaluate_condition(&condition, &citizen_context());
    assert_eq!(result, Ok(expected));
}

#[test]
fn test_hidden_field_resolves_empty() {
    let mut context = citizen_context();
    context.set_hidden("name", true);
    let is_empty = Condition::new("name").with_operator(ConditionOperator::IsEmpty);
    assert_eq!(
        ConditionEvaluator::new().evaluate_condition(&is_empty, &context),
        Ok(true)
    );
}

#[test]
fn test_target_compares_against_other_field() {
    let context = citizen_context()
        .with_answer("minimumAge", NoCodeDataType::Number, Value::Number(18.0))
        .with_answer("repeatName", NoCodeDataType::String, text("Alice"));
    let evaluator = ConditionEvaluator::new();

    let older = Condition::new("age")
        .with_operator(ConditionOperator::GreaterThanOrEquals)
        .with_target("minimumAge");
    let same_name = Condition::new("name")
        .with_operator(ConditionOperator::Equals)
        .with_target("repeatName");
    assert_eq!(evaluator.evaluate_condition(&older, &context), Ok(true));
    assert_eq!(evaluator.evaluate_condition(&same_name, &context), Ok(true));

    let missing_target = older.with_target("removed");
    assert_eq!(
        evaluator.evaluate_condition(&missing_target, &context),
        Err(EvaluationError::UnresolvedReference("removed".to_string()))
    );
}

#[test]
fn test_unparseable_literal_is_type_mismatch() {
    let bad = condition("age", ConditionOperator::GreaterThan, "eighteen");
    let result = ConditionEvaluator::new().evaluate_condition(&bad, &citizen_context());
    assert!(matches!(
        result,
        Err(EvaluationError::TypeMismatch {
            expected: NoCodeDataType::Number,
            ..
        })
    ));
}

#[test]
fn test_incomplete_conditions_are_errors() {
    let evaluator = ConditionEvaluator::new();
    let context = citizen_context();

    let no_operator = Condition::new("age");
    assert!(matches!(
        evaluator.evaluate_condition(&no_operator, &context),
        Err(EvaluationError::MalformedTree(_))
    ));

    let no_comparand = Condition::new("age").with_operator(ConditionOperator::Equals);
    assert!(matches!(
        evaluator.evaluate_condition(&no_comparand, &context),
        Err(EvaluationError::MissingOperand { index: 1, .. })
    ));
}

#[test]
fn test_ordering_on_text_is_type_mismatch() {
    let bad = condition("name", ConditionOperator::GreaterThan, "Bob");
    assert!(matches!(
        ConditionEvaluator::new().evaluate_condition(&bad, &citizen_context()),
        Err(EvaluationError::TypeMismatch { .. })
    ));
}

#[test]
fn test_validation_messages_of_true_conditions() {
    let set = ConditionSet::any()
        .with_condition(
            condition("age", ConditionOperator::LessThan, "18").with_unmet_message("Too young"),
        )
        .with_condition(
            Condition::new("nickname")
                .with_operator(ConditionOperator::IsEmpty)
                .with_unmet_message("Nickname is required"),
        )
        .with_unmet_message("Please check your answers");
    let trace = ConditionEvaluator::new()
        .explain(&set, &citizen_context())
        .unwrap();
    assert_eq!(trace.get_outcome(), Some(true));
    assert_eq!(
        trace.messages_of_true_conditions(),
        vec!["Nickname is required".to_string()]
    );
}

#[test]
fn test_set_message_used_when_conditions_have_none() {
    let set = ConditionSet::all()
        .with_condition(condition("age", ConditionOperator::GreaterThan, "18"))
        .with_unmet_message("Adults only");
    let trace = ConditionEvaluator::new()
        .explain(&set, &citizen_context())
        .unwrap();
    assert_eq!(
        trace.messages_of_true_conditions(),
        vec!["Adults only".to_string()]
    );
}

#[test]
fn test_excessive_nesting_is_malformed() {
    let mut set = adult_condition_set();
    for _ in 0..5 {
        set = ConditionSet::all().with_nested_set(set);
    }
    let shallow = ConditionEvaluator::builder().with_max_depth(3).build();
    assert!(matches!(
        shallow.evaluate(&set, &age_context(Some(30.0))),
        Err(EvaluationError::MalformedTree(_))
    ));
    assert_eq!(
        ConditionEvaluator::new().evaluate(&set, &age_context(Some(30.0))),
        Ok(true)
    );
}

#[test]
fn test_comma_separator_option() {
    let set = ConditionSet::all().with_condition(condition(
        "income",
        ConditionOperator::GreaterThan,
        "1.000",
    ));
    let context = citizen_context();
    let dot = ConditionEvaluator::builder()
        .with_decimal_separator(DecimalSeparator::Dot)
        .build();
    let comma = ConditionEvaluator::builder()
        .with_decimal_separator(DecimalSeparator::Comma)
        .build();
    // 1500.5 > 1.0 with a dot separator, and 1500.5 > 1000 with a comma separator.
    assert_eq!(dot.evaluate(&set, &context), Ok(true));
    assert_eq!(comma.evaluate(&set, &context), Ok(true));

    let strict = ConditionSet::all().with_condition(condition(
        "income",
        ConditionOperator::LessThan,
        "1.600",
    ));
    assert_eq!(dot.evaluate(&strict, &context), Ok(false));
    assert_eq!(comma.evaluate(&strict, &context), Ok(true));
}
