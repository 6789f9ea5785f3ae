//! Common test utilities for building logic trees and data contexts.
use nocode_logic::prelude::*;

/// The `age >= 18` visibility rule.
#[allow(dead_code)]
pub fn adult_condition_set() -> ConditionSet {
    ConditionSet::all().with_condition(
        Condition::new("age")
            .with_operator(ConditionOperator::GreaterThanOrEquals)
            .with_value("18"),
    )
}

/// A context where `age` is declared as a number, answered with `age` when given.
#[allow(dead_code)]
pub fn age_context(age: Option<f64>) -> DataContext {
    let context = DataContext::new().with_field("age", NoCodeDataType::Number);
    match age {
        Some(age) => context.with_answer("age", NoCodeDataType::Number, Value::Number(age)),
        None => context,
    }
}

/// A context with a handful of typed answers used across tests.
///
/// * `name`: "Alice"
/// * `age`: 21
/// * `income`: 1500.5
/// * `consent`: true
/// * `birthDate`: 2000-05-15
/// * `pets`: ["cat", "dog"]
/// * `nickname`: declared, unanswered
#[allow(dead_code)]
pub fn citizen_context() -> DataContext {
    DataContext::new()
        .with_answer("name", NoCodeDataType::String, text("Alice"))
        .with_answer("age", NoCodeDataType::Number, Value::Number(21.0))
        .with_answer("income", NoCodeDataType::Number, Value::Number(1500.5))
        .with_answer("consent", NoCodeDataType::Boolean, Value::Bool(true))
        .with_answer("birthDate", NoCodeDataType::Date, date(2000, 5, 15))
        .with_answer(
            "pets",
            NoCodeDataType::List,
            Value::List(vec![text("cat"), text("dog")]),
        )
        .with_field("nickname", NoCodeDataType::String)
}

#[allow(dead_code)]
pub fn text(s: &str) -> Value {
    Value::String(s.to_string())
}

#[allow(dead_code)]
pub fn date(year: i32, month: u32, day: u32) -> Value {
    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .map(Value::Date)
        .unwrap()
}

#[allow(dead_code)]
pub fn literal(value: &str) -> Option<NoCodeOperand> {
    Some(NoCodeOperand::literal(value))
}

#[allow(dead_code)]
pub fn reference(element_id: &str) -> Option<NoCodeOperand> {
    Some(NoCodeOperand::reference(element_id))
}

#[allow(dead_code)]
pub fn nested(expression: NoCodeExpression) -> Option<NoCodeOperand> {
    Some(NoCodeOperand::expression(expression))
}

/// Shorthand for an expression with every operand filled.
#[allow(dead_code)]
pub fn call(operator: &str, operands: Vec<Option<NoCodeOperand>>) -> NoCodeExpression {
    NoCodeExpression::with_operands(operator, operands)
}

/// `add(add(...add(1, 1)..., 1), 1)` nested `depth` levels deep.
#[allow(dead_code)]
pub fn nested_additions(depth: usize) -> NoCodeExpression {
    let mut expression = call("add", vec![literal("1"), literal("1")]);
    for _ in 1..depth {
        expression = call("add", vec![nested(expression), literal("1")]);
    }
    expression
}

/// A descriptor known only to the remote catalog.
#[allow(dead_code)]
pub fn remote_only_descriptor() -> NoCodeOperatorDetails {
    NoCodeOperatorDetails {
        identifier: "postcodeLookup".to_string(),
        label: "Postcode lookup".to_string(),
        description: "Looks up the city of a postcode".to_string(),
        parameters: vec![NoCodeOperatorParameter::new(NoCodeDataType::String)],
        return_type: NoCodeDataType::String,
    }
}

/// A fresh scratch directory for tests that write files.
#[allow(dead_code)]
pub fn setup_test_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir()
        .join("nocode-logic-tests")
        .join(format!("{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
