use super::{NoCodeOperator, NoCodeOperatorDetails, NoCodeOperatorParameter, OperatorRegistry};
use crate::ast::{NoCodeDataType, Value};
use crate::error::OperatorError;
use chrono::NaiveDate;

type OperatorFn = fn(&[Value]) -> Result<Value, OperatorError>;

/// A locally executable operator backed by a plain function.
struct BuiltinOperator {
    details: NoCodeOperatorDetails,
    function: OperatorFn,
}

impl NoCodeOperator for BuiltinOperator {
    fn details(&self) -> &NoCodeOperatorDetails {
        &self.details
    }

    fn apply(&self, arguments: &[Value]) -> Result<Value, OperatorError> {
        (self.function)(arguments)
    }
}

fn builtin(
    identifier: &str,
    label: &str,
    description: &str,
    parameters: Vec<NoCodeOperatorParameter>,
    return_type: NoCodeDataType,
    function: OperatorFn,
) -> BuiltinOperator {
    BuiltinOperator {
        details: NoCodeOperatorDetails {
            identifier: identifier.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            parameters,
            return_type,
        },
        function,
    }
}

fn any() -> NoCodeOperatorParameter {
    NoCodeOperatorParameter::new(NoCodeDataType::Any)
}
fn boolean() -> NoCodeOperatorParameter {
    NoCodeOperatorParameter::new(NoCodeDataType::Boolean)
}
fn number() -> NoCodeOperatorParameter {
    NoCodeOperatorParameter::new(NoCodeDataType::Number)
}
fn text() -> NoCodeOperatorParameter {
    NoCodeOperatorParameter::new(NoCodeDataType::String)
}
fn date() -> NoCodeOperatorParameter {
    NoCodeOperatorParameter::new(NoCodeDataType::Date)
}
fn list() -> NoCodeOperatorParameter {
    NoCodeOperatorParameter::new(NoCodeDataType::List)
}

/// Defines the built-in operators, their registration, and their lookup by identifier.
macro_rules! define_builtin_operators {
    ( $( ($identifier:literal, $label:expr, $description:expr, [$($param:expr),* $(,)?] -> $ret:ident, $function:path) ),* $(,)? ) => {
        /// Registers every built-in operator into `registry`, skipping identifiers that
        /// are already taken.
        pub fn register_builtin_operators(registry: &mut OperatorRegistry) {
            $(
                let operator = builtin($identifier, $label, $description, vec![$($param),*], NoCodeDataType::$ret, $function);
                if let Err(e) = registry.register(operator) {
                    log::warn!("Skipping built-in operator: {}", e);
                }
            )*
        }

        /// Creates a single built-in operator by identifier.
        pub fn builtin_operator(identifier: &str) -> Option<Box<dyn NoCodeOperator>> {
            match identifier {
                $( $identifier => Some(Box::new(builtin($identifier, $label, $description, vec![$($param),*], NoCodeDataType::$ret, $function))), )*
                _ => None,
            }
        }
    };
}

define_builtin_operators! {
    // Logic
    ("and", "And", "True when both inputs are true", [boolean(), boolean()] -> Boolean, logic_and),
    ("or", "Or", "True when at least one input is true", [boolean(), boolean()] -> Boolean, logic_or),
    ("not", "Not", "Inverts a boolean", [boolean()] -> Boolean, logic_not),
    ("ifThenElse", "If then else", "Picks the second input when the first is true, otherwise the third", [boolean(), any(), any()] -> Any, if_then_else),

    // Comparison
    ("equals", "Equals", "True when both inputs are equal", [any(), any()] -> Boolean, equals),
    ("notEquals", "Not equals", "True when the inputs differ", [any(), any()] -> Boolean, not_equals),
    ("greaterThan", "Greater than", "True when the first number is greater", [number(), number()] -> Boolean, greater_than),
    ("greaterThanOrEquals", "Greater than or equals", "True when the first number is greater or equal", [number(), number()] -> Boolean, greater_than_or_equals),
    ("lessThan", "Less than", "True when the first number is smaller", [number(), number()] -> Boolean, less_than),
    ("lessThanOrEquals", "Less than or equals", "True when the first number is smaller or equal", [number(), number()] -> Boolean, less_than_or_equals),
    ("isEmpty", "Is empty", "True when the input has no value", [any()] -> Boolean, is_empty),

    // Arithmetic
    ("add", "Add", "Sum of two numbers", [number(), number()] -> Number, add),
    ("subtract", "Subtract", "Difference of two numbers", [number(), number()] -> Number, subtract),
    ("multiply", "Multiply", "Product of two numbers", [number(), number()] -> Number, multiply),
    ("divide", "Divide", "Quotient of two numbers", [number(), number()] -> Number, divide),
    ("round", "Round", "Rounds a number to a whole number",
        [number(), NoCodeOperatorParameter::with_options(NoCodeDataType::String, &["nearest", "up", "down"])] -> Number, round),

    // Text
    ("concat", "Concatenate", "Joins two texts", [text(), text()] -> String, concat),
    ("textContains", "Text contains", "True when the first text contains the second, ignoring case", [text(), text()] -> Boolean, text_contains),
    ("textLength", "Text length", "Number of characters in a text", [text()] -> Number, text_length),

    // Dates
    ("yearsBetween", "Years between", "Whole years from the first date to the second", [date(), date()] -> Number, years_between),
    ("dateBefore", "Date before", "True when the first date lies before the second", [date(), date()] -> Boolean, date_before),
    ("dateAfter", "Date after", "True when the first date lies after the second", [date(), date()] -> Boolean, date_after),

    // Lists
    ("count", "Count", "Number of items in a list", [list()] -> Number, count),
    ("listContains", "List contains", "True when the list holds the value", [list(), any()] -> Boolean, list_contains),
}

fn invalid(expected: NoCodeDataType, found: &Value) -> OperatorError {
    OperatorError::InvalidArgument {
        expected,
        found: found.clone(),
    }
}

fn bool_arg(args: &[Value], i: usize) -> Result<bool, OperatorError> {
    match args.get(i) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Null) | None => Ok(false),
        Some(other) => Err(invalid(NoCodeDataType::Boolean, other)),
    }
}

fn number_arg(args: &[Value], i: usize) -> Result<Option<f64>, OperatorError> {
    match args.get(i) {
        Some(Value::Number(n)) => Ok(Some(*n)),
        Some(Value::Null) | None => Ok(None),
        Some(other) => Err(invalid(NoCodeDataType::Number, other)),
    }
}

fn text_arg(args: &[Value], i: usize) -> Result<&str, OperatorError> {
    match args.get(i) {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Null) | None => Ok(""),
        Some(other) => Err(invalid(NoCodeDataType::String, other)),
    }
}

fn date_arg(args: &[Value], i: usize) -> Result<Option<NaiveDate>, OperatorError> {
    match args.get(i) {
        Some(Value::Date(d)) => Ok(Some(*d)),
        Some(Value::Null) | None => Ok(None),
        Some(other) => Err(invalid(NoCodeDataType::Date, other)),
    }
}

fn list_arg(args: &[Value], i: usize) -> Result<&[Value], OperatorError> {
    match args.get(i) {
        Some(Value::List(items)) => Ok(items),
        Some(Value::Null) | None => Ok(&[]),
        Some(other) => Err(invalid(NoCodeDataType::List, other)),
    }
}

fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or_default()
}

fn logic_and(args: &[Value]) -> Result<Value, OperatorError> {
    Ok(Value::Bool(bool_arg(args, 0)? && bool_arg(args, 1)?))
}

fn logic_or(args: &[Value]) -> Result<Value, OperatorError> {
    Ok(Value::Bool(bool_arg(args, 0)? || bool_arg(args, 1)?))
}

fn logic_not(args: &[Value]) -> Result<Value, OperatorError> {
    Ok(Value::Bool(!bool_arg(args, 0)?))
}

fn if_then_else(args: &[Value]) -> Result<Value, OperatorError> {
    if bool_arg(args, 0)? {
        Ok(arg(args, 1))
    } else {
        Ok(arg(args, 2))
    }
}

fn equals(args: &[Value]) -> Result<Value, OperatorError> {
    Ok(Value::Bool(arg(args, 0) == arg(args, 1)))
}

fn not_equals(args: &[Value]) -> Result<Value, OperatorError> {
    Ok(Value::Bool(arg(args, 0) != arg(args, 1)))
}

fn compare_numbers(args: &[Value], f: fn(f64, f64) -> bool) -> Result<Value, OperatorError> {
    match (number_arg(args, 0)?, number_arg(args, 1)?) {
        (Some(l), Some(r)) => Ok(Value::Bool(f(l, r))),
        _ => Ok(Value::Bool(false)),
    }
}

fn greater_than(args: &[Value]) -> Result<Value, OperatorError> {
    compare_numbers(args, |a, b| a > b)
}

fn greater_than_or_equals(args: &[Value]) -> Result<Value, OperatorError> {
    compare_numbers(args, |a, b| a >= b)
}

fn less_than(args: &[Value]) -> Result<Value, OperatorError> {
    compare_numbers(args, |a, b| a < b)
}

fn less_than_or_equals(args: &[Value]) -> Result<Value, OperatorError> {
    compare_numbers(args, |a, b| a <= b)
}

fn is_empty(args: &[Value]) -> Result<Value, OperatorError> {
    Ok(Value::Bool(arg(args, 0).is_empty()))
}

// Arithmetic over an empty answer yields an empty result.
fn arithmetic(args: &[Value], f: fn(f64, f64) -> f64) -> Result<Value, OperatorError> {
    match (number_arg(args, 0)?, number_arg(args, 1)?) {
        (Some(l), Some(r)) => match f(l, r) {
            n if n.is_finite() => Ok(Value::Number(n)),
            _ => Err(OperatorError::Overflow),
        },
        _ => Ok(Value::Null),
    }
}

fn add(args: &[Value]) -> Result<Value, OperatorError> {
    arithmetic(args, |a, b| a + b)
}

fn subtract(args: &[Value]) -> Result<Value, OperatorError> {
    arithmetic(args, |a, b| a - b)
}

fn multiply(args: &[Value]) -> Result<Value, OperatorError> {
    arithmetic(args, |a, b| a * b)
}

fn divide(args: &[Value]) -> Result<Value, OperatorError> {
    if number_arg(args, 1)? == Some(0.0) {
        return Err(OperatorError::DivisionByZero);
    }
    arithmetic(args, |a, b| a / b)
}

fn round(args: &[Value]) -> Result<Value, OperatorError> {
    let Some(n) = number_arg(args, 0)? else {
        return Ok(Value::Null);
    };
    let rounded = match text_arg(args, 1)? {
        "nearest" | "" => n.round(),
        "up" => n.ceil(),
        "down" => n.floor(),
        other => return Err(OperatorError::Failed(format!("unknown rounding mode '{}'", other))),
    };
    Ok(Value::Number(rounded))
}

fn concat(args: &[Value]) -> Result<Value, OperatorError> {
    Ok(Value::String(format!("{}{}", text_arg(args, 0)?, text_arg(args, 1)?)))
}

fn text_contains(args: &[Value]) -> Result<Value, OperatorError> {
    let haystack = text_arg(args, 0)?.to_lowercase();
    let needle = text_arg(args, 1)?.to_lowercase();
    Ok(Value::Bool(haystack.contains(&needle)))
}

fn text_length(args: &[Value]) -> Result<Value, OperatorError> {
    Ok(Value::Number(text_arg(args, 0)?.chars().count() as f64))
}

fn years_between(args: &[Value]) -> Result<Value, OperatorError> {
    match (date_arg(args, 0)?, date_arg(args, 1)?) {
        (Some(from), Some(to)) => {
            let years = match to.years_since(from) {
                Some(years) => years as f64,
                None => -(from.years_since(to).unwrap_or(0) as f64),
            };
            Ok(Value::Number(years))
        }
        _ => Ok(Value::Null),
    }
}

fn date_before(args: &[Value]) -> Result<Value, OperatorError> {
    match (date_arg(args, 0)?, date_arg(args, 1)?) {
        (Some(a), Some(b)) => Ok(Value::Bool(a < b)),
        _ => Ok(Value::Bool(false)),
    }
}

fn date_after(args: &[Value]) -> Result<Value, OperatorError> {
    match (date_arg(args, 0)?, date_arg(args, 1)?) {
        (Some(a), Some(b)) => Ok(Value::Bool(a > b)),
        _ => Ok(Value::Bool(false)),
    }
}

fn count(args: &[Value]) -> Result<Value, OperatorError> {
    Ok(Value::Number(list_arg(args, 0)?.len() as f64))
}

fn list_contains(args: &[Value]) -> Result<Value, OperatorError> {
    let needle = arg(args, 1);
    Ok(Value::Bool(list_arg(args, 0)?.contains(&needle)))
}
