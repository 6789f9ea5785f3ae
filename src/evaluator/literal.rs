use super::DecimalSeparator;
use crate::ast::{DATE_FORMAT, NoCodeDataType, Value};
use chrono::NaiveDate;

/// Reads a static literal as a value of `data_type`.
///
/// `String` and `Any` slots keep the literal verbatim, so numeric-looking text is never
/// turned into a number unless the slot asks for one.
pub(crate) fn parse_literal(
    literal: &str,
    data_type: NoCodeDataType,
    separator: DecimalSeparator,
) -> Option<Value> {
    match data_type {
        NoCodeDataType::Any | NoCodeDataType::String => Some(Value::String(literal.to_string())),
        NoCodeDataType::Number => parse_number(literal, separator).map(Value::Number),
        NoCodeDataType::Boolean => match literal {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        NoCodeDataType::Date => NaiveDate::parse_from_str(literal.trim(), DATE_FORMAT)
            .ok()
            .map(Value::Date),
        NoCodeDataType::List => match serde_json::from_str(literal) {
            Ok(json @ serde_json::Value::Array(_)) => Some(Value::from_json(&json, data_type)),
            _ => None,
        },
        NoCodeDataType::Object => match serde_json::from_str(literal) {
            Ok(json @ serde_json::Value::Object(_)) => Some(Value::from_json(&json, data_type)),
            _ => None,
        },
    }
}

/// Parses a decimal number written with either `.` or `,` as decimal separator.
///
/// With [`DecimalSeparator::Auto`] the last of `.`/`,` is the decimal separator when
/// both occur; a lone separator character occurring once is decimal, occurring more
/// than once it is grouping. Whitespace and `_` are ignored as digit grouping.
pub(crate) fn parse_number(literal: &str, separator: DecimalSeparator) -> Option<f64> {
    let compact: String = literal
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();
    if compact.is_empty()
        || !compact
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | ',' | 'e' | 'E'))
    {
        return None;
    }

    let normalized = match separator {
        DecimalSeparator::Dot => compact.replace(',', ""),
        DecimalSeparator::Comma => compact.replace('.', "").replace(',', "."),
        DecimalSeparator::Auto => match (compact.rfind('.'), compact.rfind(',')) {
            (Some(dot), Some(comma)) if comma > dot => compact.replace('.', "").replace(',', "."),
            (Some(_), Some(_)) => compact.replace(',', ""),
            (None, Some(_)) if compact.matches(',').count() == 1 => compact.replace(',', "."),
            (None, Some(_)) => compact.replace(',', ""),
            (Some(_), None) if compact.matches('.').count() > 1 => compact.replace('.', ""),
            _ => compact,
        },
    };
    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_separators() {
        let auto = DecimalSeparator::Auto;
        assert_eq!(parse_number("18", auto), Some(18.0));
        assert_eq!(parse_number("1.5", auto), Some(1.5));
        assert_eq!(parse_number("1,5", auto), Some(1.5));
        assert_eq!(parse_number("1.234,5", auto), Some(1234.5));
        assert_eq!(parse_number("1,234.5", auto), Some(1234.5));
        assert_eq!(parse_number("1 234,5", auto), Some(1234.5));
        assert_eq!(parse_number("1.234.567", auto), Some(1234567.0));
        assert_eq!(parse_number("-0,25", auto), Some(-0.25));
    }

    #[test]
    fn test_number_rejects_text() {
        let auto = DecimalSeparator::Auto;
        assert_eq!(parse_number("", auto), None);
        assert_eq!(parse_number("abc", auto), None);
        assert_eq!(parse_number("inf", auto), None);
        assert_eq!(parse_number("NaN", auto), None);
        assert_eq!(parse_number("12a", auto), None);
    }

    #[test]
    fn test_fixed_separators() {
        assert_eq!(parse_number("1,234", DecimalSeparator::Dot), Some(1234.0));
        assert_eq!(parse_number("1,234", DecimalSeparator::Comma), Some(1.234));
        assert_eq!(parse_number("1.234", DecimalSeparator::Comma), Some(1234.0));
    }

    #[test]
    fn test_boolean_literals_are_canonical() {
        let auto = DecimalSeparator::Auto;
        assert_eq!(
            parse_literal("true", NoCodeDataType::Boolean, auto),
            Some(Value::Bool(true))
        );
        assert_eq!(parse_literal("True", NoCodeDataType::Boolean, auto), None);
        assert_eq!(parse_literal("1", NoCodeDataType::Boolean, auto), None);
    }

    #[test]
    fn test_no_implicit_coercion() {
        let auto = DecimalSeparator::Auto;
        assert_eq!(
            parse_literal("42", NoCodeDataType::String, auto),
            Some(Value::String("42".to_string()))
        );
        assert_eq!(
            parse_literal("42", NoCodeDataType::Any, auto),
            Some(Value::String("42".to_string()))
        );
    }

    #[test]
    fn test_structured_literals() {
        let auto = DecimalSeparator::Auto;
        assert_eq!(
            parse_literal("[1, 2]", NoCodeDataType::List, auto),
            Some(Value::List(vec![Value::Number(1.0), Value::Number(2.0)]))
        );
        assert_eq!(parse_literal("{}", NoCodeDataType::List, auto), None);
        assert!(parse_literal("{\"a\": true}", NoCodeDataType::Object, auto).is_some());
        assert_eq!(
            parse_literal("2024-02-29", NoCodeDataType::Date, auto),
            NaiveDate::from_ymd_opt(2024, 2, 29).map(Value::Date)
        );
        assert_eq!(parse_literal("29-02-2024", NoCodeDataType::Date, auto), None);
    }
}
