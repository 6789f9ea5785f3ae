//! Tests for the operator registry, catalog loading and operator queries.
mod common;
use common::*;
use nocode_logic::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_builtins_are_local() {
    let registry = OperatorRegistry::with_builtins();
    assert!(registry.len() >= 20);
    assert!(registry.has_local_implementation("add"));
    assert_eq!(
        registry.describe("add").map(|d| d.return_type),
        Some(NoCodeDataType::Number)
    );
    assert!(registry.describe("missing").is_none());
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mut registry = OperatorRegistry::with_builtins();
    let mut descriptor = remote_only_descriptor();
    descriptor.identifier = "add".to_string();
    assert!(matches!(
        registry.register_descriptor(descriptor),
        Err(RegistryError::DuplicateOperator(id)) if id == "add"
    ));
}

#[test]
fn test_builtin_subset() {
    let registry = OperatorRegistry::with_builtin_subset(&["add", "not", "unknown"]);
    assert_eq!(registry.len(), 2);
    assert!(registry.describe("concat").is_none());
}

#[test]
fn test_catalog_json_loads_descriptors_only() {
    let json = serde_json::to_string(&vec![remote_only_descriptor()]).unwrap();
    let registry = OperatorRegistry::from_catalog_json(&json).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(!registry.has_local_implementation("postcodeLookup"));
    assert_eq!(
        registry.apply("postcodeLookup", &[text("1234AB")]),
        Err(OperatorError::NotImplementedLocally)
    );

    assert!(matches!(
        OperatorRegistry::from_catalog_json("{ not json"),
        Err(RegistryError::CatalogParse(_))
    ));
}

#[test]
fn test_merge_catalog_keeps_local_implementations() {
    let mut registry = OperatorRegistry::with_builtins();
    let before = registry.len();
    let mut shadow = remote_only_descriptor();
    shadow.identifier = "add".to_string();

    let added = registry.merge_catalog(vec![remote_only_descriptor(), shadow]);
    assert_eq!(added, 1);
    assert_eq!(registry.len(), before + 1);
    assert!(registry.has_local_implementation("add"));
}

#[test]
fn test_list_filters_by_return_type() {
    let registry = OperatorRegistry::with_builtins();
    let numeric = registry.list_operators(&OperatorQuery::returning(NoCodeDataType::Number));
    assert!(!numeric.is_empty());
    // `ifThenElse` returns Any, which fits a number slot.
    assert!(numeric.iter().any(|d| d.identifier == "ifThenElse"));
    assert!(numeric.iter().all(|d| d.return_type.is_compatible(NoCodeDataType::Number)));
    assert!(!numeric.iter().any(|d| d.identifier == "concat"));
}

#[test]
fn test_list_is_sorted_by_label() {
    let registry = OperatorRegistry::with_builtins();
    let labels: Vec<&str> = registry
        .list_operators(&OperatorQuery::default())
        .iter()
        .map(|d| d.label.as_str())
        .collect();
    let mut sorted = labels.clone();
    sorted.sort();
    assert_eq!(labels, sorted);
}

#[test]
fn test_list_filters_by_input_type_and_search() {
    let registry = OperatorRegistry::with_builtins();
    let query = OperatorQuery::returning(NoCodeDataType::Boolean)
        .accepting(NoCodeDataType::Date)
        .search("BEFORE");
    let identifiers: Vec<&str> = registry
        .list_operators(&query)
        .iter()
        .map(|d| d.identifier.as_str())
        .collect();
    assert_eq!(identifiers, vec!["dateBefore"]);
}

#[test]
fn test_query_string_round_trip() {
    let query = OperatorQuery::returning(NoCodeDataType::Number)
        .accepting(NoCodeDataType::String)
        .search("text length");
    let encoded = query.to_query_string();
    assert_eq!(encoded, "outputType=Number&inputType=String&search=text+length");
    assert_eq!(OperatorQuery::from_query_string(&encoded), query);
    assert_eq!(
        OperatorQuery::from_query_string("?outputType=number&foo=bar"),
        OperatorQuery::returning(NoCodeDataType::Number)
    );
    assert_eq!(OperatorQuery::default().to_query_string(), "");
}
