//! Editor-time checks for partially built logic trees.
//!
//! These never fail: they list what is missing or inconsistent so the editor can
//! prompt for it, while evaluation of an incomplete tree reports a hard error instead.

use crate::ast::{
    Comparand, ConditionOperator, ConditionSet, NoCodeDataType, NoCodeExpression,
    NoCodeOperand,
};
use crate::data::ReferenceResolver;
use crate::evaluator::EvaluatorOptions;
use crate::evaluator::literal::parse_literal;
use crate::registry::OperatorCatalog;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TreeIssueKind {
    OperatorNotChosen,
    UnknownOperator {
        identifier: String,
    },
    OperandMissing {
        expected: NoCodeDataType,
    },
    TooManyOperands {
        expected: usize,
        found: usize,
    },
    InvalidLiteral {
        expected: NoCodeDataType,
        literal: String,
    },
    UnknownReference {
        element_id: String,
    },
    IncompatibleOperand {
        expected: NoCodeDataType,
        found: NoCodeDataType,
    },
    ReturnTypeMismatch {
        operator: String,
        return_type: NoCodeDataType,
        expected: NoCodeDataType,
    },
    ReferenceNotChosen,
    ComparandMissing,
    NestedTooDeep {
        max_depth: usize,
    },
}

/// One problem found in a logic tree, located by a path such as
/// `operands[1].operands[0]` or `conditionsSets[0].conditions[2]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeIssue {
    pub path: String,
    #[serde(flatten)]
    pub kind: TreeIssueKind,
}

impl TreeIssue {
    fn new(path: &str, kind: TreeIssueKind) -> Self {
        Self {
            path: path.to_string(),
            kind,
        }
    }

    /// Whether the issue is a not-yet-filled part of the tree rather than a broken one.
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self.kind,
            TreeIssueKind::OperatorNotChosen
                | TreeIssueKind::OperandMissing { .. }
                | TreeIssueKind::ReferenceNotChosen
                | TreeIssueKind::ComparandMissing
        )
    }
}

fn child_path(parent: &str, segment: &str, index: usize) -> String {
    if parent.is_empty() {
        format!("{}[{}]", segment, index)
    } else {
        format!("{}.{}[{}]", parent, segment, index)
    }
}

/// Lists the issues of an expression placed in a slot expecting `desired_type`.
///
/// References are checked against `schema` when one is given. Literals are read with
/// the default [`EvaluatorOptions`].
pub fn validate_expression(
    expr: &NoCodeExpression,
    registry: &dyn OperatorCatalog,
    schema: Option<&dyn ReferenceResolver>,
    desired_type: NoCodeDataType,
) -> Vec<TreeIssue> {
    validate_expression_with_options(
        expr,
        registry,
        schema,
        desired_type,
        &EvaluatorOptions::default(),
    )
}

/// Like [`validate_expression`], reading literals and limiting nesting the way an
/// evaluator configured with `options` does.
pub fn validate_expression_with_options(
    expr: &NoCodeExpression,
    registry: &dyn OperatorCatalog,
    schema: Option<&dyn ReferenceResolver>,
    desired_type: NoCodeDataType,
    options: &EvaluatorOptions,
) -> Vec<TreeIssue> {
    let mut issues = Vec::new();
    let walker = ExpressionWalker {
        registry,
        schema,
        options,
    };
    walker.walk(expr, desired_type, "", 1, &mut issues);
    issues
}

struct ExpressionWalker<'a> {
    registry: &'a dyn OperatorCatalog,
    schema: Option<&'a dyn ReferenceResolver>,
    options: &'a EvaluatorOptions,
}

impl ExpressionWalker<'_> {
    fn walk(
        &self,
        expr: &NoCodeExpression,
        desired_type: NoCodeDataType,
        path: &str,
        depth: usize,
        issues: &mut Vec<TreeIssue>,
    ) {
        let (registry, schema) = (self.registry, self.schema);
        if depth > self.options.max_depth {
            issues.push(TreeIssue::new(
                path,
                TreeIssueKind::NestedTooDeep {
                    max_depth: self.options.max_depth,
                },
            ));
            return;
        }
        if !expr.has_operator() {
            issues.push(TreeIssue::new(path, TreeIssueKind::OperatorNotChosen));
            return;
        }
        let Some(details) = registry.describe(&expr.operator_identifier) else {
            issues.push(TreeIssue::new(
                path,
                TreeIssueKind::UnknownOperator {
                    identifier: expr.operator_identifier.clone(),
                },
            ));
            return;
        };

        if !details.return_type.is_compatible(desired_type) {
            issues.push(TreeIssue::new(
                path,
                TreeIssueKind::ReturnTypeMismatch {
                    operator: details.identifier.clone(),
                    return_type: details.return_type,
                    expected: desired_type,
                },
            ));
        }
        if expr.operands.len() > details.parameters.len() {
            issues.push(TreeIssue::new(
                path,
                TreeIssueKind::TooManyOperands {
                    expected: details.parameters.len(),
                    found: expr.operands.len(),
                },
            ));
        }

        for (index, parameter) in details.parameters.iter().enumerate() {
            let operand_path = child_path(path, "operands", index);
            let expected = parameter.data_type;
            match expr.operands.get(index) {
                None | Some(None) => issues.push(TreeIssue::new(
                    &operand_path,
                    TreeIssueKind::OperandMissing { expected },
                )),
                Some(Some(NoCodeOperand::StaticValue { value })) => {
                    let allowed = parameter
                        .options
                        .as_ref()
                        .is_none_or(|options| options.contains(value));
                    let separator = self.options.decimal_separator;
                    if !allowed || parse_literal(value, expected, separator).is_none() {
                        issues.push(TreeIssue::new(
                            &operand_path,
                            TreeIssueKind::InvalidLiteral {
                                expected,
                                literal: value.clone(),
                            },
                        ));
                    }
                }
                Some(Some(NoCodeOperand::Reference { element_id })) => {
                    if let Some(schema) = schema {
                        check_reference(schema, element_id, Some(expected), &operand_path, issues);
                    }
                }
                Some(Some(NoCodeOperand::NoCodeExpression(nested))) => {
                    self.walk(nested, expected, &operand_path, depth + 1, issues);
                }
            }
        }
    }
}

fn check_reference(
    schema: &dyn ReferenceResolver,
    element_id: &str,
    expected: Option<NoCodeDataType>,
    path: &str,
    issues: &mut Vec<TreeIssue>,
) {
    match schema.declared_type(element_id) {
        None => issues.push(TreeIssue::new(
            path,
            TreeIssueKind::UnknownReference {
                element_id: element_id.to_string(),
            },
        )),
        Some(found) => {
            if let Some(expected) = expected {
                if !found.is_compatible(expected) {
                    issues.push(TreeIssue::new(
                        path,
                        TreeIssueKind::IncompatibleOperand { expected, found },
                    ));
                }
            }
        }
    }
}

/// Lists the issues of a condition set. References and literals are checked against
/// `schema` when one is given.
pub fn validate_condition_set(
    set: &ConditionSet,
    schema: Option<&dyn ReferenceResolver>,
) -> Vec<TreeIssue> {
    validate_condition_set_with_options(set, schema, &EvaluatorOptions::default())
}

/// Like [`validate_condition_set`], reading literals and limiting nesting the way an
/// evaluator configured with `options` does.
pub fn validate_condition_set_with_options(
    set: &ConditionSet,
    schema: Option<&dyn ReferenceResolver>,
    options: &EvaluatorOptions,
) -> Vec<TreeIssue> {
    let mut issues = Vec::new();
    walk_condition_set(set, schema, options, "", 1, &mut issues);
    issues
}

fn walk_condition_set(
    set: &ConditionSet,
    schema: Option<&dyn ReferenceResolver>,
    options: &EvaluatorOptions,
    path: &str,
    depth: usize,
    issues: &mut Vec<TreeIssue>,
) {
    if depth > options.max_depth {
        issues.push(TreeIssue::new(
            path,
            TreeIssueKind::NestedTooDeep {
                max_depth: options.max_depth,
            },
        ));
        return;
    }
    for (index, condition) in set.conditions.iter().enumerate() {
        let condition_path = child_path(path, "conditions", index);
        let subject_type = if condition.reference.is_empty() {
            issues.push(TreeIssue::new(
                &condition_path,
                TreeIssueKind::ReferenceNotChosen,
            ));
            None
        } else {
            schema.and_then(|schema| {
                let declared = schema.declared_type(&condition.reference);
                if declared.is_none() {
                    check_reference(schema, &condition.reference, None, &condition_path, issues);
                }
                declared
            })
        };

        let Some(operator) = condition.operator else {
            issues.push(TreeIssue::new(
                &condition_path,
                TreeIssueKind::OperatorNotChosen,
            ));
            continue;
        };
        if operator.is_unary() {
            continue;
        }

        match &condition.comparand {
            None | Some(Comparand::EmptyValue | Comparand::EmptyTarget) => issues.push(
                TreeIssue::new(&condition_path, TreeIssueKind::ComparandMissing),
            ),
            Some(Comparand::Target(target)) => {
                if let Some(schema) = schema {
                    check_reference(schema, target, subject_type, &condition_path, issues);
                }
            }
            Some(Comparand::Value(literal)) => {
                let text_operator = matches!(
                    operator,
                    ConditionOperator::Contains
                        | ConditionOperator::NotContains
                        | ConditionOperator::StartsWith
                        | ConditionOperator::EndsWith
                );
                if let Some(expected) = subject_type.filter(|_| !text_operator) {
                    if parse_literal(literal, expected, options.decimal_separator).is_none() {
                        issues.push(TreeIssue::new(
                            &condition_path,
                            TreeIssueKind::InvalidLiteral {
                                expected,
                                literal: literal.clone(),
                            },
                        ));
                    }
                }
            }
        }
    }

    for (index, nested) in set.conditions_sets.iter().enumerate() {
        let nested_path = child_path(path, "conditionsSets", index);
        walk_condition_set(nested, schema, options, &nested_path, depth + 1, issues);
    }
}
