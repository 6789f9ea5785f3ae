use crate::error::EditError;
use crate::registry::NoCodeOperatorDetails;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One input slot of an expression.
///
/// Slots that are deliberately left unfilled are represented as `None` in
/// [`NoCodeExpression::operands`], which serializes as JSON `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NoCodeOperand {
    /// A literal, typed by the parameter slot it is placed in.
    StaticValue { value: String },
    /// The current value of another form field.
    Reference {
        #[serde(rename = "elementId")]
        element_id: String,
    },
    /// A nested sub-expression.
    NoCodeExpression(NoCodeExpression),
}

impl NoCodeOperand {
    pub fn literal(value: impl Into<String>) -> Self {
        NoCodeOperand::StaticValue {
            value: value.into(),
        }
    }

    pub fn reference(element_id: impl Into<String>) -> Self {
        NoCodeOperand::Reference {
            element_id: element_id.into(),
        }
    }

    pub fn expression(expression: NoCodeExpression) -> Self {
        NoCodeOperand::NoCodeExpression(expression)
    }
}

/// A typed operator tree.
///
/// `operands` is index-aligned with the chosen operator's parameters. While a rule is
/// being edited it may be shorter than the parameter list; missing trailing slots are
/// treated like `null` slots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoCodeExpression {
    #[serde(default)]
    pub operator_identifier: String,
    #[serde(default)]
    pub operands: Vec<Option<NoCodeOperand>>,
}

impl NoCodeExpression {
    pub fn new(operator_identifier: impl Into<String>) -> Self {
        Self {
            operator_identifier: operator_identifier.into(),
            operands: Vec::new(),
        }
    }

    pub fn with_operands(
        operator_identifier: impl Into<String>,
        operands: Vec<Option<NoCodeOperand>>,
    ) -> Self {
        Self {
            operator_identifier: operator_identifier.into(),
            operands,
        }
    }

    pub fn has_operator(&self) -> bool {
        !self.operator_identifier.is_empty()
    }

    /// Swaps the operator. Operands that still fit the new parameter list are kept;
    /// the rest are dropped.
    #[must_use]
    pub fn with_operator(&self, operator: &NoCodeOperatorDetails) -> Self {
        let keep = self.operands.len().min(operator.parameters.len());
        Self {
            operator_identifier: operator.identifier.clone(),
            operands: self.operands[..keep].to_vec(),
        }
    }

    /// Fills the slot at `index`, padding any gap before it with `null` slots.
    pub fn with_operand(
        &self,
        index: usize,
        operand: Option<NoCodeOperand>,
    ) -> Result<Self, EditError> {
        let len = index.checked_add(1).ok_or(EditError::IndexOutOfRange {
            index,
            len: self.operands.len(),
        })?;
        let mut operands = self.operands.clone();
        if len > operands.len() {
            operands.resize(len, None);
        }
        operands[index] = operand;
        Ok(Self {
            operator_identifier: self.operator_identifier.clone(),
            operands,
        })
    }

    /// Clears the slot at `index` back to `null`.
    pub fn without_operand(&self, index: usize) -> Result<Self, EditError> {
        if index >= self.operands.len() {
            return Err(EditError::IndexOutOfRange {
                index,
                len: self.operands.len(),
            });
        }
        self.with_operand(index, None)
    }

    /// Sets a slot inside a nested sub-expression. Every element of `path` but the last
    /// selects a nested expression operand; the last is the slot index to fill.
    pub fn with_operand_at(
        &self,
        path: &[usize],
        operand: Option<NoCodeOperand>,
    ) -> Result<Self, EditError> {
        match path {
            [] => Err(EditError::NotAnExpression(Vec::new())),
            [index] => self.with_operand(*index, operand),
            [head, rest @ ..] => {
                let nested = match self.operands.get(*head) {
                    Some(Some(NoCodeOperand::NoCodeExpression(nested))) => nested,
                    Some(_) => return Err(EditError::NotAnExpression(vec![*head])),
                    None => {
                        return Err(EditError::IndexOutOfRange {
                            index: *head,
                            len: self.operands.len(),
                        });
                    }
                };
                let updated = nested.with_operand_at(rest, operand).map_err(|e| match e {
                    EditError::NotAnExpression(mut inner) => {
                        inner.insert(0, *head);
                        EditError::NotAnExpression(inner)
                    }
                    other => other,
                })?;
                self.with_operand(*head, Some(NoCodeOperand::NoCodeExpression(updated)))
            }
        }
    }

    /// Number of expression levels, counting this one.
    pub fn depth(&self) -> usize {
        1 + self
            .nested_expressions()
            .map(NoCodeExpression::depth)
            .max()
            .unwrap_or(0)
    }

    /// Collects every field id referenced anywhere in the tree.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_references(&mut fields);
        fields
    }

    fn collect_references<'a>(&'a self, fields: &mut Vec<&'a str>) {
        for operand in self.operands.iter().flatten() {
            match operand {
                NoCodeOperand::Reference { element_id } => fields.push(element_id),
                NoCodeOperand::NoCodeExpression(nested) => nested.collect_references(fields),
                NoCodeOperand::StaticValue { .. } => {}
            }
        }
    }

    fn nested_expressions(&self) -> impl Iterator<Item = &NoCodeExpression> {
        self.operands.iter().flatten().filter_map(|operand| match operand {
            NoCodeOperand::NoCodeExpression(nested) => Some(nested),
            _ => None,
        })
    }

    pub fn display_tree(&self) -> DisplayExpression<'_> {
        DisplayExpression { expr: self }
    }
}

/// Renders an expression as an indented tree, one node per line.
pub struct DisplayExpression<'a> {
    pub expr: &'a NoCodeExpression,
}

impl<'a> fmt::Display for DisplayExpression<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::fmt_as_tree(self.expr, f, "", true)
    }
}

impl<'a> DisplayExpression<'a> {
    fn fmt_as_tree(
        expr: &NoCodeExpression,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        if expr.has_operator() {
            writeln!(f, "{}{}{}", prefix, node_marker, expr.operator_identifier)?;
        } else {
            writeln!(f, "{}{}<no operator>", prefix, node_marker)?;
        }

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        let count = expr.operands.len();
        for (i, operand) in expr.operands.iter().enumerate() {
            let last = i + 1 == count;
            let marker = if last { "└── " } else { "├── " };
            match operand {
                None => writeln!(f, "{}{}<empty>", child_prefix, marker)?,
                Some(NoCodeOperand::StaticValue { value }) => {
                    writeln!(f, "{}{}Literal: {:?}", child_prefix, marker, value)?
                }
                Some(NoCodeOperand::Reference { element_id }) => {
                    writeln!(f, "{}{}Reference: ${}", child_prefix, marker, element_id)?
                }
                Some(NoCodeOperand::NoCodeExpression(nested)) => {
                    Self::fmt_as_tree(nested, f, &child_prefix, last)?
                }
            }
        }
        Ok(())
    }
}
