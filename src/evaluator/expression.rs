use super::literal::parse_literal;
use super::{DecimalSeparator, EvaluatorOptions};
use crate::ast::{EvaluationTrace, NoCodeDataType, NoCodeExpression, NoCodeOperand, Value};
use crate::data::ReferenceResolver;
use crate::error::EvaluationError;
use crate::registry::{NoCodeOperatorParameter, OperatorCatalog};
use crate::trace::TraceFormatter;

/// An operator whose declared return type does not fit the slot it was placed in.
///
/// This is an editor-time signal used to narrow operator choices; it never aborts an
/// evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeWarning {
    pub operator: String,
    pub return_type: NoCodeDataType,
    pub desired_type: NoCodeDataType,
}

/// The result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluated {
    pub value: Value,
    /// The operator's declared return type.
    pub declared_type: NoCodeDataType,
    pub warnings: Vec<TypeWarning>,
    pub trace: EvaluationTrace,
}

impl Evaluated {
    /// A human-readable rendering of how the value was computed.
    pub fn reason(&self) -> String {
        TraceFormatter::format_trace(&self.trace)
    }
}

/// Evaluates typed expression trees against an injected operator catalog.
pub struct ExpressionEvaluator<'r> {
    registry: &'r dyn OperatorCatalog,
    options: EvaluatorOptions,
}

pub struct ExpressionEvaluatorBuilder<'r> {
    registry: &'r dyn OperatorCatalog,
    options: EvaluatorOptions,
}

impl<'r> ExpressionEvaluatorBuilder<'r> {
    pub fn with_options(mut self, options: EvaluatorOptions) -> Self {
        self.options = options;
        self
    }
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }
    pub fn with_decimal_separator(mut self, separator: DecimalSeparator) -> Self {
        self.options.decimal_separator = separator;
        self
    }
    pub fn build(self) -> ExpressionEvaluator<'r> {
        ExpressionEvaluator {
            registry: self.registry,
            options: self.options,
        }
    }
}

impl<'r> ExpressionEvaluator<'r> {
    pub fn new(registry: &'r dyn OperatorCatalog) -> Self {
        Self::builder(registry).build()
    }

    pub fn builder(registry: &'r dyn OperatorCatalog) -> ExpressionEvaluatorBuilder<'r> {
        ExpressionEvaluatorBuilder {
            registry,
            options: EvaluatorOptions::default(),
        }
    }

    pub fn registry(&self) -> &'r dyn OperatorCatalog {
        self.registry
    }

    /// Evaluates `expr` for a slot expecting `desired_type`.
    ///
    /// # Returns
    ///
    /// * `Ok(Evaluated)`: the computed value, its trace, and any return-type warnings.
    /// * `Err(EvaluationError)`: the first failure met while walking the tree. Failures
    ///   in nested expressions propagate unchanged.
    pub fn evaluate(
        &self,
        expr: &NoCodeExpression,
        data: &dyn ReferenceResolver,
        desired_type: NoCodeDataType,
    ) -> Result<Evaluated, EvaluationError> {
        log::debug!(
            "Evaluating expression '{}' for a {} slot",
            expr.operator_identifier,
            desired_type
        );
        let mut warnings = Vec::new();
        let trace = self.evaluate_recursive(expr, data, desired_type, 1, &mut warnings)?;
        let declared_type = self
            .registry
            .describe(&expr.operator_identifier)
            .map_or(NoCodeDataType::Any, |details| details.return_type);
        Ok(Evaluated {
            value: trace.get_outcome(),
            declared_type,
            warnings,
            trace,
        })
    }

    fn evaluate_recursive(
        &self,
        expr: &NoCodeExpression,
        data: &dyn ReferenceResolver,
        desired_type: NoCodeDataType,
        depth: usize,
        warnings: &mut Vec<TypeWarning>,
    ) -> Result<EvaluationTrace, EvaluationError> {
        if depth > self.options.max_depth {
            return Err(EvaluationError::MalformedTree(format!(
                "expression nested deeper than {} levels",
                self.options.max_depth
            )));
        }

        let details = self
            .registry
            .describe(&expr.operator_identifier)
            .filter(|_| expr.has_operator())
            .ok_or_else(|| EvaluationError::UnknownOperator(expr.operator_identifier.clone()))?;

        if expr.operands.len() > details.parameters.len() {
            return Err(EvaluationError::MalformedTree(format!(
                "operator '{}' takes {} operands, but {} were given",
                details.identifier,
                details.parameters.len(),
                expr.operands.len()
            )));
        }

        let mut arguments = Vec::with_capacity(details.parameters.len());
        for (index, parameter) in details.parameters.iter().enumerate() {
            let operand = match expr.operands.get(index) {
                Some(Some(operand)) => operand,
                Some(None) | None => {
                    return Err(EvaluationError::MissingOperand {
                        operator: details.identifier.clone(),
                        index,
                        expected: parameter.data_type,
                    });
                }
            };
            let context = format!("operand {} of '{}'", index, details.identifier);
            let trace = self.evaluate_operand(operand, parameter, &context, data, depth, warnings)?;
            arguments.push(trace);
        }

        let values: Vec<Value> = arguments.iter().map(EvaluationTrace::get_outcome).collect();
        let outcome = self
            .registry
            .apply(&details.identifier, &values)
            .map_err(|e| EvaluationError::OperatorFailed {
                operator: details.identifier.clone(),
                message: e.to_string(),
            })?;

        if !details.return_type.is_compatible(desired_type) {
            log::warn!(
                "Operator '{}' returns {}, but the slot expects {}",
                details.identifier,
                details.return_type,
                desired_type
            );
            warnings.push(TypeWarning {
                operator: details.identifier.clone(),
                return_type: details.return_type,
                desired_type,
            });
        }

        log::trace!("{} -> {}", details.identifier, outcome);
        Ok(EvaluationTrace::Operator {
            identifier: details.identifier.clone(),
            arguments,
            outcome,
        })
    }

    fn evaluate_operand(
        &self,
        operand: &NoCodeOperand,
        parameter: &NoCodeOperatorParameter,
        context: &str,
        data: &dyn ReferenceResolver,
        depth: usize,
        warnings: &mut Vec<TypeWarning>,
    ) -> Result<EvaluationTrace, EvaluationError> {
        let expected = parameter.data_type;
        match operand {
            NoCodeOperand::StaticValue { value } => {
                if let Some(options) = &parameter.options {
                    if !options.iter().any(|option| option == value) {
                        return Err(EvaluationError::literal_mismatch(context, expected, value));
                    }
                }
                let parsed = parse_literal(value, expected, self.options.decimal_separator)
                    .ok_or_else(|| EvaluationError::literal_mismatch(context, expected, value))?;
                Ok(EvaluationTrace::Leaf {
                    source: parsed.to_string(),
                    value: parsed,
                })
            }
            NoCodeOperand::Reference { element_id } => {
                let (_, value) = data.resolve(element_id).into_typed_value(element_id)?;
                check_runtime_type(context, expected, &value)?;
                Ok(EvaluationTrace::Leaf {
                    source: format!("${}", element_id),
                    value,
                })
            }
            NoCodeOperand::NoCodeExpression(nested) => {
                let trace = self.evaluate_recursive(nested, data, expected, depth + 1, warnings)?;
                check_runtime_type(context, expected, &trace.get_outcome())?;
                Ok(trace)
            }
        }
    }
}

/// Values flowing into a parameter must fit its type. An empty value fits every type.
fn check_runtime_type(
    context: &str,
    expected: NoCodeDataType,
    value: &Value,
) -> Result<(), EvaluationError> {
    if value.is_null() || value.data_type().is_compatible(expected) {
        Ok(())
    } else {
        Err(EvaluationError::type_mismatch(context, expected, value))
    }
}
