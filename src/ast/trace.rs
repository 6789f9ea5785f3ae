use super::{ConditionOperator, ConditionSetOperator, Value};

/// A record of how an expression was evaluated, including intermediate values.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationTrace {
    Operator {
        identifier: String,
        arguments: Vec<EvaluationTrace>,
        outcome: Value,
    },
    Leaf {
        source: String,
        value: Value,
    },
}

impl EvaluationTrace {
    pub fn get_outcome(&self) -> Value {
        match self {
            EvaluationTrace::Operator { outcome, .. } => outcome.clone(),
            EvaluationTrace::Leaf { value, .. } => value.clone(),
        }
    }
}

/// A record of how a condition set was evaluated.
///
/// Members skipped by short-circuiting, and failed members overruled by a deciding
/// member, are recorded as `NotEvaluated`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTrace {
    Set {
        operator: ConditionSetOperator,
        members: Vec<ConditionTrace>,
        outcome: bool,
        unmet_message: Option<String>,
    },
    Condition {
        subject: String,
        subject_value: Value,
        operator: ConditionOperator,
        comparand: Option<Box<EvaluationTrace>>,
        outcome: bool,
        unmet_message: Option<String>,
    },
    NotEvaluated,
}

impl ConditionTrace {
    pub fn get_outcome(&self) -> Option<bool> {
        match self {
            ConditionTrace::Set { outcome, .. } | ConditionTrace::Condition { outcome, .. } => {
                Some(*outcome)
            }
            ConditionTrace::NotEvaluated => None,
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            ConditionTrace::Set { members, .. } if members.len() == 1 => 9,
            ConditionTrace::Set { operator, .. } => match operator {
                ConditionSetOperator::Any => 1,
                ConditionSetOperator::All => 2,
            },
            ConditionTrace::Condition { .. } | ConditionTrace::NotEvaluated => 9,
        }
    }

    /// Unmet messages of every evaluated condition whose outcome was `true`, depth first.
    ///
    /// In validation mode a `true` outcome marks a violation, so these are the messages
    /// describing what went wrong.
    pub fn messages_of_true_conditions(&self) -> Vec<String> {
        let mut messages = Vec::new();
        self.collect_true_messages(&mut messages);
        messages
    }

    fn collect_true_messages(&self, messages: &mut Vec<String>) {
        match self {
            ConditionTrace::Set {
                members,
                outcome: true,
                unmet_message,
                ..
            } => {
                let before = messages.len();
                for member in members {
                    member.collect_true_messages(messages);
                }
                if messages.len() == before {
                    if let Some(message) = unmet_message {
                        messages.push(message.clone());
                    }
                }
            }
            ConditionTrace::Condition {
                outcome: true,
                unmet_message: Some(message),
                ..
            } => messages.push(message.clone()),
            _ => {}
        }
    }
}
