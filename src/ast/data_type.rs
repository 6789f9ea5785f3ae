use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of value kinds a no-code rule can work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoCodeDataType {
    Any,
    Boolean,
    Number,
    String,
    Date,
    List,
    Object,
}

impl NoCodeDataType {
    pub const ALL: [NoCodeDataType; 7] = [
        NoCodeDataType::Any,
        NoCodeDataType::Boolean,
        NoCodeDataType::Number,
        NoCodeDataType::String,
        NoCodeDataType::Date,
        NoCodeDataType::List,
        NoCodeDataType::Object,
    ];

    /// `Any` is compatible with every kind in both directions; every other kind is
    /// compatible only with itself.
    pub fn is_compatible(self, other: NoCodeDataType) -> bool {
        self == other || self == NoCodeDataType::Any || other == NoCodeDataType::Any
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoCodeDataType::Any => "Any",
            NoCodeDataType::Boolean => "Boolean",
            NoCodeDataType::Number => "Number",
            NoCodeDataType::String => "String",
            NoCodeDataType::Date => "Date",
            NoCodeDataType::List => "List",
            NoCodeDataType::Object => "Object",
        }
    }
}

impl fmt::Display for NoCodeDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-function form of [`NoCodeDataType::is_compatible`].
pub fn is_compatible(a: NoCodeDataType, b: NoCodeDataType) -> bool {
    a.is_compatible(b)
}
