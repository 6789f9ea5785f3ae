use super::NoCodeOperatorDetails;
use crate::ast::NoCodeDataType;
use serde::{Deserialize, Serialize};

/// Filter for operator listings, mirroring the catalog endpoint's
/// `outputType`, `inputType` and `search` query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<NoCodeDataType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<NoCodeDataType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl OperatorQuery {
    pub fn returning(output_type: NoCodeDataType) -> Self {
        Self {
            output_type: Some(output_type),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn accepting(mut self, input_type: NoCodeDataType) -> Self {
        self.input_type = Some(input_type);
        self
    }

    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn matches(&self, details: &NoCodeOperatorDetails) -> bool {
        if let Some(output) = self.output_type {
            if !details.return_type.is_compatible(output) {
                return false;
            }
        }
        if let Some(input) = self.input_type {
            if !details
                .parameters
                .iter()
                .any(|p| p.data_type.is_compatible(input))
            {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                [&details.identifier, &details.label, &details.description]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
        }
    }

    /// Encodes the query as `outputType=..&inputType=..&search=..`, omitting unset keys.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(output) = self.output_type {
            serializer.append_pair("outputType", output.as_str());
        }
        if let Some(input) = self.input_type {
            serializer.append_pair("inputType", input.as_str());
        }
        if let Some(search) = &self.search {
            serializer.append_pair("search", search);
        }
        serializer.finish()
    }

    /// Parses a query string. Unknown keys and unknown type names are ignored.
    pub fn from_query_string(query: &str) -> Self {
        let mut parsed = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "outputType" => parsed.output_type = parse_type(&value),
                "inputType" => parsed.input_type = parse_type(&value),
                "search" if !value.is_empty() => parsed.search = Some(value.into_owned()),
                _ => {}
            }
        }
        parsed
    }
}

fn parse_type(name: &str) -> Option<NoCodeDataType> {
    NoCodeDataType::ALL
        .into_iter()
        .find(|t| t.as_str().eq_ignore_ascii_case(name))
}
