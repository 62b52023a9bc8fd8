//! Transform requests as they arrive from a caller.

use crate::error::{InsightError, Result};
use crate::transforms::MissingStrategy;
use serde::{Deserialize, Serialize};

/// A single transform request.
///
/// Serialized with a `type` tag, e.g.
/// `{"type": "handle_missing", "strategy": "median"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    DropColumns {
        columns: Vec<String>,
    },
    #[serde(alias = "missing_values")]
    HandleMissing {
        #[serde(default)]
        strategy: MissingStrategy,
    },
    OneHotEncode {
        columns: Vec<String>,
    },
    LabelEncode {
        columns: Vec<String>,
    },
    Normalize {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        columns: Option<Vec<String>>,
    },
    RemoveDuplicates,
}

impl Operation {
    /// Name of the operation as used in the `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::DropColumns { .. } => "drop_columns",
            Operation::HandleMissing { .. } => "handle_missing",
            Operation::OneHotEncode { .. } => "one_hot_encode",
            Operation::LabelEncode { .. } => "label_encode",
            Operation::Normalize { .. } => "normalize",
            Operation::RemoveDuplicates => "remove_duplicates",
        }
    }

    /// Parse a JSON array of operations.
    ///
    /// Malformed requests (unknown type, bad strategy, missing field) are
    /// reported as [`InsightError::InvalidOperation`].
    pub fn list_from_json(json: &str) -> Result<Vec<Operation>> {
        serde_json::from_str(json).map_err(|e| InsightError::InvalidOperation(e.to_string()))
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_operation_list() {
        let json = r#"[
            {"type": "drop_columns", "columns": ["id"]},
            {"type": "handle_missing", "strategy": "median"},
            {"type": "one_hot_encode", "columns": ["city"]},
            {"type": "label_encode", "columns": ["grade"]},
            {"type": "normalize"},
            {"type": "remove_duplicates"}
        ]"#;

        let ops = Operation::list_from_json(json).unwrap();
        assert_eq!(
            ops,
            vec![
                Operation::DropColumns {
                    columns: vec!["id".to_string()]
                },
                Operation::HandleMissing {
                    strategy: MissingStrategy::Median
                },
                Operation::OneHotEncode {
                    columns: vec!["city".to_string()]
                },
                Operation::LabelEncode {
                    columns: vec!["grade".to_string()]
                },
                Operation::Normalize { columns: None },
                Operation::RemoveDuplicates,
            ]
        );
    }

    #[test]
    fn test_missing_values_alias_and_default_strategy() {
        let ops = Operation::list_from_json(r#"[{"type": "missing_values"}]"#).unwrap();
        assert_eq!(
            ops,
            vec![Operation::HandleMissing {
                strategy: MissingStrategy::Mean
            }]
        );
    }

    #[test]
    fn test_invalid_operation() {
        let err = Operation::list_from_json(r#"[{"type": "explode"}]"#).unwrap_err();
        assert!(matches!(err, InsightError::InvalidOperation(_)));

        let err =
            Operation::list_from_json(r#"[{"type": "handle_missing", "strategy": "avg"}]"#)
                .unwrap_err();
        assert!(matches!(err, InsightError::InvalidOperation(_)));
    }

    #[test]
    fn test_operation_name() {
        assert_eq!(Operation::RemoveDuplicates.name(), "remove_duplicates");
        assert_eq!(
            Operation::Normalize { columns: None }.to_string(),
            "normalize"
        );
    }
}
