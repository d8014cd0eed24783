//! Sparse single-field update sent back to the collaborator.
//!
//! An update addresses exactly one field by its path. The receiver merges it
//! into the stored extraction without touching sibling fields, so two
//! reviewers editing different fields of one document never overwrite each
//! other.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::types::{FieldPath, TypeConstraintError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdate {
    pub path: FieldPath,
    pub value: Value,
}

impl FieldUpdate {
    pub fn new(path: FieldPath, value: Value) -> Self {
        Self { path, value }
    }

    /// Builds the update for a confirmed edit of `original`.
    ///
    /// Scalars are sent as the edited text. A nested original must be
    /// replaced by a nested value, so the text has to parse as a JSON object
    /// or array.
    pub fn for_edit(
        path: FieldPath,
        original: &Value,
        text: String,
    ) -> Result<Self, TypeConstraintError> {
        let value = match original {
            Value::Object(_) | Value::Array(_) => {
                let parsed: Value = serde_json::from_str(&text).map_err(|err| {
                    TypeConstraintError::InvalidValue(format!("{path} expects JSON: {err}"))
                })?;
                if !(parsed.is_object() || parsed.is_array()) {
                    return Err(TypeConstraintError::InvalidValue(format!(
                        "{path} expects a JSON object or array"
                    )));
                }
                parsed
            }
            _ => Value::String(text),
        };
        Ok(Self { path, value })
    }

    /// Applies the update to an extraction map, creating the section if
    /// needed. Sibling fields are left as they are.
    pub fn merge_into(
        &self,
        extraction: &mut Map<String, Value>,
    ) -> Result<(), TypeConstraintError> {
        let section = extraction
            .entry(self.path.section().to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match section {
            Value::Object(fields) => {
                fields.insert(self.path.field().to_string(), self.value.clone());
                Ok(())
            }
            _ => Err(TypeConstraintError::InvalidFieldPath(format!(
                "{} is not a section",
                self.path.section()
            ))),
        }
    }
}
