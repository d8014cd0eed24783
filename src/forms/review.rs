//! Forms posted by the inline field editor.

use serde::Deserialize;
use validator::Validate;

use crate::domain::types::FieldPath;
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
/// A confirmed inline edit.
pub struct EditFieldForm {
    /// `section.field` of the edited cell.
    #[validate(length(min = 3))]
    pub path: String,
    /// Draft text as typed; trimmed by the cell.
    #[serde(default)]
    #[validate(length(max = 20000))]
    pub value: String,
}

#[derive(Debug, Deserialize)]
/// Identifies a field for retry or revert.
pub struct FieldPathForm {
    pub path: String,
}

fn parse_path(raw: &str) -> Result<FieldPath, FormError> {
    raw.parse().map_err(|_| FormError::InvalidFieldPath)
}

impl EditFieldForm {
    pub fn into_parts(self) -> Result<(FieldPath, String), FormError> {
        self.validate()?;
        let path = parse_path(&self.path)?;
        Ok((path, self.value))
    }
}

impl TryFrom<FieldPathForm> for FieldPath {
    type Error = FormError;

    fn try_from(form: FieldPathForm) -> Result<Self, Self::Error> {
        parse_path(&form.path)
    }
}
