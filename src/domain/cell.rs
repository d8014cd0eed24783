//! Read/edit toggle over a single scalar value.
//!
//! The cell knows nothing about confidence, sections or the upload wizard.
//! Confirming hands back the new value only when it actually changed; the
//! caller decides what a change means.

use serde::Serialize;

use crate::domain::extraction::NOT_FOUND_SENTINEL;

/// Abstract keys a cell reacts to while editing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKey {
    /// Confirm the draft (Enter).
    Accept,
    /// Throw the draft away (Escape).
    Discard,
    /// Any other key; handled by the text input itself.
    Other,
}

/// What read mode shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "lines", rename_all = "snake_case")]
pub enum CellDisplay {
    /// Empty, `null` or "not found": rendered de-emphasized.
    Placeholder,
    /// One entry per line of the value.
    Lines(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditableCell {
    value: String,
    draft: Option<String>,
}

impl EditableCell {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self {
            value: value.into(),
            draft: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Enters edit mode seeded with the current value.
    pub fn activate(&mut self) {
        if self.draft.is_none() {
            self.draft = Some(self.value.clone());
        }
    }

    /// Replaces the draft. Ignored in read mode.
    pub fn set_draft<S: Into<String>>(&mut self, text: S) {
        if let Some(draft) = self.draft.as_mut() {
            *draft = text.into();
        }
    }

    /// Trims the draft and leaves edit mode. Returns the new value only if
    /// it differs from the current one.
    pub fn confirm(&mut self) -> Option<String> {
        let draft = self.draft.take()?;
        let trimmed = draft.trim();
        if trimmed == self.value {
            return None;
        }
        self.value = trimmed.to_string();
        Some(self.value.clone())
    }

    /// Leaves edit mode without touching the value.
    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Losing focus confirms.
    pub fn blur(&mut self) -> Option<String> {
        self.confirm()
    }

    pub fn handle_key(&mut self, key: CellKey) -> Option<String> {
        if !self.is_editing() {
            return None;
        }
        match key {
            CellKey::Accept => self.confirm(),
            CellKey::Discard => {
                self.cancel();
                None
            }
            CellKey::Other => None,
        }
    }

    /// Overwrites the value from outside, e.g. when a failed edit is reverted.
    pub fn reset(&mut self, value: String) {
        self.value = value;
        self.draft = None;
    }

    pub fn display(&self) -> CellDisplay {
        display_lines(&self.value)
    }
}

/// Read-mode rendering rule shared by cells and static fields.
pub fn display_lines(value: &str) -> CellDisplay {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == NOT_FOUND_SENTINEL || trimmed == "null" {
        return CellDisplay::Placeholder;
    }
    CellDisplay::Lines(value.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_emits_trimmed_change() {
        let mut cell = EditableCell::new("50000");
        cell.activate();
        assert_eq!(cell.draft(), Some("50000"));
        cell.set_draft("  52000 ");
        assert_eq!(cell.confirm(), Some("52000".to_string()));
        assert_eq!(cell.value(), "52000");
        assert!(!cell.is_editing());
    }

    #[test]
    fn confirming_identical_value_emits_nothing() {
        let mut cell = EditableCell::new("50000");
        cell.activate();
        cell.set_draft("50000   ");
        assert_eq!(cell.confirm(), None);
        assert!(!cell.is_editing());
        assert_eq!(cell.value(), "50000");
    }

    #[test]
    fn cancel_then_reactivate_shows_original() {
        let mut cell = EditableCell::new("Mumbai");
        cell.activate();
        cell.set_draft("Pune");
        cell.cancel();
        assert!(!cell.is_editing());
        cell.activate();
        assert_eq!(cell.draft(), Some("Mumbai"));
    }

    #[test]
    fn keys_drive_confirm_and_cancel() {
        let mut cell = EditableCell::new("a");
        assert_eq!(cell.handle_key(CellKey::Accept), None);

        cell.activate();
        cell.set_draft("b");
        assert_eq!(cell.handle_key(CellKey::Other), None);
        assert!(cell.is_editing());
        assert_eq!(cell.handle_key(CellKey::Discard), None);
        assert_eq!(cell.value(), "a");

        cell.activate();
        cell.set_draft("b");
        assert_eq!(cell.handle_key(CellKey::Accept), Some("b".to_string()));
    }

    #[test]
    fn blur_confirms() {
        let mut cell = EditableCell::new("");
        cell.activate();
        cell.set_draft("Lessor Pvt Ltd");
        assert_eq!(cell.blur(), Some("Lessor Pvt Ltd".to_string()));
    }

    #[test]
    fn set_draft_outside_edit_mode_is_ignored() {
        let mut cell = EditableCell::new("a");
        cell.set_draft("b");
        assert_eq!(cell.draft(), None);
        assert_eq!(cell.confirm(), None);
    }

    #[test]
    fn display_splits_lines_and_flags_placeholders() {
        assert_eq!(display_lines(""), CellDisplay::Placeholder);
        assert_eq!(display_lines("  "), CellDisplay::Placeholder);
        assert_eq!(display_lines("not_found"), CellDisplay::Placeholder);
        assert_eq!(
            EditableCell::new("Unit 4\nGround floor").display(),
            CellDisplay::Lines(vec!["Unit 4".into(), "Ground floor".into()])
        );
    }
}
