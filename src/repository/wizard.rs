use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::types::WizardId;
use crate::domain::wizard::UploadWizard;

/// In-memory store of open upload wizards.
///
/// Each wizard is owned by exactly one session id. The lock is held only
/// for the duration of a closure and never across an await point.
#[derive(Debug, Default)]
pub struct WizardRegistry {
    sessions: Mutex<HashMap<WizardId, UploadWizard>>,
}

impl WizardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<WizardId, UploadWizard>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a fresh wizard under a newly generated id.
    // TODO: evict wizards whose session was abandoned mid-flow.
    pub fn open(&self, wizard: UploadWizard) -> WizardId {
        let id = WizardId::generate();
        self.lock().insert(id, wizard);
        id
    }

    /// Runs `f` against the wizard, returning `None` if the session is gone.
    pub fn with_wizard<T>(
        &self,
        id: &WizardId,
        f: impl FnOnce(&mut UploadWizard) -> T,
    ) -> Option<T> {
        self.lock().get_mut(id).map(f)
    }

    pub fn snapshot(&self, id: &WizardId) -> Option<UploadWizard> {
        self.lock().get(id).cloned()
    }

    pub fn close(&self, id: &WizardId) -> Option<UploadWizard> {
        self.lock().remove(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
