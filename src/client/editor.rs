use super::router::{PersistenceRouter, SaveError, SaveTarget};
use crate::identity::UserSession;
use crate::settings::{reduce, SettingsAction, SettingsRecord};

/// Owns the draft settings record while the user edits it.
///
/// All edits go through [`SettingsEditor::dispatch`]; the router only ever
/// sees a copy handed over on submit.
#[derive(Debug, Default)]
pub struct SettingsEditor {
    draft: Option<SettingsRecord>,
}

impl SettingsEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the draft with a record loaded from the backend.
    pub fn load(&mut self, record: SettingsRecord) {
        self.draft = Some(record);
    }

    pub fn draft(&self) -> Option<&SettingsRecord> {
        self.draft.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.draft.is_some()
    }

    /// Applies one edit. Returns false while nothing is loaded yet.
    pub fn dispatch(&mut self, action: SettingsAction) -> bool {
        match self.draft.take() {
            Some(record) => {
                self.draft = Some(reduce(record, action));
                true
            }
            None => {
                log::debug!("Edit {:?} before settings loaded, ignored", action);
                false
            }
        }
    }

    /// Saves the draft to the store named by `action_name`
    /// (`"database"` or `"session"`).
    pub async fn submit(
        &self,
        action_name: &str,
        router: &PersistenceRouter,
        session: Option<&UserSession>,
    ) -> Result<String, SaveError> {
        let target: SaveTarget = action_name.parse()?;
        let record = self.draft.clone().ok_or(SaveError::NotLoaded)?;
        router.save(target, record, session).await
    }
}
