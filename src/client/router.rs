use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use super::backend::{ClientError, HttpBackend};
use super::refresh::RefreshCoordinator;
use crate::identity::UserSession;
use crate::settings::SettingsRecord;

/// Which store a save writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    /// Durable copy tied to the signed-in account.
    Account,
    /// Copy scoped to the browser session, no sign-in needed.
    Session,
}

impl SaveTarget {
    /// Maps the name of the save action the user invoked to its target.
    pub fn from_action_name(name: &str) -> Option<Self> {
        match name {
            "database" => Some(SaveTarget::Account),
            "session" => Some(SaveTarget::Session),
            _ => None,
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            SaveTarget::Account => "/api/changeSettings",
            SaveTarget::Session => "/api/save_to_session",
        }
    }
}

impl FromStr for SaveTarget {
    type Err = SaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SaveTarget::from_action_name(s).ok_or_else(|| SaveError::UnknownAction(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("log in to save settings to your account")]
    Unauthenticated,
    #[error("unknown save action {0:?}")]
    UnknownAction(String),
    #[error("settings have not been loaded yet")]
    NotLoaded,
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("save request failed: {0}")]
    Transport(String),
}

impl From<ClientError> for SaveError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Status {
                status, message, ..
            } => SaveError::Rejected {
                status: status.as_u16(),
                message,
            },
            ClientError::Http(e) => SaveError::Transport(e.to_string()),
        }
    }
}

/// Sends a settings record to the store picked by the save action, then
/// schedules a refresh of the page whatever the outcome.
pub struct PersistenceRouter {
    backend: Arc<HttpBackend>,
    refresh: Arc<RefreshCoordinator>,
}

impl PersistenceRouter {
    pub fn new(backend: Arc<HttpBackend>, refresh: Arc<RefreshCoordinator>) -> Self {
        Self { backend, refresh }
    }

    /// Saves `record` to `target` and returns the server's message.
    ///
    /// An account save without a signed-in `session` is refused here
    /// before any request is made, and schedules no refresh.
    pub async fn save(
        &self,
        target: SaveTarget,
        record: SettingsRecord,
        session: Option<&UserSession>,
    ) -> Result<String, SaveError> {
        if target == SaveTarget::Account && session.is_none() {
            log::warn!("Account save refused: no signed-in session");
            return Err(SaveError::Unauthenticated);
        }

        let outcome = self
            .backend
            .post_settings(target.endpoint(), &record)
            .await
            .map_err(SaveError::from);

        match &outcome {
            Ok(message) => log::info!("Saved settings to {:?}: {}", target, message),
            Err(e) => log::warn!("Saving settings to {:?} failed: {}", target, e),
        }

        self.refresh.schedule_refresh().await;
        outcome
    }
}
