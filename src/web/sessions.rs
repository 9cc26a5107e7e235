use axum::{
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts},
};
use std::collections::HashMap;
use std::convert::Infallible;
use tokio::sync::RwLock;

use crate::identity::UserSession;
use crate::predict::Pass;
use crate::settings::SettingsRecord;

pub const SESSION_COOKIE: &str = "pass_board_session";

/// Server-side state of one browser session.
#[derive(Debug, Clone, Default)]
pub struct BrowserSession {
    pub user: Option<UserSession>,
    /// Session-scoped settings copy.
    pub settings: Option<SettingsRecord>,
    /// Set by a session save, cleared by an account save: which copy
    /// `/api/settings` answers with.
    pub use_session_settings: bool,
    /// Passes last served by `/api/passData`; tracks and map views are
    /// looked up here by AOS.
    pub passes: Vec<Pass>,
}

impl BrowserSession {
    pub fn session_settings(&self) -> Option<&SettingsRecord> {
        if self.use_session_settings {
            self.settings.as_ref()
        } else {
            None
        }
    }
}

/// Session-scoped store. Lives in memory, so it empties on restart.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, BrowserSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &str) -> Option<BrowserSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Applies `f` to the session, creating an empty one first if needed.
    pub async fn update<F>(&self, id: &str, f: F)
    where
        F: FnOnce(&mut BrowserSession),
    {
        let mut sessions = self.sessions.write().await;
        f(sessions.entry(id.to_string()).or_default());
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Session id from the request's cookie, if the browser sent one.
#[derive(Debug, Clone)]
pub struct SessionCookie(pub Option<String>);

impl SessionCookie {
    /// The existing id, or a fresh one along with the `Set-Cookie` value
    /// that hands it to the browser.
    pub fn id_or_new(self) -> (String, Option<String>) {
        match self.0 {
            Some(id) => (id, None),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
                (id, Some(cookie))
            }
        }
    }
}

impl<S> FromRequestParts<S> for SessionCookie
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty());
        Ok(SessionCookie(id))
    }
}
