use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::predict::TleCatalog;
use crate::storage::AccountStore;

use super::api::error::ErrorResponse;
use super::config::Config;
use super::sessions::{SessionCookie, SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub accounts: Arc<AccountStore>,
    pub sessions: Arc<SessionStore>,
    pub catalog: Option<Arc<RwLock<TleCatalog>>>,
}

/// A request from a browser session with a signed-in identity.
#[derive(Debug, Clone)]
pub struct AccountUser {
    pub session_id: String,
    pub email: String,
}

pub enum AuthError {
    LoginRequired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::LoginRequired => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::with_message(
                    "login_required",
                    "Log in to save settings to your account.",
                )),
            )
                .into_response(),
        }
    }
}

impl FromRequestParts<AppState> for AccountUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let SessionCookie(id) = SessionCookie::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never: Infallible| match never {});
        let session_id = id.ok_or(AuthError::LoginRequired)?;

        let user = state
            .sessions
            .get(&session_id)
            .await
            .and_then(|s| s.user)
            .ok_or(AuthError::LoginRequired)?;

        Ok(AccountUser {
            session_id,
            email: user.email,
        })
    }
}
