use axum::{
    extract::{Query, State},
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Redirect},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    identity::UserSession,
    web::api::error::{ApiError, ApiResult, ErrorResponse},
    web::auth::AppState,
    web::sessions::SessionCookie,
};

/// Where the browser lands after signing in or out.
pub const SETTINGS_PAGE: &str = "/SettingsPage";

#[utoipa::path(
    get,
    path = "/api/session",
    tag = "session",
    responses(
        (status = 200, description = "Signed-in identity, or null", body = Option<UserSession>)
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    cookie: SessionCookie,
) -> Json<Option<UserSession>> {
    let user = match cookie.0 {
        Some(id) => state.sessions.get(&id).await.and_then(|s| s.user),
        None => None,
    };
    Json(user)
}

#[utoipa::path(
    get,
    path = "/api/login",
    tag = "session",
    responses(
        (status = 303, description = "Redirect to the identity provider"),
        (status = 503, description = "No identity provider configured", body = ErrorResponse)
    )
)]
pub async fn login(State(state): State<AppState>) -> ApiResult<Redirect> {
    let url = state
        .config
        .auth
        .login_url
        .as_deref()
        .ok_or(ApiError::NotConfigured("login"))?;
    Ok(Redirect::to(url))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AuthQuery {
    /// Token issued by the identity provider.
    pub token: String,
}

#[utoipa::path(
    get,
    path = "/auth",
    tag = "session",
    params(AuthQuery),
    responses(
        (status = 303, description = "Signed in; redirect to the settings page"),
        (status = 401, description = "Unknown token", body = ErrorResponse)
    )
)]
pub async fn auth_callback(
    State(state): State<AppState>,
    cookie: SessionCookie,
    Query(query): Query<AuthQuery>,
) -> ApiResult<impl IntoResponse> {
    let account = state
        .config
        .find_account(&query.token)
        .ok_or(ApiError::InvalidToken)?;

    let (session_id, set_cookie) = cookie.id_or_new();
    let email = account.email.clone();
    log::info!("Session signed in as {}", email);
    state
        .sessions
        .update(&session_id, |s| s.user = Some(UserSession { email }))
        .await;

    Ok((
        AppendHeaders(set_cookie.map(|c| (SET_COOKIE, c))),
        Redirect::to(SETTINGS_PAGE),
    ))
}

#[utoipa::path(
    get,
    path = "/api/logout",
    tag = "session",
    responses(
        (status = 303, description = "Signed out; redirect to the settings page")
    )
)]
pub async fn logout(State(state): State<AppState>, cookie: SessionCookie) -> Redirect {
    if let Some(id) = cookie.0 {
        state.sessions.update(&id, |s| s.user = None).await;
    }
    Redirect::to(SETTINGS_PAGE)
}
