use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
    Json,
};
use chrono::Utc;

use crate::{
    settings::{Roster, SatelliteEntry, SettingsRecord, WireSettings, MAX_SATELLITES},
    web::api::error::{ApiError, ApiResult, ErrorResponse},
    web::auth::{AccountUser, AppState},
    web::sessions::SessionCookie,
};

pub const SAVED_MESSAGE: &str = "Settings saved!";

#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "settings",
    responses(
        (status = 200, description = "Settings in effect for this browser session", body = WireSettings),
        (status = 500, description = "Account store unreadable", body = ErrorResponse)
    )
)]
pub async fn get_settings(
    State(state): State<AppState>,
    cookie: SessionCookie,
) -> ApiResult<Json<SettingsRecord>> {
    Ok(Json(active_settings(&state, &cookie).await?))
}

#[utoipa::path(
    post,
    path = "/api/changeSettings",
    tag = "settings",
    request_body = WireSettings,
    responses(
        (status = 200, description = "Saved to the account store", body = String),
        (status = 400, description = "Out-of-range field or unknown NORAD id", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
pub async fn change_settings(
    State(state): State<AppState>,
    user: AccountUser,
    Json(record): Json<SettingsRecord>,
) -> ApiResult<Json<&'static str>> {
    let record = prepare_for_save(&state, record).await?;

    state.accounts.save(&user.email, &record)?;
    state
        .sessions
        .update(&user.session_id, |s| s.use_session_settings = false)
        .await;

    log::info!(
        "Saved {} satellites to account {}",
        record.roster().len(),
        user.email
    );
    Ok(Json(SAVED_MESSAGE))
}

#[utoipa::path(
    post,
    path = "/api/save_to_session",
    tag = "settings",
    request_body = WireSettings,
    responses(
        (status = 200, description = "Saved to the browser session", body = String),
        (status = 400, description = "Out-of-range field or unknown NORAD id", body = ErrorResponse)
    )
)]
pub async fn save_to_session(
    State(state): State<AppState>,
    cookie: SessionCookie,
    Json(record): Json<SettingsRecord>,
) -> ApiResult<impl IntoResponse> {
    let record = prepare_for_save(&state, record).await?;

    let (session_id, set_cookie) = cookie.id_or_new();
    state
        .sessions
        .update(&session_id, |s| {
            s.settings = Some(record);
            s.use_session_settings = true;
        })
        .await;

    Ok((
        AppendHeaders(set_cookie.map(|c| (SET_COOKIE, c))),
        Json(SAVED_MESSAGE),
    ))
}

/// The record `/api/settings` serves: the session copy if the last save went
/// there, else the account copy when signed in, else the configured defaults.
pub async fn active_settings(state: &AppState, cookie: &SessionCookie) -> ApiResult<SettingsRecord> {
    let session = match &cookie.0 {
        Some(id) => state.sessions.get(id).await,
        None => None,
    };

    if let Some(session) = session {
        if let Some(record) = session.session_settings() {
            return Ok(record.clone());
        }
        if let Some(user) = &session.user {
            if let Some(record) = state.accounts.load(&user.email)? {
                return Ok(record);
            }
        }
    }

    Ok(default_settings(state).await)
}

async fn default_settings(state: &AppState) -> SettingsRecord {
    let defaults = &state.config.defaults;
    let mut record = SettingsRecord::default();
    record.set_station_longitude(defaults.station_longitude);
    record.set_station_latitude(defaults.station_latitude);
    record.set_prediction_hours(defaults.prediction_hours);
    record.set_minimum_elevation(defaults.minimum_elevation);
    record.set_custom_start_time(Utc::now());

    let catalog = match &state.catalog {
        Some(catalog) => Some(catalog.read().await),
        None => None,
    };
    let entries: Vec<SatelliteEntry> = defaults
        .satellites
        .iter()
        .take(MAX_SATELLITES)
        .map(|&norad_id| {
            let name = catalog
                .as_ref()
                .and_then(|c| c.get(norad_id))
                .map(|tle| tle.name.clone())
                .unwrap_or_else(|| format!("NORAD {norad_id}"));
            SatelliteEntry::new(norad_id, name)
        })
        .collect();
    *record.roster_mut() = Roster::try_from(entries).unwrap_or_default();
    record
}

/// Checks a record before it is stored. With a TLE catalog loaded, every
/// NORAD id must be known and names are replaced by the catalog's.
async fn prepare_for_save(state: &AppState, mut record: SettingsRecord) -> ApiResult<SettingsRecord> {
    record
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    if let Some(catalog) = &state.catalog {
        let catalog = catalog.read().await;
        for entry in record.roster_mut().entries_mut() {
            let tle = catalog
                .get(entry.norad_id)
                .ok_or(ApiError::UnknownSatellite(entry.norad_id))?;
            entry.name = tle.name.clone();
        }
    }

    Ok(record)
}
