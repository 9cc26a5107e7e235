use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::{
    predict::{
        map_view, next_pass, pass_track, predict_board, GroundStation, MapView, Pass, PassBoard,
        TleCatalog, TrackPoint,
    },
    settings::SettingsRecord,
    web::api::error::{ApiError, ApiResult, ErrorResponse},
    web::api::settings::active_settings,
    web::auth::AppState,
    web::sessions::SessionCookie,
};

fn catalog(state: &AppState) -> ApiResult<&RwLock<TleCatalog>> {
    state
        .catalog
        .as_deref()
        .ok_or(ApiError::NotConfigured("pass prediction"))
}

fn checked(settings: SettingsRecord) -> ApiResult<SettingsRecord> {
    settings
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    Ok(settings)
}

#[utoipa::path(
    get,
    path = "/api/passData",
    tag = "predict",
    responses(
        (status = 200, description = "Upcoming passes for the active settings", body = PassBoard),
        (status = 503, description = "No TLE catalog configured", body = ErrorResponse)
    )
)]
pub async fn pass_data(
    State(state): State<AppState>,
    cookie: SessionCookie,
) -> ApiResult<impl IntoResponse> {
    let catalog = catalog(&state)?;
    let settings = checked(active_settings(&state, &cookie).await?)?;

    let board = predict_board(&settings, &*catalog.read().await, Utc::now())?;

    let (session_id, set_cookie) = cookie.id_or_new();
    let passes = board.passes.clone();
    state
        .sessions
        .update(&session_id, |s| s.passes = passes)
        .await;

    Ok((
        AppendHeaders(set_cookie.map(|c| (SET_COOKIE, c))),
        Json(board),
    ))
}

/// A pass from this session's last `/api/passData`, with the station it
/// was predicted for.
async fn listed_pass(
    state: &AppState,
    cookie: &SessionCookie,
    aos: DateTime<Utc>,
) -> ApiResult<(GroundStation, Pass)> {
    let session = match &cookie.0 {
        Some(id) => state.sessions.get(id).await,
        None => None,
    };
    let pass = session
        .and_then(|s| s.passes.into_iter().find(|p| p.aos == aos))
        .ok_or(ApiError::PassNotFound)?;

    let settings = active_settings(state, cookie).await?;
    Ok((GroundStation::from_settings(&settings), pass))
}

#[utoipa::path(
    post,
    path = "/api/get_path_csv",
    tag = "predict",
    request_body(content = String, description = "AOS of a pass from /api/passData"),
    responses(
        (status = 200, description = "Look angles for each second of the pass", body = Vec<TrackPoint>),
        (status = 404, description = "No such pass in this session", body = ErrorResponse)
    )
)]
pub async fn pass_path(
    State(state): State<AppState>,
    cookie: SessionCookie,
    Json(aos): Json<DateTime<Utc>>,
) -> ApiResult<Json<Vec<TrackPoint>>> {
    let catalog = catalog(&state)?;
    let (station, pass) = listed_pass(&state, &cookie, aos).await?;

    let catalog = catalog.read().await;
    let tle = catalog
        .get(pass.norad_id)
        .ok_or(ApiError::UnknownSatellite(pass.norad_id))?;
    Ok(Json(pass_track(&station, tle, &pass)?))
}

#[utoipa::path(
    post,
    path = "/api/mapviewInfo",
    tag = "predict",
    request_body(content = String, description = "AOS of a pass from /api/passData"),
    responses(
        (status = 200, description = "Sub-satellite points at AOS and LOS, and the station", body = MapView),
        (status = 404, description = "No such pass in this session", body = ErrorResponse)
    )
)]
pub async fn map_view_info(
    State(state): State<AppState>,
    cookie: SessionCookie,
    Json(aos): Json<DateTime<Utc>>,
) -> ApiResult<Json<MapView>> {
    let catalog = catalog(&state)?;
    let (station, pass) = listed_pass(&state, &cookie, aos).await?;

    let catalog = catalog.read().await;
    let tle = catalog
        .get(pass.norad_id)
        .ok_or(ApiError::UnknownSatellite(pass.norad_id))?;
    Ok(Json(map_view(&station, tle, &pass)?))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NextPassRequest {
    #[serde(rename = "Email address")]
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/api/next_pass_path",
    tag = "predict",
    request_body = NextPassRequest,
    responses(
        (status = 200, description = "Look angles for the account's next tracked pass", body = Vec<TrackPoint>),
        (status = 400, description = "No settings stored for that email", body = ErrorResponse),
        (status = 404, description = "No tracked pass left in the window", body = ErrorResponse)
    )
)]
pub async fn next_pass_path(
    State(state): State<AppState>,
    Json(request): Json<NextPassRequest>,
) -> ApiResult<Json<Vec<TrackPoint>>> {
    let catalog = catalog(&state)?;
    let settings = state
        .accounts
        .load(&request.email)?
        .ok_or(ApiError::UnknownAccount)?;
    let settings = checked(settings)?;

    let catalog = catalog.read().await;
    let pass = next_pass(&settings, &catalog, Utc::now())?.ok_or(ApiError::NoUpcomingPass)?;
    let tle = catalog
        .get(pass.norad_id)
        .ok_or(ApiError::UnknownSatellite(pass.norad_id))?;

    log::info!(
        "Next pass for {}: {} at {}",
        request.email,
        pass.satellite,
        pass.aos
    );
    Ok(Json(pass_track(
        &GroundStation::from_settings(&settings),
        tle,
        &pass,
    )?))
}
