use utoipa::OpenApi;

use super::api::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::settings::get_settings,
        super::api::settings::change_settings,
        super::api::settings::save_to_session,
        super::api::session::get_session,
        super::api::session::login,
        super::api::session::auth_callback,
        super::api::session::logout,
        super::api::passes::pass_data,
        super::api::passes::pass_path,
        super::api::passes::map_view_info,
        super::api::passes::next_pass_path,
    ),
    components(
        schemas(
            ErrorResponse,
            crate::settings::WireSettings,
            crate::settings::WireSatellite,
            crate::settings::PredictionMode,
            crate::identity::UserSession,
            crate::predict::Pass,
            crate::predict::PassBoard,
            crate::predict::TrackPoint,
            crate::predict::GeoPoint,
            crate::predict::MapView,
            super::api::passes::NextPassRequest,
        )
    ),
    info(
        title = "Pass Board API",
        description = "Ground station settings and satellite pass predictions",
        version = "0.1.0"
    ),
    tags(
        (name = "settings", description = "Session- and account-scoped settings"),
        (name = "session", description = "Browser session identity"),
        (name = "predict", description = "Pass predictions")
    )
)]
pub struct ApiDoc;
