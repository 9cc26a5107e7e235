use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::predict::TleCatalog;
use crate::storage::AccountStore;

use super::api::passes as pass_handlers;
use super::api::session as session_handlers;
use super::api::settings as settings_handlers;
use super::api_doc::ApiDoc;
use super::auth::AppState;
use super::config::Config;
use super::sessions::SessionStore;

pub fn build_state(config: Config) -> AppState {
    let accounts = AccountStore::new(config.storage.base_folder.clone());

    let catalog = if let Some(ref predict_config) = config.predict {
        let mut catalog = TleCatalog::new(predict_config.tle_folder.clone());
        match catalog.load_all() {
            Ok(()) => Some(Arc::new(RwLock::new(catalog))),
            Err(e) => {
                log::warn!("Failed to initialize TLE catalog: {}", e);
                None
            }
        }
    } else {
        None
    };

    AppState {
        config: Arc::new(config),
        accounts: Arc::new(accounts),
        sessions: Arc::new(SessionStore::new()),
        catalog,
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        // Settings API endpoints
        .route("/api/settings", get(settings_handlers::get_settings))
        .route(
            "/api/changeSettings",
            post(settings_handlers::change_settings),
        )
        .route(
            "/api/save_to_session",
            post(settings_handlers::save_to_session),
        )
        // Session endpoints
        .route("/api/session", get(session_handlers::get_session))
        .route("/api/login", get(session_handlers::login))
        .route("/api/logout", get(session_handlers::logout))
        .route("/auth", get(session_handlers::auth_callback))
        // Predict endpoints
        .route("/api/passData", get(pass_handlers::pass_data))
        .route("/api/get_path_csv", post(pass_handlers::pass_path))
        .route("/api/mapviewInfo", post(pass_handlers::map_view_info))
        .route("/api/next_pass_path", post(pass_handlers::next_pass_path))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Front-end build; client-side routes fall back to index.html
    if let Some(dir) = state.config.web.static_dir.clone() {
        let index = ServeFile::new(dir.join("index.html"));
        app = app.fallback_service(ServeDir::new(dir).fallback(index));
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let app = build_router(build_state(config));

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
