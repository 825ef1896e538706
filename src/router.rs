use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware};
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::modules::absences::router::init_absences_router;
use crate::modules::attendance_lists::router::init_attendance_lists_router;
use crate::modules::auth::router::init_auth_router;
use crate::modules::bulletins::router::init_bulletins_router;
use crate::modules::course_modules::router::init_modules_router;
use crate::modules::documents::router::init_documents_router;
use crate::modules::events::router::init_events_router;
use crate::modules::filieres::router::init_filieres_router;
use crate::modules::grades::router::init_grades_router;
use crate::modules::groupes::router::init_groupes_router;
use crate::modules::health::router::init_health_router;
use crate::modules::niveaux::router::init_niveaux_router;
use crate::modules::opportunities::router::init_opportunities_router;
use crate::modules::permissions::router::init_permissions_router;
use crate::modules::resources::router::init_resources_router;
use crate::modules::roles::router::init_roles_router;
use crate::modules::rooms::router::init_rooms_router;
use crate::modules::sessions::router::init_sessions_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

/// Room left above `MAX_UPLOAD_BYTES` for multipart boundaries and text fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn init_router(state: AppState) -> Router {
    let rate_limit = &state.rate_limit_config;

    let mut auth_router = init_auth_router();
    let mut api_router = Router::new()
        .nest("/users", init_users_router())
        .nest("/roles", init_roles_router())
        .nest("/permissions", init_permissions_router())
        .nest("/filieres", init_filieres_router())
        .nest("/niveaux", init_niveaux_router())
        .nest("/groupes", init_groupes_router())
        .nest("/modules", init_modules_router())
        .nest("/rooms", init_rooms_router())
        .nest("/events", init_events_router())
        .nest("/attendance-lists", init_attendance_lists_router())
        .nest("/sessions", init_sessions_router())
        .nest("/grades", init_grades_router())
        .nest("/bulletins", init_bulletins_router())
        .nest("/absences", init_absences_router())
        .nest("/documents", init_documents_router())
        .nest("/resources", init_resources_router())
        .nest("/opportunities", init_opportunities_router());

    if rate_limit.enabled {
        auth_router = auth_router.layer(GovernorLayer::new(Arc::new(
            rate_limit.auth_governor_config(),
        )));
        api_router = api_router.layer(GovernorLayer::new(Arc::new(
            rate_limit.general_governor_config(),
        )));
    }

    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .merge(init_health_router())
        .nest("/api", api_router.nest("/auth", auth_router));

    // Only a local mount point can be served from here; an absolute URL
    // means the files are published by something else.
    let base_url = state.storage_config.base_url.trim_end_matches('/');
    if base_url.starts_with('/') && base_url.len() > 1 {
        router = router.nest_service(
            base_url,
            ServeDir::new(&state.storage_config.upload_dir),
        );
    }

    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);

    let sessions = SessionManagerLayer::new(state.session_store.clone())
        .with_name("scolaris.sid")
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(state.session_config.secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            state.session_config.ttl_seconds,
        )));

    router
        .layer(sessions)
        .layer(DefaultBodyLimit::max(
            state.storage_config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
        ))
        .with_state(state.clone())
        .layer(cors)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
