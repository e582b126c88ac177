use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{
    auth, dashboard, invitations, me, news, projects, registration, squads, teams, uploads, users,
};
use super::state::AppState;
use crate::config::AppConfig;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Builds the full HTTP application
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;
    let storage = ServeDir::new(&state.config.upload_dir);

    let public = Router::new()
        .route("/health", get(auth::health_check))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/register", post(registration::register))
        .route(
            "/api/invitations/:id/validate",
            get(registration::validate_invitation),
        )
        .route(
            "/api/register/:team_id",
            get(registration::team_registration_info).post(registration::register_with_team),
        );

    let account = Router::new()
        .route("/api/me", get(me::get_me).put(me::update_me))
        .route("/api/me/password", put(me::change_password))
        .route("/api/me/teams", get(me::my_teams))
        .route("/api/me/squads", get(me::my_squads))
        .route(
            "/api/me/active-team",
            get(me::get_active_team)
                .put(me::set_active_team)
                .delete(me::clear_active_team),
        );

    let organization = Router::new()
        .route("/api/teams", get(teams::list_teams).post(teams::create_team))
        .route(
            "/api/teams/:id",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        .route("/api/teams/:id/overview", get(teams::team_overview))
        .route(
            "/api/teams/:id/staff",
            get(teams::get_staff).put(teams::update_staff),
        )
        .route("/api/teams/:id/coordinators", post(teams::add_coordinator))
        .route(
            "/api/teams/:id/coordinators/:user_id",
            delete(teams::remove_coordinator),
        )
        .route("/api/squads", get(squads::list_squads).post(squads::create_squad))
        .route(
            "/api/squads/:id",
            get(squads::get_squad)
                .put(squads::update_squad)
                .delete(squads::delete_squad),
        )
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/invitations",
            get(invitations::list_invitations).post(invitations::create_invitation),
        )
        .route("/api/invitations/:id", get(invitations::get_invitation));

    let content = Router::new()
        .route("/api/news", get(news::list_news).post(news::create_news))
        .route(
            "/api/news/:id",
            get(news::get_news)
                .put(news::update_news)
                .delete(news::delete_news),
        )
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/api/projects/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route(
            "/api/uploads",
            post(uploads::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        );

    Router::new()
        .merge(public)
        .merge(account)
        .merge(organization)
        .merge(content)
        .nest_service("/storage", storage)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Any origin when none is configured, otherwise the listed origins with
/// credentials so the auth cookies are sent
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_origins_are_skipped() {
        let config = AppConfig {
            cors_origins: vec!["http://localhost:5173".to_string(), "bad\norigin".to_string()],
            ..AppConfig::default()
        };
        // Builds without panicking on the invalid entry
        let _ = cors_layer(&config);
    }
}
