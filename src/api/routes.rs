use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::api::handlers::{auth, reference, teams};
use crate::api::state::AppState;

/// Builds the HTTP router
///
/// Transport layers (tracing, CORS) are added by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(auth::health_check))
        // Auth routes
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/profile", get(auth::profile))
        // Team routes
        .route("/api/teams", get(teams::list_teams).post(teams::create_team))
        .route("/api/teams/my-teams", get(teams::my_teams))
        .route("/api/teams/my-team", get(teams::my_team))
        .route(
            "/api/teams/:id",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        .route("/api/teams/:id/members", post(teams::add_member))
        .route("/api/teams/:id/members/:user_id", delete(teams::remove_member))
        .route("/api/teams/:id/candidates", get(teams::candidates))
        // Reference data
        .route("/api/users", get(reference::list_users))
        .route("/api/departments", get(reference::list_departments))
        .with_state(state)
}
