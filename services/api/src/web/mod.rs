pub mod middleware;
pub mod prompts;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

pub use middleware::{require_admin, require_auth};
pub use state::AppState;

/// Builds the API router: public schedule helpers, signed-in content routes and
/// admin routes.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/schedule", get(rest::schedule_handler))
        .route("/schedule/next", get(rest::next_date_handler))
        .route("/schedule/validate", post(rest::validate_date_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/calendar", get(rest::calendar_handler))
        .route("/dashboard/stats", get(rest::dashboard_stats_handler))
        .route(
            "/prompts/{id}/schedule",
            patch(prompts::reschedule_prompt_handler),
        )
        .route("/prompts/{id}/use", post(prompts::mark_prompt_used_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Admin routes; `require_auth` is the outer layer so it runs first.
    let admin_routes = Router::new()
        .route(
            "/admin/prompts/generate",
            post(prompts::generate_prompts_handler),
        )
        .layer(axum_middleware::from_fn(require_admin))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .with_state(app_state)
}
