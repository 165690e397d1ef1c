use admiral_core::AppError;
use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let admin_routes = Router::new()
        .route(
            "/api/admins",
            get(handlers::admins::list_admins_handler)
                .post(handlers::admins::create_admin_handler)
                .options(handlers::preflight::preflight_handler),
        )
        .route(
            "/api/admins/{account_id}",
            get(handlers::admins::get_admin_handler)
                .put(handlers::admins::update_admin_handler)
                .delete(handlers::admins::delete_admin_handler)
                .options(handlers::preflight::preflight_handler),
        )
        .route(
            "/api/admin-groups",
            get(handlers::admin_groups::list_admin_groups_handler)
                .options(handlers::preflight::preflight_handler),
        )
        .route(
            "/api/admin-groups/assignable",
            get(handlers::admin_groups::assignable_groups_handler)
                .options(handlers::preflight::preflight_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_verified_claims,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
