use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{api::handlers, system};

/// All application routes
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SYSTEM AUTH ROUTES (PUBLIC)
        // ========================================
        .route(
            "/api/system/auth/login",
            post(system::handlers::auth::login),
        )
        // System auth routes (protected)
        .route(
            "/api/system/auth/me",
            get(system::handlers::auth::current_user)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        // ========================================
        // DASHBOARDS
        // ========================================
        // D100 Finance Dashboard
        .route(
            "/api/finance",
            get(handlers::d100_finance::get_finance)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        .route(
            "/api/finance/yearly",
            get(handlers::d100_finance::get_yearly_finance)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
}
