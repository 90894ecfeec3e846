pub mod auth;
mod employees;
pub mod error;
mod evaluations;
mod questions;
mod reports;
mod users;
pub mod validation;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Any authenticated principal, employees included
    let principal_routes = Router::new()
        .route("/users/:id", get(users::get_user))
        .route("/employees", get(employees::list_employees))
        .route("/employees/:id", get(employees::get_employee));

    // Admins and managers
    let staff_routes = Router::new()
        .route("/employees", post(employees::create_employee))
        .route("/employees/:id", put(employees::update_employee))
        .route("/questions", get(questions::list_questions))
        .route("/questions/:id", get(questions::get_question))
        .route(
            "/evaluations",
            get(evaluations::list_evaluations).post(evaluations::create_evaluation),
        )
        .route(
            "/evaluations/:id",
            get(evaluations::get_evaluation).put(evaluations::update_evaluation),
        )
        .route("/evaluations/:id/submit", post(evaluations::submit_evaluation))
        .route("/reports/employee/:id", get(reports::employee_report))
        .route("/reports/department/:department", get(reports::department_report))
        .route_layer(middleware::from_fn(auth::require_staff));

    // Admins only
    let admin_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/employees/:id", delete(employees::delete_employee))
        .route("/questions", post(questions::create_question))
        .route(
            "/questions/:id",
            put(questions::update_question).delete(questions::delete_question),
        )
        .route("/evaluations/:id", delete(evaluations::delete_evaluation))
        .route_layer(middleware::from_fn(auth::require_admin));

    // Protected API routes
    let api_routes = Router::new()
        .merge(principal_routes)
        .merge(staff_routes)
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/", get(banner))
        .route("/health", get(health_check))
        .nest("/api/users/auth", auth_routes)
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn banner() -> Json<Value> {
    Json(json!({
        "message": "360 Evaluation API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
