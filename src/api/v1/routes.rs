/*
 * Responsibility
 * - URL layout. Which routes need what is decided by the policy table,
 *   not here.
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{greeting::say_hello_test, health::health, logout::logout};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/test", get(say_hello_test))
        .route("/logout", post(logout))
}
