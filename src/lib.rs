//! Request authorization and OIDC claim → authority mapping, with an axum
//! front end.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
