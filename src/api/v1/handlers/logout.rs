use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::api::v1::extractors::AuthCtxExtractor;
use crate::state::AppState;

/// Drops the session's cached authorities and expires the cookie.
pub async fn logout(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> impl IntoResponse {
    state.login.logout(&ctx.session_id);

    let expired = format!(
        "{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax",
        state.session_cookie_name
    );
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, expired)])
}
