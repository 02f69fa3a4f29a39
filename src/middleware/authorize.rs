//! HTTP dispatch adapter: request → `RequestDescriptor` → `Decision` → response.
//!
//! - session id comes from the session cookie, authorities from the session cache
//!   (unknown, expired or malformed session = unauthenticated)
//! - dispatch kind comes from a `DispatchKind` request extension, so only
//!   in-process re-dispatch can mark a request as internal; default is `Request`
//! - Allow → `AuthCtx` in extensions, Deny → 403, ChallengeLogin → 302 to the login entry point

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{HeaderMap, Request, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::authz::{Decision, DispatchKind, RequestDescriptor, SessionId};
use crate::state::AppState;

/// Puts every route of `router` behind the authorization engine.
///
/// Apply it to the fully merged router so the engine sees complete paths.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, authorize_middleware))
}

async fn authorize_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let dispatch = req
        .extensions()
        .get::<DispatchKind>()
        .copied()
        .unwrap_or(DispatchKind::Request);

    let path = match req.extensions().get::<OriginalUri>() {
        Some(OriginalUri(uri)) => uri.path().to_owned(),
        None => req.uri().path().to_owned(),
    };

    let session = session_id_from_cookies(req.headers(), &state.session_cookie_name)
        .and_then(|id| state.sessions().get(&id).map(|authorities| (id, authorities)));

    let descriptor = RequestDescriptor::new(
        &path,
        dispatch,
        session.as_ref().map(|(_, authorities)| authorities.as_ref()),
    );
    let (decision, rule) = state.engine.evaluate(&descriptor);

    match decision {
        Decision::Allow => {
            if let Some((session_id, authorities)) = session {
                req.extensions_mut().insert(AuthCtx::new(session_id, authorities));
            }
            next.run(req).await
        }
        Decision::Deny => {
            tracing::debug!(%path, %dispatch, rule = %rule.pattern(), "access denied");
            AppError::Forbidden.into_response()
        }
        Decision::ChallengeLogin => {
            tracing::debug!(%path, %dispatch, rule = %rule.pattern(), "login required");
            (
                StatusCode::FOUND,
                [(header::LOCATION, state.login_entry_point.to_string())],
            )
                .into_response()
        }
    }
}

fn session_id_from_cookies(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| SessionId::parse(value.trim_matches('"')))
}
