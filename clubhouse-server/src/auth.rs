use axum::body::Body;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::AppState;
use crate::telemetry::CorrelationId;
use clubhouse_core::principal::{Principal, Role};

pub const SESSION_COOKIE: &str = "club_session";

pub fn extract_bearer_token(value: &str) -> Option<&str> {
    let value = value.trim();
    if let Some(rest) = value.strip_prefix("Bearer ") {
        Some(rest.trim())
    } else if let Some(rest) = value.strip_prefix("bearer ") {
        Some(rest.trim())
    } else {
        None
    }
}

pub fn extract_session_cookie(value: &str) -> Option<&str> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
}

/// Pull the session token off a request: `Authorization: Bearer` wins,
/// the `club_session` cookie is the browser fallback.
pub fn session_token(req: &Request<Body>) -> Option<String> {
    let headers = req.headers();
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
    {
        return Some(token.to_string());
    }
    headers
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_session_cookie)
        .map(str::to_string)
}

/// Session and approval layers of the gate. Mounted on every route
/// except `/healthz`; admits the request with its `Principal` attached.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let correlation = req.extensions().get::<CorrelationId>().cloned();
    let token = session_token(&req);

    match state.gate.admit(token.as_deref(), Role::Member).await {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(rejection) => reject(rejection.into(), correlation),
    }
}

/// Role layer of the gate. Mounted inside `require_session` on the
/// `/admin` routes, so an unauthenticated request is already 401 by the
/// time this layer could say 403.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let correlation = req.extensions().get::<CorrelationId>().cloned();
    let Some(principal) = req.extensions().get::<Principal>().cloned() else {
        return reject(
            AppError::unauthorized("authentication required"),
            correlation,
        );
    };

    match state.gate.enforce_role(&principal, Role::Admin) {
        Ok(()) => next.run(req).await,
        Err(rejection) => reject(rejection.into(), correlation),
    }
}

fn reject(err: AppError, correlation: Option<CorrelationId>) -> Response {
    match correlation {
        Some(correlation) => err.with_correlation(correlation.0).into_response(),
        None => err.into_response(),
    }
}
