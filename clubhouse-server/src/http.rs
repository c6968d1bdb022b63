use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Extension, Json, Router};
use tracing::{info, warn, Instrument};

use crate::auth;
use crate::error::{attach_correlation, AppError};
use crate::models::{
    ApprovalRequest, DeletedResponse, SavedResponse, SecretStatusResponse, StatsResponse,
    StoreSecretRequest, UserSummary, UsersResponse,
};
use crate::state::AppState;
use crate::telemetry::{correlation_layer, request_span, CorrelationId};
use clubhouse_core::principal::Principal;
use clubhouse_core::store::ClubStore;

pub fn router(state: AppState) -> Router {
    let admin = admin_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_admin,
    ));

    let api = member_routes()
        .merge(admin)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/healthz", get(health_check))
        .merge(api)
        .layer(middleware::from_fn(correlation_layer))
        .with_state(state)
}

fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/secret", post(store_secret).delete(delete_secret))
        .route("/secret/status", get(secret_status))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}/approval", patch(set_approval))
        .route("/admin/stats", get(admin_stats))
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn store_secret(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<StoreSecretRequest>,
) -> Result<impl IntoResponse, AppError> {
    let span = request_span("http.store_secret", &correlation.0);
    async move {
        state
            .vault
            .store_secret(principal.user_id(), &request.secret)
            .await
            .map_err(AppError::from)?;

        info!(
            target = "audit",
            action = "secret.store",
            user = %principal.user_id(),
            "member secret stored"
        );
        Ok((StatusCode::OK, Json(SavedResponse { saved: true })))
    }
    .instrument(span)
    .await
    .map_err(|err: AppError| attach_correlation(err, &correlation))
}

async fn secret_status(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    let span = request_span("http.secret_status", &correlation.0);
    async move {
        let present = state
            .vault
            .has_secret(principal.user_id())
            .await
            .map_err(AppError::from)?;
        Ok((StatusCode::OK, Json(SecretStatusResponse { present })))
    }
    .instrument(span)
    .await
    .map_err(|err: AppError| attach_correlation(err, &correlation))
}

async fn delete_secret(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    let span = request_span("http.delete_secret", &correlation.0);
    async move {
        state
            .vault
            .delete_secret(principal.user_id())
            .await
            .map_err(AppError::from)?;

        info!(
            target = "audit",
            action = "secret.delete",
            user = %principal.user_id(),
            "member secret deleted"
        );
        Ok((StatusCode::OK, Json(DeletedResponse { deleted: true })))
    }
    .instrument(span)
    .await
    .map_err(|err: AppError| attach_correlation(err, &correlation))
}

async fn list_users(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
) -> Result<impl IntoResponse, AppError> {
    let span = request_span("http.list_users", &correlation.0);
    async move {
        let users = state
            .store
            .list_users()
            .await
            .map_err(AppError::from)?
            .into_iter()
            .map(UserSummary::from)
            .collect();
        Ok((StatusCode::OK, Json(UsersResponse { users })))
    }
    .instrument(span)
    .await
    .map_err(|err: AppError| attach_correlation(err, &correlation))
}

async fn set_approval(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(request): Json<ApprovalRequest>,
) -> Result<impl IntoResponse, AppError> {
    let span = request_span("http.set_approval", &correlation.0);
    async move {
        let updated = state
            .store
            .update_user_approval(&id, request.approved)
            .await
            .map_err(AppError::from)?;

        info!(
            target = "audit",
            action = "member.approval",
            admin = %principal.user_id(),
            user = %updated.id,
            approved = request.approved,
            "approval flag updated"
        );
        Ok((StatusCode::OK, Json(UserSummary::from(updated))))
    }
    .instrument(span)
    .await
    .map_err(|err: AppError| attach_correlation(err, &correlation))
}

async fn admin_stats(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
) -> Result<impl IntoResponse, AppError> {
    let span = request_span("http.admin_stats", &correlation.0);
    async move {
        let users = state.store.list_users().await.map_err(AppError::from)?;
        let pending = users.iter().filter(|user| !user.approved).count() as u64;

        // Tallies are best-effort; the dashboard renders without them.
        let content = match state.store.content_counts().await {
            Ok(counts) => Some(counts),
            Err(err) => {
                warn!(error = %err, "content tallies unavailable");
                None
            }
        };

        Ok((
            StatusCode::OK,
            Json(StatsResponse {
                users: users.len() as u64,
                pending,
                content,
            }),
        ))
    }
    .instrument(span)
    .await
    .map_err(|err: AppError| attach_correlation(err, &correlation))
}
