use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::telemetry::{correlation_header_value, CorrelationId, CORRELATION_ID_HEADER};
use clubhouse_core::errors::GateRejection;

#[derive(Debug, Error)]
pub enum AppErrorKind {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found")]
    NotFound,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("{0}")]
    PendingApproval(String),
    #[error("unexpected error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
#[error("{kind}")]
pub struct AppError {
    kind: AppErrorKind,
    correlation_id: Option<String>,
}

impl AppError {
    pub fn new(kind: AppErrorKind) -> Self {
        Self {
            kind,
            correlation_id: None,
        }
    }

    pub fn with_correlation(mut self, id: String) -> Self {
        self.correlation_id = Some(id);
        self
    }

    fn status(&self) -> StatusCode {
        match self.kind {
            AppErrorKind::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppErrorKind::NotFound => StatusCode::NOT_FOUND,
            AppErrorKind::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppErrorKind::Forbidden(_) | AppErrorKind::PendingApproval(_) => StatusCode::FORBIDDEN,
            AppErrorKind::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        Self::new(AppErrorKind::BadRequest(message.into()))
    }

    pub fn unauthorized<T: Into<String>>(message: T) -> Self {
        Self::new(AppErrorKind::Unauthorized(message.into()))
    }

    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        Self::new(AppErrorKind::Forbidden(message.into()))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
    correlation_id: Option<&'a str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let correlation = self.correlation_id.clone();
        let body = Json(ErrorBody {
            error: match &self.kind {
                AppErrorKind::BadRequest(_) => "bad_request",
                AppErrorKind::NotFound => "not_found",
                AppErrorKind::Unauthorized(_) => "unauthorized",
                AppErrorKind::Forbidden(_) => "forbidden",
                // Wire contract: clients key their "awaiting approval"
                // screen off this exact code.
                AppErrorKind::PendingApproval(_) => "NOT_APPROVED",
                AppErrorKind::Internal(_) => "internal",
            },
            message: self.kind.to_string(),
            correlation_id: correlation.as_deref(),
        });

        let mut response = (status, body).into_response();
        if let Some(id) = correlation {
            response
                .headers_mut()
                .insert(CORRELATION_ID_HEADER, correlation_header_value(&id));
        }
        response
    }
}

impl From<clubhouse_core::Error> for AppError {
    fn from(value: clubhouse_core::Error) -> Self {
        let kind = match value {
            clubhouse_core::Error::EmptyComponent { .. }
            | clubhouse_core::Error::UnknownRole(_) => AppErrorKind::BadRequest(value.to_string()),
            clubhouse_core::Error::NotFound { .. } => AppErrorKind::NotFound,
            clubhouse_core::Error::Crypto(err) | clubhouse_core::Error::Storage(err) => {
                AppErrorKind::Internal(err)
            }
            clubhouse_core::Error::Key(err) => AppErrorKind::Internal(err.to_string()),
        };
        AppError::new(kind)
    }
}

impl From<GateRejection> for AppError {
    fn from(value: GateRejection) -> Self {
        let message = value.to_string();
        let kind = match value {
            GateRejection::Unauthenticated => AppErrorKind::Unauthorized(message),
            GateRejection::PendingApproval => AppErrorKind::PendingApproval(message),
            GateRejection::Forbidden => AppErrorKind::Forbidden(message),
        };
        AppError::new(kind)
    }
}

pub fn attach_correlation(err: AppError, correlation: &CorrelationId) -> AppError {
    err.with_correlation(correlation.0.clone())
}
