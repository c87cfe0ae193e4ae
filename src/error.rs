use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not Found")]
    NotFound,

    #[error("Product {product_id} not found")]
    ProductNotFound { product_id: Uuid },

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage timeout")]
    Timeout,

    /// The commit request was sent but its result never came back. The write
    /// may or may not be durable, so it must not be replayed.
    #[error("Commit outcome unknown")]
    CommitOutcomeUnknown,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Failures worth another attempt: timeouts, pool exhaustion, dropped
    /// connections, serialization failures and deadlocks.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Timeout => true,
            AppError::DbError(err) => sqlx_is_transient(err),
            AppError::OrmError(DbErr::ConnectionAcquire(_)) => true,
            AppError::OrmError(
                DbErr::Conn(RuntimeErr::SqlxError(err))
                | DbErr::Exec(RuntimeErr::SqlxError(err))
                | DbErr::Query(RuntimeErr::SqlxError(err)),
            ) => sqlx_is_transient(err),
            _ => false,
        }
    }

    /// Classify a failure of `COMMIT` itself. A lost connection or an elapsed
    /// deadline says nothing about whether the server applied the commit.
    pub fn after_commit(self) -> AppError {
        let ambiguous = match &self {
            AppError::Timeout => true,
            AppError::DbError(err) => matches!(err, sqlx::Error::Io(_)),
            AppError::OrmError(
                DbErr::Conn(RuntimeErr::SqlxError(err))
                | DbErr::Exec(RuntimeErr::SqlxError(err))
                | DbErr::Query(RuntimeErr::SqlxError(err)),
            ) => matches!(err, sqlx::Error::Io(_)),
            _ => false,
        };
        if ambiguous {
            AppError::CommitOutcomeUnknown
        } else {
            self
        }
    }

    /// Status label reported to callers of the placement endpoint.
    pub fn placement_status(&self) -> &'static str {
        match self {
            AppError::InsufficientStock { .. } => "insufficient_stock",
            AppError::Validation(_) => "invalid",
            AppError::ProductNotFound { .. } | AppError::NotFound => "not_found",
            AppError::CommitOutcomeUnknown => "unknown",
            _ => "failed",
        }
    }

    fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            AppError::Storage(_)
                | AppError::CommitOutcomeUnknown
                | AppError::DbError(_)
                | AppError::OrmError(_)
                | AppError::Internal(_)
        )
    }
}

fn sqlx_is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => true,
        // 40001 serialization_failure, 40P01 deadlock_detected
        sqlx::Error::Database(db) => matches!(db.code().as_deref(), Some("40001") | Some("40P01")),
        _ => false,
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    status: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound | AppError::ProductNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InsufficientStock { .. } | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            AppError::CommitOutcomeUnknown => StatusCode::GATEWAY_TIMEOUT,
            AppError::Storage(_)
            | AppError::DbError(_)
            | AppError::OrmError(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if self.is_storage_failure() {
            tracing::error!(error = ?self, "request failed on storage");
        }

        // Storage variants render as fixed strings, details stay in the log.
        let message = match &self {
            AppError::Storage(_) => "Storage error".to_string(),
            _ => self.to_string(),
        };

        let body = ApiResponse {
            message: message.clone(),
            data: Some(ErrorData {
                error: message,
                status: self.placement_status(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
