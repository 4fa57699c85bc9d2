//! HTTP error mapping.
//!
//! [`ApiError`] wraps the crate error and renders it as
//! `{ "status": "error", "code": ..., "message": ... }` with a status code
//! chosen per variant.

use crate::errors::Error;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Error returned by every handler
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self(Error::DataUnavailable(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(Error::validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(Error::validation(rejection.body_text()))
    }
}

/// Status code and public error code for an error.
#[must_use]
pub fn classify(err: &Error) -> (StatusCode, &'static str) {
    match err {
        Error::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        Error::InvalidAmount { .. } => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
        Error::InvalidPeriod { .. } => (StatusCode::BAD_REQUEST, "INVALID_PERIOD"),
        Error::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        Error::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        Error::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        Error::Conflict { .. } => (StatusCode::CONFLICT, "CONFLICT"),
        Error::DataUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "DATA_UNAVAILABLE"),
        Error::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
        Error::DashboardSection { source, .. } => classify(source),
        Error::Config { .. } | Error::Io(_) | Error::AddrParse(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    status: &'static str,
    code: &'a str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = classify(&self.0);

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "Internal error");
            "Internal server error".to_string()
        } else if status.is_server_error() {
            tracing::error!(code, error = %self.0, "Request failed");
            self.0.to_string()
        } else {
            tracing::warn!(code, error = %self.0, "Request rejected");
            self.0.to_string()
        };

        (
            status,
            Json(ErrorEnvelope {
                status: "error",
                code,
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbErr, RuntimeErr};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::validation("bad"), StatusCode::BAD_REQUEST),
            (Error::InvalidAmount { amount: -1.0 }, StatusCode::BAD_REQUEST),
            (
                Error::InvalidPeriod {
                    value: "quarter".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::Unauthorized {
                    message: "no token".to_string(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                Error::Forbidden {
                    message: "viewer".to_string(),
                },
                StatusCode::FORBIDDEN,
            ),
            (Error::not_found("pen", 7), StatusCode::NOT_FOUND),
            (
                Error::Conflict {
                    message: "taken".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (
                Error::DataUnavailable(DbErr::Conn(RuntimeErr::Internal("down".to_string()))),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                Error::Timeout {
                    operation: "metrics",
                    millis: 10,
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                Error::Config {
                    message: "broken".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(classify(&err).0, expected, "{err}");
        }
    }

    #[test]
    fn test_section_failure_uses_cause_status() {
        let err = Error::DashboardSection {
            section: "charts",
            source: Box::new(Error::Timeout {
                operation: "charts",
                millis: 10,
            }),
        };
        assert_eq!(classify(&err), (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"));
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let response = ApiError(Error::Config {
            message: "secret path".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
