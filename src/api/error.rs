use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use tracing::error;

use crate::error::KithError;

pub type ApiResult<T> = Result<T, KithError>;

/// `{"error": "not_found", "message": "...", "field": "email"}`
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'a str>,
}

fn code_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "invalid_request",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::CONFLICT => "conflict",
        StatusCode::SERVICE_UNAVAILABLE => "service_unavailable",
        StatusCode::BAD_GATEWAY => "bad_gateway",
        _ => "internal_error",
    }
}

impl ResponseError for KithError {
    fn status_code(&self) -> StatusCode {
        match self {
            KithError::BlankField { .. }
            | KithError::NonPositive { .. }
            | KithError::EmptySet { .. }
            | KithError::Invalid { .. } => StatusCode::BAD_REQUEST,
            KithError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            KithError::Forbidden(_) => StatusCode::FORBIDDEN,
            KithError::NotFound { .. } => StatusCode::NOT_FOUND,
            KithError::AlreadyExists { .. } | KithError::InvalidState(_) => StatusCode::CONFLICT,
            KithError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            KithError::Upstream(_) => StatusCode::BAD_GATEWAY,
            KithError::Database(_) | KithError::Io(_) | KithError::Json(_) | KithError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(ErrorBody {
            error: code_for(status),
            message,
            field: self.field(),
        })
    }
}

impl From<actix_web::error::BlockingError> for KithError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        KithError::Other(format!("blocking task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use serde_json::Value;

    async fn body_of(error: KithError) -> (StatusCode, Value) {
        let response = error.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn validation_errors_name_the_field() {
        let (status, body) = body_of(KithError::invalid("email", "is not an email address")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
        assert_eq!(body["field"], "email");
    }

    #[actix_web::test]
    async fn internal_errors_are_redacted() {
        let (status, body) = body_of(KithError::Other("disk on fire at /var/lib".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("field").is_none());
    }

    #[actix_web::test]
    async fn conflicts_and_outages() {
        assert_eq!(
            KithError::InvalidState("share is already accepted".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            KithError::NotConfigured("Instagram".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(KithError::Upstream("boom".into()).status_code(), StatusCode::BAD_GATEWAY);
    }
}
