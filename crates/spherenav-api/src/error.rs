use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use spherenav_core::SphereError;
use uuid::Uuid;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// 400 for a rejected query parameter, tagged with a code that is also logged
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        let code = Uuid::new_v4();
        let reason = reason.into();
        tracing::warn!(
            error_code = %code,
            parameter = name,
            reason = %reason,
            "Rejected query parameter"
        );
        Self::bad_request(format!("Invalid parameter '{}'", name))
            .with_details(format!("{} (error code {})", reason, code))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.message, details: self.details };
        (self.status, Json(body)).into_response()
    }
}

impl From<SphereError> for ApiError {
    fn from(err: SphereError) -> Self {
        match &err {
            SphereError::NodeNotFound { .. } => {
                Self::not_found("Sphere not found").with_details(err.to_string())
            }
            e if e.is_upstream() => {
                tracing::error!(error = %err, "Sphere sources unavailable");
                Self::bad_gateway("Sphere sources unavailable").with_details(err.to_string())
            }
            _ => {
                tracing::error!(error = %err, "Sphere request failed");
                Self::internal("Internal error").with_details(err.to_string())
            }
        }
    }
}
