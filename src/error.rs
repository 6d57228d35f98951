use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use crate::github::GitHubError;
use crate::mailer::MailError;
use crate::models::ErrorBody;
use crate::validation::FieldError;

/// Every way an API request can fail, mapped to a status and a JSON body.
///
/// Upstream variants keep their cause for logging; the body only carries a
/// generic message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limit exceeded")]
    RateLimited,

    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("email service not configured")]
    MailerNotConfigured,

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error("invalid username {0:?}")]
    InvalidUsername(String),

    #[error(transparent)]
    GitHub(#[from] GitHubError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Validation(_) | ApiError::InvalidUsername(_) => StatusCode::BAD_REQUEST,
            ApiError::MailerNotConfigured | ApiError::Mail(_) | ApiError::GitHub(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::RateLimited => ErrorBody {
                success: false,
                error: "Rate limit exceeded",
                message: "Too many requests. Please try again later.".to_string(),
                details: None,
            },
            ApiError::Validation(details) => ErrorBody {
                success: false,
                error: "Validation failed",
                message: "Please check your input and try again".to_string(),
                details: Some(details),
            },
            ApiError::MailerNotConfigured => ErrorBody {
                success: false,
                error: "Email service not configured",
                message: "Unable to send message at this time".to_string(),
                details: None,
            },
            ApiError::Mail(_) => ErrorBody {
                success: false,
                error: "Internal server error",
                message: "Unable to send message. Please try again later.".to_string(),
                details: None,
            },
            ApiError::InvalidUsername(username) => ErrorBody {
                success: false,
                error: "Invalid username",
                message: format!("'{}' is not a valid GitHub username", username),
                details: None,
            },
            ApiError::GitHub(_) => ErrorBody {
                success: false,
                error: "Failed to fetch GitHub data",
                message: "Unable to reach GitHub. Please try again later.".to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
