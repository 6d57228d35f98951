use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use std::sync::Arc;
use crate::error::ApiError;
use crate::metrics::{CONTACT_RATE_LIMITED, CONTACT_REQUESTS, EMAILS_SENT, RATE_LIMIT_KEYS};
use crate::models::{CleanupResponse, ContactReceipt, ContactResponse};
use crate::state::AppState;
use crate::validation::validate_contact;

// Bucket for callers whose address can't be determined
pub const UNKNOWN_CLIENT: &str = "unknown";

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then [`UNKNOWN_CLIENT`].
/// Callers behind one proxy share a bucket.
pub fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded.or(real_ip).unwrap_or(UNKNOWN_CLIENT).to_string()
}

pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ContactResponse>, ApiError> {
    CONTACT_REQUESTS.inc();
    let ip = client_ip(&headers);

    // limit is checked before the body is even parsed
    let allowed = state.rate_limiter.check_and_consume(&ip);
    RATE_LIMIT_KEYS.set(state.rate_limiter.len() as f64);
    if !allowed {
        CONTACT_RATE_LIMITED.inc();
        tracing::warn!(client = %ip, "contact rate limit exceeded");
        return Err(ApiError::RateLimited);
    }

    let form = validate_contact(&body).map_err(|details| {
        tracing::debug!(client = %ip, fields = details.len(), "contact submission failed validation");
        ApiError::Validation(details)
    })?;

    let Some(relay) = &state.contact_relay else {
        tracing::error!("missing RESEND_API_KEY or CONTACT_EMAIL for email service");
        return Err(ApiError::MailerNotConfigured);
    };

    let submitted_at = state.clock.now();
    let known_ip = (ip != UNKNOWN_CLIENT).then_some(ip.as_str());
    let email = relay.compose(&form, submitted_at, known_ip);

    let id = relay.mailer.send(&email).await.map_err(|e| {
        tracing::error!(error = %e, "failed to send contact email");
        ApiError::from(e)
    })?;

    EMAILS_SENT.inc();
    tracing::info!(
        id = %id,
        from = %form.email,
        subject = %form.subject,
        timestamp = %submitted_at.to_rfc3339(),
        "contact form submission sent"
    );

    Ok(Json(ContactResponse {
        success: true,
        message: "Message sent successfully",
        data: ContactReceipt { id },
    }))
}

// Drops expired rate-limit windows
pub async fn cleanup_handler(State(state): State<Arc<AppState>>) -> Json<CleanupResponse> {
    let active = state.rate_limiter.cleanup();
    RATE_LIMIT_KEYS.set(active as f64);
    tracing::info!(active, "rate limit cleanup completed");

    Json(CleanupResponse {
        success: true,
        message: "Rate limit cleanup completed",
        active_limits: active,
    })
}
