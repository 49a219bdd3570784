//! The contact relay endpoint.
//!
//! The site's single server surface: `POST /api/contact-us` validates a
//! submission (the authoritative layer, independent of any client-side
//! check), composes exactly one email, and hands it to the delivery
//! service. Responses follow the fixed wire format: 200 with
//! `{"success": true, "message"}`, 400/500 with `{"error", "debug"?}`.

use crate::config::Config;
use crate::contact::{
    valid_email, ContactFailure, ContactRequest, ContactSuccess, ValidationError,
    CONFIRMATION_MESSAGE, DELIVERY_FAILED_MESSAGE,
};
use crate::contact::ContactMessage;
use crate::mailer::{Address, Mailer, OutboundEmail};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub struct AppState {
    pub config: Config,
    pub mailer: Mailer,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/contact-us", post(handle_contact))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_contact(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ContactRequest>,
) -> Response {
    let message = match validate_request(&request) {
        Ok(message) => message,
        Err(e) => {
            info!("Rejected contact submission: {}", e);
            return validation_failure(e);
        }
    };

    let recipient = Address {
        email: state.config.contact_recipient.clone(),
        name: state.config.contact_recipient_name.clone(),
    };
    let email = OutboundEmail::from_contact(&message, recipient);

    match state.mailer.send(&email).await {
        Ok(()) => {
            info!("Contact form relayed for {}", message.email);
            (
                StatusCode::OK,
                Json(ContactSuccess {
                    success: true,
                    message: CONFIRMATION_MESSAGE.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Contact email delivery failed: {}", e);
            let debug = state.config.expose_mail_debug.then(|| e.to_string());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ContactFailure {
                    error: DELIVERY_FAILED_MESSAGE.to_string(),
                    debug,
                }),
            )
                .into_response()
        }
    }
}

/// Authoritative server-side validation: every field present and non-blank,
/// email syntactically valid.
fn validate_request(request: &ContactRequest) -> Result<ContactMessage, ValidationError> {
    let field = |value: &Option<String>| -> Result<String, ValidationError> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            _ => Err(ValidationError::MissingFields),
        }
    };

    let message = ContactMessage {
        name: field(&request.name)?,
        email: field(&request.email)?,
        subject: field(&request.subject)?,
        body: field(&request.message)?,
    };

    if !valid_email(&message.email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(message)
}

fn validation_failure(e: ValidationError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ContactFailure {
            error: e.to_string(),
            debug: None,
        }),
    )
        .into_response()
}
