//! Contact form: message model, validation, and the submission gateway.
//!
//! Validation runs twice by design: once here before any network call, and
//! once server-side as the authoritative layer (see `crate::server`). Both
//! layers produce the same user-facing messages.
//!
//! Submission is fire-and-forget with exactly one delivery attempt; there is
//! no retry anywhere in the chain, and resubmitting identical content sends
//! a duplicate email.

use crate::i18n::Language;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Confirmation text returned on a successful submission.
pub const CONFIRMATION_MESSAGE: &str =
    "Thank you for your message. We will get back to you soon!";

/// Generic user-facing text when delivery fails after validation passed.
pub const DELIVERY_FAILED_MESSAGE: &str = "Failed to send message. Please try again later.";

/// A structured contact-form submission. All fields are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub body: String,
}

/// Field-level validation failure. The `Display` text is shown to the user
/// verbatim and matches the server's wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingFields,
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

impl ContactMessage {
    /// Check all four fields are non-empty (after trimming) and the email is
    /// syntactically valid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let blank = |s: &str| s.trim().is_empty();
        if blank(&self.name) || blank(&self.email) || blank(&self.subject) || blank(&self.body) {
            return Err(ValidationError::MissingFields);
        }
        if !valid_email(self.email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

/// Standard email-address syntax check: one `@`, no whitespace, and a dotted
/// domain. Intentionally permissive beyond that.
pub fn valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
    });
    re.is_match(email)
}

// ==================== Wire types ====================

/// Request body POSTed to the contact endpoint. Fields are optional at the
/// wire level so the server can answer a missing field with its own 400
/// instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<&ContactMessage> for ContactRequest {
    fn from(msg: &ContactMessage) -> Self {
        Self {
            name: Some(msg.name.clone()),
            email: Some(msg.email.clone()),
            subject: Some(msg.subject.clone()),
            message: Some(msg.body.clone()),
        }
    }
}

/// Success body: `{"success": true, "message": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSuccess {
    pub success: bool,
    pub message: String,
}

/// Failure body: `{"error": "...", "debug": "..."}` where `debug` is only
/// present when the server is configured to expose diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactFailure {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

// ==================== Submission outcome ====================

/// The outcome of one submission, consumed once by the UI for a transient
/// notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Success {
        message: String,
    },
    Failure {
        message: String,
        /// Numeric code for programmatic branching: 400 validation, 409
        /// already in flight, 500 transport/delivery.
        status: u16,
        /// Diagnostic detail for logs, never shown to end users directly.
        detail: Option<String>,
    },
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionResult::Success { .. })
    }

    fn failure(message: impl Into<String>, status: u16) -> Self {
        SubmissionResult::Failure {
            message: message.into(),
            status,
            detail: None,
        }
    }

    fn failure_with_detail(message: impl Into<String>, status: u16, detail: String) -> Self {
        SubmissionResult::Failure {
            message: message.into(),
            status,
            detail: Some(detail),
        }
    }
}

// ==================== Gateway ====================

/// Client-side submission gateway for one form instance.
///
/// Enforces at-most-one in-flight submission: while one `submit` is
/// outstanding, further calls fail immediately (status 409) without a
/// network call, mirroring the disabled submit button in the UI.
#[derive(Debug)]
pub struct ContactGateway {
    client: reqwest::Client,
    endpoint: String,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the submission finishes, on any path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ContactGateway {
    /// Build a gateway POSTing to `endpoint` with an explicit request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            in_flight: AtomicBool::new(false),
        })
    }

    /// Submit a contact message: pre-validate, POST once, map the response.
    ///
    /// Invalid input and an already-outstanding submission both fail without
    /// touching the network.
    pub async fn submit(&self, message: &ContactMessage, language: Language) -> SubmissionResult {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return SubmissionResult::failure("A submission is already in progress", 409);
        }
        let _guard = InFlightGuard(&self.in_flight);

        if let Err(e) = message.validate() {
            return SubmissionResult::failure(e.to_string(), 400);
        }

        let request = ContactRequest::from(message);
        let response = match self
            .client
            .post(&self.endpoint)
            .header("Accept-Language", language.code())
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Contact submission transport failure: {}", e);
                return SubmissionResult::failure_with_detail(
                    DELIVERY_FAILED_MESSAGE,
                    500,
                    e.to_string(),
                );
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            let message = serde_json::from_str::<ContactSuccess>(&body)
                .map(|s| s.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| CONFIRMATION_MESSAGE.to_string());
            info!("Contact submission accepted");
            return SubmissionResult::Success { message };
        }

        match serde_json::from_str::<ContactFailure>(&body) {
            Ok(failure) => SubmissionResult::Failure {
                message: failure.error,
                status: status.as_u16(),
                detail: failure.debug,
            },
            Err(_) => SubmissionResult::failure(DELIVERY_FAILED_MESSAGE, status.as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn valid_message() -> ContactMessage {
        ContactMessage {
            name: "Layla Haddad".to_string(),
            email: "layla@example.com".to_string(),
            subject: "Partnership".to_string(),
            body: "We would like to discuss a partnership.".to_string(),
        }
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_valid_message_passes() {
        assert_eq!(valid_message().validate(), Ok(()));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut msg = valid_message();
        msg.name = String::new();
        assert_eq!(msg.validate(), Err(ValidationError::MissingFields));
    }

    #[test]
    fn test_whitespace_only_field_rejected() {
        let mut msg = valid_message();
        msg.subject = "   \t ".to_string();
        assert_eq!(msg.validate(), Err(ValidationError::MissingFields));
    }

    #[test]
    fn test_empty_body_rejected() {
        let mut msg = valid_message();
        msg.body = String::new();
        assert_eq!(msg.validate(), Err(ValidationError::MissingFields));
    }

    #[test]
    fn test_invalid_email_rejected() {
        let mut msg = valid_message();
        msg.email = "not-an-email".to_string();
        assert_eq!(msg.validate(), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_missing_fields_reported_before_bad_email() {
        let msg = ContactMessage {
            name: String::new(),
            email: "broken".to_string(),
            subject: "S".to_string(),
            body: "M".to_string(),
        };
        assert_eq!(msg.validate(), Err(ValidationError::MissingFields));
    }

    #[test]
    fn test_validation_messages_match_server_wording() {
        assert_eq!(
            ValidationError::MissingFields.to_string(),
            "Please fill in all required fields"
        );
        assert_eq!(
            ValidationError::InvalidEmail.to_string(),
            "Please enter a valid email address"
        );
    }

    // ==================== Email Syntax Tests ====================

    #[test]
    fn test_accepts_common_addresses() {
        assert!(valid_email("user@example.com"));
        assert!(valid_email("first.last@sub.domain.co"));
        assert!(valid_email("user+tag@example.org"));
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        assert!(!valid_email(""));
        assert!(!valid_email("plain"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("user@"));
        assert!(!valid_email("user@domain"));
        assert!(!valid_email("user @example.com"));
        assert!(!valid_email("user@@example.com"));
    }

    proptest! {
        #[test]
        fn prop_strings_without_at_never_validate(s in "[^@]{0,40}") {
            prop_assert!(!valid_email(&s));
        }

        #[test]
        fn prop_strings_with_whitespace_never_validate(
            a in "[a-z]{1,10}",
            b in "[a-z]{1,10}",
        ) {
            let candidate = format!("{} {}@example.com", a, b);
            prop_assert!(!valid_email(&candidate));
        }

        #[test]
        fn prop_simple_addresses_always_validate(
            local in "[a-z0-9]{1,16}",
            domain in "[a-z0-9]{1,12}",
            tld in "[a-z]{2,6}",
        ) {
            let candidate = format!("{}@{}.{}", local, domain, tld);
            prop_assert!(valid_email(&candidate));
        }
    }

    // ==================== Wire Type Tests ====================

    #[test]
    fn test_request_body_field_names() {
        let request = ContactRequest::from(&valid_message());
        let json = serde_json::to_string(&request).expect("Should serialize");

        // The body field is named "message" on the wire
        assert!(json.contains("\"message\""));
        assert!(json.contains("\"Layla Haddad\""));
        assert!(!json.contains("\"body\""));
    }

    #[test]
    fn test_failure_body_omits_absent_debug() {
        let failure = ContactFailure {
            error: "Failed to send message. Please try again later.".to_string(),
            debug: None,
        };
        let json = serde_json::to_string(&failure).expect("Should serialize");
        assert!(!json.contains("debug"));
    }

    #[test]
    fn test_failure_body_includes_present_debug() {
        let failure = ContactFailure {
            error: "x".to_string(),
            debug: Some("SMTP handshake refused".to_string()),
        };
        let json = serde_json::to_string(&failure).expect("Should serialize");
        assert!(json.contains("SMTP handshake refused"));
    }

    #[test]
    fn test_success_body_round_trip() {
        let json = r#"{"success": true, "message": "Thanks!"}"#;
        let success: ContactSuccess = serde_json::from_str(json).expect("Should deserialize");
        assert!(success.success);
        assert_eq!(success.message, "Thanks!");
    }

    // ==================== Gateway Pre-Network Tests ====================

    #[tokio::test]
    async fn test_invalid_input_fails_without_network() {
        // Endpoint is never contacted; any URL works
        let gateway =
            ContactGateway::new("http://127.0.0.1:9/api/contact-us", Duration::from_secs(1))
                .unwrap();

        let mut msg = valid_message();
        msg.email = "nope".to_string();

        let result = gateway.submit(&msg, Language::English).await;
        match result {
            SubmissionResult::Failure { message, status, .. } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Please enter a valid email address");
            }
            other => panic!("Expected validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_in_flight_flag_resets_after_completion() {
        let gateway =
            ContactGateway::new("http://127.0.0.1:9/api/contact-us", Duration::from_secs(1))
                .unwrap();

        // First call fails validation, which must still release the flag
        let mut msg = valid_message();
        msg.name = String::new();
        let _ = gateway.submit(&msg, Language::Arabic).await;

        let second = gateway.submit(&msg, Language::Arabic).await;
        match second {
            SubmissionResult::Failure { status, .. } => assert_eq!(status, 400),
            other => panic!("Expected validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_generic_500() {
        // Nothing listens on this port
        let gateway =
            ContactGateway::new("http://127.0.0.1:9/api/contact-us", Duration::from_secs(1))
                .unwrap();

        let result = gateway.submit(&valid_message(), Language::English).await;
        match result {
            SubmissionResult::Failure { message, status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(message, DELIVERY_FAILED_MESSAGE);
                assert!(detail.is_some(), "diagnostic detail should be carried");
            }
            other => panic!("Expected transport failure, got {:?}", other),
        }
    }
}
