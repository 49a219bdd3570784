//! Email composition and delivery.
//!
//! The delivery transport is an HTTP email API: the composed message is
//! POSTed as JSON with a bearer token and the API either accepts it (2xx) or
//! not. Exactly one attempt per call; the caller decides what a failure
//! means. The submitter's address is both the sender identity and the
//! reply-to target, and the configured operator address is the sole
//! recipient.

use crate::contact::ContactMessage;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// A delivery failure, after validation already passed.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to reach email delivery service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Email delivery service error ({status}): {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Address {
    pub email: String,
    pub name: String,
}

/// A fully composed outbound email with HTML and plain-text bodies.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: Address,
    pub to: Vec<Address>,
    pub reply_to: Address,
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl OutboundEmail {
    /// Compose the operator notification for one contact-form submission.
    pub fn from_contact(msg: &ContactMessage, recipient: Address) -> Self {
        let submitter = Address {
            email: msg.email.trim().to_string(),
            name: msg.name.trim().to_string(),
        };

        Self {
            from: submitter.clone(),
            to: vec![recipient],
            reply_to: submitter,
            subject: format!("Contact Form: {}", msg.subject.trim()),
            html: render_html(msg),
            text: render_text(msg),
        }
    }
}

/// Escape text for inclusion in an HTML body.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// HTML body: field list plus the message with newlines as `<br>`.
fn render_html(msg: &ContactMessage) -> String {
    let body = escape_html(msg.body.trim()).replace('\n', "<br>\n");
    format!(
        "<h2>New Contact Form Submission</h2>\n\
         <p><strong>Name:</strong> {}</p>\n\
         <p><strong>Email:</strong> {}</p>\n\
         <p><strong>Subject:</strong> {}</p>\n\
         <h3>Message:</h3>\n\
         <p>{}</p>\n",
        escape_html(msg.name.trim()),
        escape_html(msg.email.trim()),
        escape_html(msg.subject.trim()),
        body
    )
}

/// Plain-text alternative body.
fn render_text(msg: &ContactMessage) -> String {
    format!(
        "New Contact Form Submission\n\
         -------------------------\n\
         Name: {}\n\
         Email: {}\n\
         Subject: {}\n\
         \n\
         Message:\n\
         {}\n",
        msg.name.trim(),
        msg.email.trim(),
        msg.subject.trim(),
        msg.body.trim()
    )
}

/// HTTP client for the email delivery API.
#[derive(Debug, Clone)]
pub struct Mailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl Mailer {
    /// Build a mailer against `api_url` with an explicit request timeout.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Hand one composed email to the delivery service. Single attempt.
    pub async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Api { status, body });
        }

        info!("Email handed to delivery service");
        Ok(())
    }
}
