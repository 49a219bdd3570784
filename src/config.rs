use crate::i18n::Language;
use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Content
    pub content_dir: String,
    pub language_file: String,
    pub default_language: Language,

    // News API
    pub news_api_url: String,

    // Email delivery
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub contact_recipient: String,
    pub contact_recipient_name: String,
    /// Include delivery diagnostics in 500 responses. Off in production.
    pub expose_mail_debug: bool,

    // HTTP
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            // Content
            content_dir: std::env::var("CONTENT_DIR").unwrap_or_else(|_| "content".to_string()),
            language_file: std::env::var("LANGUAGE_FILE")
                .unwrap_or_else(|_| "data/language".to_string()),
            default_language: match std::env::var("DEFAULT_LANGUAGE") {
                Ok(code) => Language::from_code(&code)
                    .context("DEFAULT_LANGUAGE is not a supported language code")?,
                Err(_) => Language::default(),
            },

            // News API
            news_api_url: std::env::var("NEWS_API_URL").context("NEWS_API_URL not set")?,

            // Email delivery
            mail_api_url: std::env::var("MAIL_API_URL").context("MAIL_API_URL not set")?,
            mail_api_key: std::env::var("MAIL_API_KEY").context("MAIL_API_KEY not set")?,
            contact_recipient: std::env::var("CONTACT_RECIPIENT")
                .context("CONTACT_RECIPIENT not set")?,
            contact_recipient_name: std::env::var("CONTACT_RECIPIENT_NAME")
                .unwrap_or_else(|_| "Website".to_string()),
            expose_mail_debug: std::env::var("EXPOSE_MAIL_DEBUG")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),

            // HTTP
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
        })
    }

    /// The explicit timeout applied to every outbound HTTP client.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
