use anyhow::{Context, Result};
use hemmeh_site::config::Config;
use hemmeh_site::i18n::LanguageStore;
use hemmeh_site::mailer::Mailer;
use hemmeh_site::server::{self, AppState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hemmeh_site=info".parse()?),
        )
        .init();

    info!("Starting contact relay server");

    // Load configuration from environment
    let config = Config::from_env()?;

    // Initialize the persisted language selection (single process-wide value)
    let language = Arc::new(LanguageStore::open(
        &config.language_file,
        config.default_language,
    ));
    info!(
        "Serving with language '{}' ({})",
        language.current().code(),
        language.current().dir()
    );

    let mailer = Mailer::new(
        &config.mail_api_url,
        &config.mail_api_key,
        config.http_timeout(),
    )?;

    let port = config.port;
    let state = Arc::new(AppState { config, mailer });
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}
