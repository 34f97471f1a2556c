use std::sync::Arc;

use server::clients::openai::OpenAiClient;
use server::clients::SharedAi;
use server::config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env();

    if config.openai_api_key.is_none() {
        tracing::error!("OPENAI_API_KEY not found in environment - AI calls will fail until it is set");
    }
    tracing::info!(
        model = %config.chat_model,
        transcription_model = %config.transcription_model,
        speech_model = %config.speech_model,
        "AI service configured"
    );
    let ai: SharedAi = Arc::new(OpenAiClient::new(&config));

    let app = server::app(ai, &config);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
