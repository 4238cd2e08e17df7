use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tts_gateway::domain::tts::TtsService;
use tts_gateway::infrastructure::config::{Config, LogFormat};
use tts_gateway::infrastructure::http::start_http_server;
use tts_gateway::infrastructure::model::HttpSpeechModel;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting TTS gateway on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(
        model_server = %config.model_server_url,
        max_workers = config.max_workers,
        fast_mode = config.fast_mode,
        default_chunk_words = config.default_chunk_words(),
        min_chunk_words = config.min_chunk_words,
        long_text_threshold = config.long_text_word_threshold,
        cache_enabled = config.tts_cache_enabled,
        development = config.is_development(),
        "Synthesis settings loaded"
    );

    // Model client; the connection itself is exercised during initialization
    let model = HttpSpeechModel::new(
        config.model_server_url.clone(),
        Duration::from_secs(config.model_timeout_secs),
    )?;

    let config = Arc::new(config);
    let tts_service = Arc::new(TtsService::new(config.tts_settings()));

    // Serve right away; synthesis answers 503 until the model is installed
    let initializer = tts_service.clone();
    tokio::spawn(async move {
        initializer.initialize(Box::new(model)).await;
    });

    start_http_server(config, tts_service).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tts_gateway=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
