use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use clipforge::config::Config;
use clipforge::domain::clips::{ClipStore, InMemoryClipStore};
use clipforge::domain::videos::InMemoryVideoStore;
use clipforge::domain::settings::JsonFileSettingsStore;
use clipforge::services::automation::{AutomationDeps, AutomationEngine, SystemClock};
use clipforge::services::pipeline::ClipPipeline;
use clipforge::services::platforms::{PlatformPoster, PlatformRegistry, SimulatedPoster, WebhookPoster};
use clipforge::services::transcript::{HttpTranscriptSource, SampleTranscriptSource, TranscriptSource};
use clipforge::{AppState, build_app, logging};

fn build_platforms(config: &Config) -> PlatformRegistry {
    config
        .platforms
        .iter()
        .fold(PlatformRegistry::new(), |registry, name| {
            let poster: Arc<dyn PlatformPoster> = match &config.platform_webhook_url {
                Some(url) => Arc::new(WebhookPoster::new(name, url)),
                None => Arc::new(SimulatedPoster::new(name, config.platform_success_rate)),
            };
            registry.with(poster)
        })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::from_env()?;

    let clips: Arc<dyn ClipStore> = Arc::new(InMemoryClipStore::new());

    let transcripts: Arc<dyn TranscriptSource> = match &config.transcript_service_url {
        Some(url) => Arc::new(HttpTranscriptSource::new(url)),
        None => Arc::new(SampleTranscriptSource),
    };

    let automation = AutomationEngine::open(AutomationDeps {
        clips: clips.clone(),
        platforms: build_platforms(&config),
        settings_store: Arc::new(JsonFileSettingsStore::new(&config.settings_path)),
        clock: Arc::new(SystemClock),
        tick_every: Duration::from_secs(config.scheduler_tick_secs),
        ledger_retention: config.ledger_retention,
    })
    .await
    .with_context(|| format!("Failed to load settings from {}", config.settings_path.display()))?;

    let state = Arc::new(AppState {
        pipeline: ClipPipeline::new(),
        clips,
        videos: Arc::new(InMemoryVideoStore::new()),
        transcripts,
        automation: automation.clone(),
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(
        platforms = ?config.platforms,
        "Listening on http://{}", addr
    );

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    automation.close().await;
    Ok(())
}
