//! HTTP API gateway for Vitae.
//!
//! Exposes a health check and the v1 API (chat, transcription, synthesized
//! audio, passcode unlock). It stands in for the UI layer: history lives in
//! the client and is sent with every chat request.
//!
//! Built on Axum.

pub mod api_v1;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use tracing::info;

use vitae_agent::ConversationEngine;
use vitae_channels::{PushoverCredentials, PushoverNotifier};
use vitae_config::AppConfig;
use vitae_core::{NotificationSink, SpeechTranscriber};
use vitae_knowledge::{Ingestor, KnowledgeSources};
use vitae_providers::{ElevenLabsSynthesizer, OpenAiCompatProvider, OpenAiSpeech, http_client};
use vitae_voice::{VoiceAdapter, VoiceSelector};

pub use api_v1::{ApiV1State, SharedApiState};

/// Uploaded recordings can be large; 25 MB matches the transcription limit.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Build the full router: `/health` plus the v1 API under `/v1`.
pub fn build_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Wire every collaborator from configuration.
///
/// Knowledge ingestion runs here, once. Its failures only leave the
/// knowledge context partial.
pub async fn build_state(config: &AppConfig) -> Result<SharedApiState, Box<dyn std::error::Error>> {
    let api_key = config
        .openai
        .api_key
        .clone()
        .ok_or("OPENAI_API_KEY is required")?;
    let client = http_client(Duration::from_secs(config.agent.request_timeout_secs))?;

    let notifier: Arc<dyn NotificationSink> = Arc::new(PushoverNotifier::new(
        config
            .pushover
            .credentials()
            .map(|(token, user)| PushoverCredentials {
                token: token.to_string(),
                user: user.to_string(),
            }),
        client.clone(),
    ));
    let tools = Arc::new(vitae_tools::default_registry(notifier)?);

    let report = Ingestor::new(
        KnowledgeSources {
            profile_pdf_url: config.knowledge.profile_pdf_url.clone(),
            summary_url: config.knowledge.summary_url.clone(),
            scratch_dir: config.knowledge.scratch_dir.clone(),
        },
        client.clone(),
    )
    .ingest()
    .await;
    info!(profile = ?report.profile, summary = ?report.summary, "Knowledge ingestion finished");

    let provider = Arc::new(OpenAiCompatProvider::new(
        "openai",
        &config.openai.base_url,
        &api_key,
        client.clone(),
    ));
    let engine = ConversationEngine::new(
        provider,
        &config.openai.model,
        tools,
        Arc::new(report.context),
        &config.persona.name,
    )
    .with_max_tool_rounds(config.agent.max_tool_rounds)
    .with_temperature(config.agent.temperature);

    let speech = Arc::new(
        OpenAiSpeech::new(&config.openai.base_url, &api_key, client.clone())
            .with_tts_model(&config.voice.tts_model)
            .with_transcription_model(&config.voice.transcription_model),
    );
    let mut voice = VoiceAdapter::new(speech.clone(), &config.knowledge.scratch_dir)
        .with_timeout(Duration::from_secs(config.agent.request_timeout_secs))
        .with_max_artifacts(config.voice.max_audio_artifacts);
    if let (Some(key), Some(voice_id)) = (&config.voice.elevenlabs_api_key, &config.voice.elevenlabs_voice_id) {
        let eleven = ElevenLabsSynthesizer::new(key, &config.voice.elevenlabs_model, client.clone());
        voice = voice.with_custom_voice(Arc::new(eleven), voice_id);
    }
    let transcriber: Arc<dyn SpeechTranscriber> = speech;

    Ok(Arc::new(ApiV1State {
        engine: Arc::new(engine),
        voice: Arc::new(voice),
        transcriber,
        passcode: config.gateway.passcode.clone(),
        voice_enabled: config.voice.enabled,
        default_voice: config.voice.default_voice.parse::<VoiceSelector>()?,
    }))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.gateway.bind_addr();
    let state = build_state(&config).await?;
    let app = build_router(state);

    info!(addr = %addr, mode = ?config.gateway.deploy_mode, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_config(scratch: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.openai.api_key = Some("sk-test".into());
        // Nothing listens here, so no test reaches a real API.
        config.openai.base_url = "http://127.0.0.1:9/v1".into();
        config.knowledge.scratch_dir = scratch.to_path_buf();
        config
    }

    #[tokio::test]
    async fn health_endpoint() {
        let scratch = tempfile::tempdir().unwrap();
        let state = build_state(&test_config(scratch.path())).await.unwrap();
        let app = build_router(state);

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn v1_is_nested_and_guarded() {
        let scratch = tempfile::tempdir().unwrap();
        let mut config = test_config(scratch.path());
        config.gateway.passcode = Some("sesame".into());
        let app = build_router(build_state(&config).await.unwrap());

        let req = Request::builder().uri("/v1/session").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn build_state_rejects_unknown_default_voice() {
        let scratch = tempfile::tempdir().unwrap();
        let mut config = test_config(scratch.path());
        config.voice.default_voice = "baritone".into();

        assert!(build_state(&config).await.is_err());
    }

    #[tokio::test]
    async fn build_state_requires_api_key() {
        let scratch = tempfile::tempdir().unwrap();
        let mut config = test_config(scratch.path());
        config.openai.api_key = None;

        assert!(build_state(&config).await.is_err());
    }
}
