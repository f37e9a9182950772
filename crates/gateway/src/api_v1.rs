//! HTTP API v1: the request/response surface a chat UI talks to.
//!
//! Endpoints:
//!
//! - `POST /v1/unlock`       : check the access passcode
//! - `GET  /v1/session`      : persona, today's date, voice catalogue
//! - `POST /v1/chat`         : resolve one turn, optionally with audio
//! - `POST /v1/transcribe`   : recorded audio in, transcript out
//! - `GET  /v1/audio/{id}`   : a synthesized reply

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use vitae_agent::{ConversationEngine, format_prompt_date};
use vitae_core::{Error, HistoryTurn, SpeechTranscriber};
use vitae_voice::{VoiceAdapter, VoiceSelector};

/// Header carrying the access passcode.
pub const ACCESS_CODE_HEADER: &str = "X-Access-Code";

pub const WRONG_PASSCODE_MESSAGE: &str = "Wrong password. Try again.";
pub const TRANSCRIPTION_FAILED_MESSAGE: &str = "Could not transcribe audio. Please try again.";

// ── State ─────────────────────────────────────────────────────────────────

/// Shared state for the v1 API.
pub struct ApiV1State {
    pub engine: Arc<ConversationEngine>,
    pub voice: Arc<VoiceAdapter>,
    pub transcriber: Arc<dyn SpeechTranscriber>,
    /// When set, every route but `/unlock` requires it.
    pub passcode: Option<String>,
    /// Default for requests that omit `voice_enabled`.
    pub voice_enabled: bool,
    pub default_voice: VoiceSelector,
}

pub type SharedApiState = Arc<ApiV1State>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    let protected = Router::new()
        .route("/session", get(session_handler))
        .route("/chat", post(chat_handler))
        .route("/transcribe", post(transcribe_handler))
        .route("/audio/{id}", get(audio_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), passcode_middleware));

    Router::new()
        .route("/unlock", post(unlock_handler))
        .merge(protected)
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub passcode: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnlockResponse {
    pub unlocked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub persona: String,
    pub today: String,
    pub voices: Vec<VoiceSelector>,
    pub default_voice: VoiceSelector,
    pub voice_enabled: bool,
    pub custom_voice_available: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
    #[serde(default)]
    pub voice_enabled: Option<bool>,
    #[serde(default)]
    pub voice: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub history: Vec<HistoryTurn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioRef>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AudioRef {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub transcript: String,
}

// ── Middleware ────────────────────────────────────────────────────────────

/// Require the passcode header when a passcode is configured.
async fn passcode_middleware(
    State(state): State<SharedApiState>,
    req: axum::extract::Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.passcode.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(ACCESS_CODE_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided.is_some_and(|p| passcode_matches(expected, p)) {
        Ok(next.run(req).await)
    } else {
        warn!(path = %req.uri().path(), "Rejected request without a valid access code");
        Err(api_error(StatusCode::UNAUTHORIZED, WRONG_PASSCODE_MESSAGE))
    }
}

/// Surrounding whitespace is ignored on both sides.
fn passcode_matches(expected: &str, provided: &str) -> bool {
    provided.trim() == expected.trim()
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn unlock_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<UnlockRequest>,
) -> Result<Json<UnlockResponse>, ApiError> {
    match state.passcode.as_deref() {
        Some(expected) if !passcode_matches(expected, &payload.passcode) => {
            info!("Unlock attempt with wrong passcode");
            Err(api_error(StatusCode::UNAUTHORIZED, WRONG_PASSCODE_MESSAGE))
        }
        _ => Ok(Json(UnlockResponse { unlocked: true })),
    }
}

async fn session_handler(State(state): State<SharedApiState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        persona: state.engine.persona_name().to_string(),
        today: format_prompt_date(chrono::Local::now().date_naive()),
        voices: VoiceSelector::ALL.to_vec(),
        default_voice: state.default_voice,
        voice_enabled: state.voice_enabled,
        custom_voice_available: state.voice.custom_available(),
    })
}

async fn chat_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let voice = match payload.voice.as_deref() {
        Some(raw) => raw
            .parse::<VoiceSelector>()
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?,
        None => state.default_voice,
    };
    let voice_enabled = payload.voice_enabled.unwrap_or(state.voice_enabled);
    let mut history = payload.history;

    if payload.message.trim().is_empty() {
        return Ok(Json(ChatResponse {
            reply: String::new(),
            history,
            audio: None,
        }));
    }

    info!(history_turns = history.len(), voice = %voice, voice_enabled, "v1/chat request");

    let turn = state
        .engine
        .resolve(&payload.message, &history)
        .await
        .map_err(turn_error)?;

    let audio = if voice_enabled {
        state
            .voice
            .synthesize(&turn.reply, voice)
            .await
            .map(|artifact| AudioRef {
                url: format!("/v1/audio/{}", artifact.id),
                id: artifact.id,
            })
    } else {
        None
    };

    history.push(HistoryTurn::new(payload.message, turn.reply.clone()));

    Ok(Json(ChatResponse {
        reply: turn.reply,
        history,
        audio,
    }))
}

fn turn_error(e: Error) -> ApiError {
    error!(error = %e, "Turn failed");
    let status = match &e {
        Error::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, e.to_string())
}

async fn transcribe_handler(
    State(state): State<SharedApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TranscribeResponse>, ApiError> {
    if body.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No audio provided"));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let file_name = upload_file_name(content_type);

    match state.transcriber.transcribe(body.to_vec(), file_name).await {
        Ok(transcript) => Ok(Json(TranscribeResponse { transcript })),
        Err(e) => {
            warn!(error = %e, "Transcription failed");
            Err(api_error(StatusCode::BAD_GATEWAY, TRANSCRIPTION_FAILED_MESSAGE))
        }
    }
}

/// Pick an upload name whose extension matches the container.
fn upload_file_name(content_type: &str) -> &'static str {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    match essence {
        "audio/webm" => "recording.webm",
        "audio/ogg" => "recording.ogg",
        "audio/mpeg" | "audio/mp3" => "recording.mp3",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "recording.m4a",
        "audio/flac" => "recording.flac",
        _ => "recording.wav",
    }
}

async fn audio_handler(State(state): State<SharedApiState>, Path(id): Path<String>) -> Response {
    match state.voice.read_artifact(&id).await {
        Some(bytes) => ([(header::CONTENT_TYPE, "audio/mpeg")], bytes).into_response(),
        None => api_error(StatusCode::NOT_FOUND, format!("Audio '{id}' not found")).into_response(),
    }
}
