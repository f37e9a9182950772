//! Configuration loading, validation, and management for Vitae.
//!
//! Loads an optional TOML file, then applies environment variable overrides
//! (the way the process is configured when deployed). Only the completion
//! credential is mandatory; every other integration degrades when absent.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "VITAE_CONFIG";

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Who the assistant speaks as
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Chat completion backend
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Notification side channel
    #[serde(default)]
    pub pushover: PushoverConfig,

    /// Startup knowledge ingestion
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Speech synthesis and transcription
    #[serde(default)]
    pub voice: VoiceConfig,

    /// HTTP gateway
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Turn loop limits
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "default_persona_name")]
    pub name: String,
}

fn default_persona_name() -> String {
    "Ibe Nwandu".into()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_model(),
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct PushoverConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl PushoverConfig {
    /// `(token, user)` when both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.token, &self.user) {
            (Some(token), Some(user)) => Some((token.as_str(), user.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for PushoverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushoverConfig")
            .field("token", &redact(&self.token))
            .field("user", &redact(&self.user))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// URL of the profile PDF (LinkedIn export)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pdf_url: Option<String>,

    /// URL of the plain-text summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_url: Option<String>,

    /// Where downloads and synthesized audio are written
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from(".vitae-scratch")
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            profile_pdf_url: None,
            summary_url: None,
            scratch_dir: default_scratch_dir(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Whether responses get synthesized audio by default
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_voice")]
    pub default_voice: String,

    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,

    /// Credential for the custom (cloned) voice provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevenlabs_api_key: Option<String>,

    /// The cloned voice's identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevenlabs_voice_id: Option<String>,

    #[serde(default = "default_elevenlabs_model")]
    pub elevenlabs_model: String,

    /// Synthesized replies kept in the scratch directory; older ones are removed
    #[serde(default = "default_max_audio_artifacts")]
    pub max_audio_artifacts: usize,
}

fn default_true() -> bool {
    true
}
fn default_voice() -> String {
    "alloy".into()
}
fn default_tts_model() -> String {
    "tts-1".into()
}
fn default_transcription_model() -> String {
    "whisper-1".into()
}
fn default_elevenlabs_model() -> String {
    "eleven_multilingual_v2".into()
}
fn default_max_audio_artifacts() -> usize {
    32
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_voice: default_voice(),
            tts_model: default_tts_model(),
            transcription_model: default_transcription_model(),
            elevenlabs_api_key: None,
            elevenlabs_voice_id: None,
            elevenlabs_model: default_elevenlabs_model(),
            max_audio_artifacts: default_max_audio_artifacts(),
        }
    }
}

impl std::fmt::Debug for VoiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceConfig")
            .field("enabled", &self.enabled)
            .field("default_voice", &self.default_voice)
            .field("tts_model", &self.tts_model)
            .field("transcription_model", &self.transcription_model)
            .field("elevenlabs_api_key", &redact(&self.elevenlabs_api_key))
            .field("elevenlabs_voice_id", &self.elevenlabs_voice_id)
            .field("elevenlabs_model", &self.elevenlabs_model)
            .field("max_audio_artifacts", &self.max_audio_artifacts)
            .finish()
    }
}

/// Where the process runs; decides the default bind address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    /// Developer machine: loopback only
    #[default]
    Local,
    /// Hosted: listen on all interfaces
    Production,
}

impl DeployMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" | "dev" | "development" => Some(Self::Local),
            "production" | "prod" | "render" => Some(Self::Production),
            _ => None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Explicit bind host; derived from `deploy_mode` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default)]
    pub deploy_mode: DeployMode,

    /// Access passcode for the /v1 API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passcode: Option<String>,
}

fn default_port() -> u16 {
    10000
}

impl GatewayConfig {
    pub fn bind_host(&self) -> &str {
        match (&self.host, self.deploy_mode) {
            (Some(host), _) => host.as_str(),
            (None, DeployMode::Local) => "127.0.0.1",
            (None, DeployMode::Production) => "0.0.0.0",
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host(), self.port)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: None,
            deploy_mode: DeployMode::Local,
            passcode: None,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("port", &self.port)
            .field("host", &self.host)
            .field("deploy_mode", &self.deploy_mode)
            .field("passcode", &redact(&self.passcode))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Tool-dispatch rounds allowed per turn
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Per external call timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

fn default_max_tool_rounds() -> u32 {
    8
}
fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
            request_timeout_secs: default_request_timeout_secs(),
            temperature: None,
        }
    }
}

impl AppConfig {
    /// Load configuration: optional file, then process environment, then validate.
    ///
    /// The file path comes from the argument or `VITAE_CONFIG`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        let mut config = match path.or(env_path.as_deref()) {
            Some(path) => Self::load_from(path)?,
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply environment overrides through `lookup` (empty values are ignored).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("OPENAI_API_KEY") {
            self.openai.api_key = Some(v);
        }
        if let Some(v) = get("OPENAI_BASE_URL") {
            self.openai.base_url = v;
        }
        if let Some(v) = get("VITAE_MODEL") {
            self.openai.model = v;
        }
        if let Some(v) = get("PUSHOVER_TOKEN") {
            self.pushover.token = Some(v);
        }
        if let Some(v) = get("PUSHOVER_USER") {
            self.pushover.user = Some(v);
        }
        if let Some(v) = get("LINKEDIN_PDF_URL") {
            self.knowledge.profile_pdf_url = Some(v);
        }
        if let Some(v) = get("SUMMARY_TXT_URL") {
            self.knowledge.summary_url = Some(v);
        }
        if let Some(v) = get("VITAE_SCRATCH_DIR") {
            self.knowledge.scratch_dir = PathBuf::from(v);
        }
        if let Some(v) = get("PERSONA_NAME") {
            self.persona.name = v;
        }
        if let Some(v) = get("CHATBOT_PASSCODE") {
            self.gateway.passcode = Some(v);
        }
        if let Some(v) = get("PORT") {
            self.gateway.port = parse_number("PORT", &v)?;
        }
        if let Some(v) = get("DEPLOY_MODE") {
            self.gateway.deploy_mode = DeployMode::parse(&v).ok_or(ConfigError::InvalidValue {
                var: "DEPLOY_MODE".into(),
                value: v,
            })?;
        }
        if let Some(v) = get("ELEVENLABS_API_KEY") {
            self.voice.elevenlabs_api_key = Some(v);
        }
        if let Some(v) = get("ELEVENLABS_VOICE_ID") {
            self.voice.elevenlabs_voice_id = Some(v);
        }
        if let Some(v) = get("VITAE_MAX_TOOL_ROUNDS") {
            self.agent.max_tool_rounds = parse_number("VITAE_MAX_TOOL_ROUNDS", &v)?;
        }
        if let Some(v) = get("VITAE_REQUEST_TIMEOUT_SECS") {
            self.agent.request_timeout_secs = parse_number("VITAE_REQUEST_TIMEOUT_SECS", &v)?;
        }

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai.api_key.is_none() {
            return Err(ConfigError::Incomplete("OPENAI_API_KEY".into()));
        }

        if self.agent.max_tool_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_tool_rounds must be at least 1".into(),
            ));
        }

        if self.agent.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "agent.request_timeout_secs must be at least 1".into(),
            ));
        }

        if self.voice.max_audio_artifacts == 0 {
            return Err(ConfigError::ValidationError(
                "voice.max_audio_artifacts must be at least 1".into(),
            ));
        }

        if self.gateway.port == 0 {
            return Err(ConfigError::ValidationError("gateway.port must be non-zero".into()));
        }

        if let Some(t) = self.agent.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(
                    "agent.temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }

        Ok(())
    }

    /// Log which optional integrations are off.
    pub fn log_degraded_features(&self) {
        if self.pushover.credentials().is_none() {
            tracing::info!("Pushover credentials not set, notifications will be skipped");
        }
        if self.knowledge.profile_pdf_url.is_none() {
            tracing::info!("LINKEDIN_PDF_URL not set, skipping profile PDF download");
        }
        if self.knowledge.summary_url.is_none() {
            tracing::info!("SUMMARY_TXT_URL not set, skipping summary text download");
        }
        if self.voice.elevenlabs_api_key.is_none() || self.voice.elevenlabs_voice_id.is_none() {
            tracing::info!("Custom voice not configured, the default voice will be used");
        }
        if self.gateway.passcode.is_none() {
            tracing::info!("CHATBOT_PASSCODE not set, the API is open");
        }
    }
}

fn parse_number<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var: var.into(),
        value: value.into(),
    })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration incomplete: {0} is required")]
    Incomplete(String),

    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.gateway.port, 10000);
        assert_eq!(config.gateway.bind_host(), "127.0.0.1");
        assert_eq!(config.voice.default_voice, "alloy");
        assert_eq!(config.agent.max_tool_rounds, 8);
    }

    #[test]
    fn missing_api_key_is_incomplete() {
        let err = AppConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Incomplete(ref var) if var == "OPENAI_API_KEY"));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("PUSHOVER_TOKEN", "tok"),
                ("PUSHOVER_USER", "usr"),
                ("PORT", "8080"),
                ("DEPLOY_MODE", "production"),
                ("CHATBOT_PASSCODE", "letmein"),
                ("VITAE_MAX_TOOL_ROUNDS", "3"),
            ]))
            .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.pushover.credentials(), Some(("tok", "usr")));
        assert_eq!(config.gateway.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.gateway.passcode.as_deref(), Some("letmein"));
        assert_eq!(config.agent.max_tool_rounds, 3);
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("PUSHOVER_TOKEN", "  ")])).unwrap();
        assert!(config.pushover.token.is_none());
    }

    #[test]
    fn half_configured_pushover_has_no_credentials() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("PUSHOVER_TOKEN", "tok")])).unwrap();
        assert!(config.pushover.credentials().is_none());
    }

    #[test]
    fn invalid_port_rejected() {
        let mut config = AppConfig::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "PORT"));
    }

    #[test]
    fn invalid_deploy_mode_rejected() {
        let mut config = AppConfig::default();
        assert!(config.apply_env(env(&[("DEPLOY_MODE", "moon")])).is_err());
    }

    #[test]
    fn zero_rounds_rejected() {
        let mut config = AppConfig::default();
        config.openai.api_key = Some("sk".into());
        config.agent.max_tool_rounds = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn zero_audio_artifacts_rejected() {
        let mut config = AppConfig::default();
        config.openai.api_key = Some("sk".into());
        assert_eq!(config.voice.max_audio_artifacts, 32);
        config.voice.max_audio_artifacts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = AppConfig::default();
        config.openai.api_key = Some("sk-very-secret".into());
        config.gateway.passcode = Some("hunter2".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/vitae.toml")).unwrap();
        assert_eq!(config.persona.name, "Ibe Nwandu");
    }

    #[test]
    fn config_file_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vitae.toml");
        std::fs::write(
            &path,
            r#"
[persona]
name = "Ada Lovelace"

[openai]
api_key = "sk-file"
model = "gpt-4o"

[gateway]
port = 9000
deploy_mode = "production"

[agent]
max_tool_rounds = 4
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.persona.name, "Ada Lovelace");
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.gateway.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.agent.max_tool_rounds, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.openai.model, config.openai.model);
    }
}
