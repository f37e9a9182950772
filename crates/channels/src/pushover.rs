//! Pushover notifier.
//!
//! Sends a form POST with `token`, `user` and `message`. A 200 status is
//! success; anything else is logged. Nothing is ever returned to the caller.

use async_trait::async_trait;
use tracing::{debug, info, warn};
use vitae_core::NotificationSink;

/// Default Pushover messages endpoint.
pub const PUSHOVER_ENDPOINT: &str = "https://api.pushover.net/1/messages.json";

/// Application token and user key.
#[derive(Clone)]
pub struct PushoverCredentials {
    pub token: String,
    pub user: String,
}

impl std::fmt::Debug for PushoverCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushoverCredentials")
            .field("token", &"[REDACTED]")
            .field("user", &"[REDACTED]")
            .finish()
    }
}

/// Pushover-backed [`NotificationSink`].
pub struct PushoverNotifier {
    endpoint: String,
    credentials: Option<PushoverCredentials>,
    client: reqwest::Client,
}

impl PushoverNotifier {
    /// `credentials = None` turns every `notify` into a logged no-op.
    pub fn new(credentials: Option<PushoverCredentials>, client: reqwest::Client) -> Self {
        Self {
            endpoint: PUSHOVER_ENDPOINT.into(),
            credentials,
            client,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

#[async_trait]
impl NotificationSink for PushoverNotifier {
    async fn notify(&self, text: &str) {
        let Some(credentials) = &self.credentials else {
            debug!("Pushover credentials missing, skipping notification");
            return;
        };

        let form = [
            ("token", credentials.token.as_str()),
            ("user", credentials.user.as_str()),
            ("message", text),
        ];

        match self.client.post(&self.endpoint).form(&form).send().await {
            Ok(response) if response.status().as_u16() == 200 => {
                info!("Pushover notification sent");
            }
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                warn!(status, body = %body, "Pushover rejected notification");
            }
            Err(e) => {
                warn!(error = %e, timeout = e.is_timeout(), "Pushover notification failed");
            }
        }
    }
}
