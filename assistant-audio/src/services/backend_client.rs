//! Analysis backend client
//!
//! The backend performs the signal analysis. One GET request per track,
//! addressed by the track's path relative to the collection root:
//!
//! `GET <base>/track/<escaped relative path>` → `{"bpm": 128, "initial_key": "5A"}`
//!
//! Failures answer with a non-2xx status and an optional
//! `{"command": "...", "message": "..."}` payload. No retry is attempted
//! here; a failure is terminal for the track.

use crate::error::{BackendError, BackendErrorKind, SetupError};
use crate::models::AudioData;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const USER_AGENT: &str = concat!("assistant-audio/", env!("CARGO_PKG_VERSION"));

/// Upper bound for one analysis request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Computes tempo and key for a track
#[async_trait]
pub trait AudioAnalyzer: Send + Sync {
    async fn compute_audio_data(&self, relative_path: &Path) -> Result<AudioData, BackendError>;
}

/// Error payload returned by the backend
#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    command: Option<String>,
    message: Option<String>,
}

/// HTTP client for the analysis backend
pub struct BackendClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SetupError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SetupError::Backend(format!("Invalid backend URL {}: {}", base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(SetupError::Backend(format!(
                "Backend URL {} cannot carry a path",
                base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SetupError::Backend(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// URL of the analysis resource for a track
    ///
    /// The whole relative path becomes a single escaped path segment.
    pub fn track_url(&self, relative_path: &Path) -> Result<Url, BackendError> {
        let relative = relative_path.to_string_lossy();
        let relative = relative.trim_start_matches(['/', '\\']);

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BackendError::new(
                    BackendErrorKind::Transport,
                    format!("Backend URL {} cannot carry a path", self.base_url),
                    BackendError::FALLBACK_CODE,
                )
            })?
            .pop_if_empty()
            .push("track")
            .push(relative);

        Ok(url)
    }
}

#[async_trait]
impl AudioAnalyzer for BackendClient {
    async fn compute_audio_data(&self, relative_path: &Path) -> Result<AudioData, BackendError> {
        let url = self.track_url(relative_path)?;

        tracing::debug!(url = %url, "Requesting audio data from backend");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| BackendError::from_transport(&e))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(service_error(status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::from_transport(&e))?;

        let audio_data: AudioData = serde_json::from_str(&body).map_err(|e| {
            BackendError::new(
                BackendErrorKind::InvalidResponse,
                format!("Invalid audio data payload: {}", e),
                status.as_u16(),
            )
        })?;

        tracing::debug!(
            bpm = %audio_data.bpm,
            initial_key = %audio_data.initial_key,
            "Backend audio data received"
        );

        Ok(audio_data)
    }
}

/// Build the error for a non-2xx answer
///
/// Message is `"<command>: <message>"` from the payload, either part
/// optional, falling back to the HTTP status line.
fn service_error(status: StatusCode, body: &str) -> BackendError {
    let payload: ErrorPayload = serde_json::from_str(body).unwrap_or_default();

    let mut message = String::new();
    if let Some(command) = payload.command {
        message.push_str(&command);
        message.push_str(": ");
    }
    if let Some(text) = payload.message {
        message.push_str(&text);
    }

    if message.is_empty() {
        message = format!("HTTP {}", status);
    }

    BackendError::new(BackendErrorKind::Service, message, status.as_u16())
}
