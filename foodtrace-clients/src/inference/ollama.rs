//! Ollama HTTP client
//!
//! Uses three endpoints:
//! - `GET /api/tags` to list resident models
//! - `POST /api/pull` (streamed NDJSON progress) to fetch a missing model
//! - `POST /api/chat` (non-streamed) to generate replies

use crate::error::{ClientError, Result};
use crate::inference::{build_messages, ChatBackend, ChatMessage};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default bound on a single generation request
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(120);

/// Bound on listing models, which doubles as the reachability check
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Model pulls download gigabytes; they get their own bound
const PULL_TIMEOUT: Duration = Duration::from_secs(3600);

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

/// One NDJSON line of pull progress
#[derive(Debug, Deserialize)]
struct PullProgress {
    #[serde(default)]
    status: String,
    completed: Option<u64>,
    total: Option<u64>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    message: Option<ReplyMessage>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for one Ollama endpoint serving one configured model
#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
    probe_timeout: Duration,
}

impl OllamaClient {
    /// Create a client for `model` on the engine at `base_url`
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "inference URL must be http(s), got '{}'",
                base_url
            )));
        }
        if model.trim().is_empty() {
            return Err(ClientError::Config("model id cannot be empty".to_string()));
        }

        // Per-request timeouts: listing, generation and pulls need different bounds
        let http = reqwest::Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
            probe_timeout: DEFAULT_PROBE_TIMEOUT.min(timeout),
        })
    }

    /// Override the bound on `GET /api/tags`
    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Names of the models the engine currently holds
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let context = "GET /api/tags";
        let response = self
            .http
            .get(self.url("/api/tags"))
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| ClientError::from_http(e, self.probe_timeout, context))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                context: context.to_string(),
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ClientError::from_http(e, self.probe_timeout, context))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Fetch the configured model, following the streamed progress until the
    /// engine reports success.
    pub async fn pull_model(&self) -> Result<()> {
        let context = "POST /api/pull";
        let response = self
            .http
            .post(self.url("/api/pull"))
            .json(&PullRequest {
                model: &self.model,
                stream: true,
            })
            .timeout(PULL_TIMEOUT)
            .send()
            .await
            .map_err(|e| ClientError::from_http(e, PULL_TIMEOUT, context))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                context: context.to_string(),
            });
        }

        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut tracker = PullTracker::default();

        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| ClientError::from_http(e, PULL_TIMEOUT, context))?;
            buffer.extend_from_slice(&chunk);

            for line in drain_lines(&mut buffer) {
                tracker.observe(&line)?;
            }
        }

        // Final line may lack a trailing newline
        let rest = String::from_utf8_lossy(&buffer).trim().to_string();
        if !rest.is_empty() {
            tracker.observe(&rest)?;
        }

        if tracker.succeeded {
            Ok(())
        } else {
            Err(ClientError::InvalidResponse(format!(
                "{}: progress stream ended without success (last status '{}')",
                context, tracker.last_status
            )))
        }
    }
}

/// Whether `model` is among `available`. An untagged id also matches its
/// `:latest` tag.
fn has_model(available: &[String], model: &str) -> bool {
    available.iter().any(|name| {
        name == model || (!model.contains(':') && name.strip_suffix(":latest") == Some(model))
    })
}

/// Split complete lines off the front of `buffer`, leaving any partial line.
fn drain_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        let text = String::from_utf8_lossy(&line).trim().to_string();
        if !text.is_empty() {
            lines.push(text);
        }
    }
    lines
}

#[derive(Debug, Default)]
struct PullTracker {
    last_status: String,
    succeeded: bool,
}

impl PullTracker {
    fn observe(&mut self, line: &str) -> Result<()> {
        let progress: PullProgress = match serde_json::from_str(line) {
            Ok(progress) => progress,
            Err(e) => {
                warn!("Ignoring unreadable pull progress line: {}", e);
                return Ok(());
            }
        };

        if let Some(err) = progress.error {
            return Err(ClientError::Engine(err));
        }

        match (progress.completed, progress.total) {
            (Some(completed), Some(total)) if total > 0 => {
                debug!(
                    "Pull progress: {} {:.1}%",
                    progress.status,
                    completed as f64 * 100.0 / total as f64
                );
            }
            _ => {}
        }

        if progress.status != self.last_status {
            info!("Pull status: {}", progress.status);
            self.last_status = progress.status;
        }
        if self.last_status == "success" {
            self.succeeded = true;
        }
        Ok(())
    }
}

#[async_trait]
impl ChatBackend for OllamaClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn ping(&self) -> Result<()> {
        self.list_models().await.map(|_| ())
    }

    async fn ensure_model_available(&self) -> bool {
        let models = match self.list_models().await {
            Ok(models) => models,
            Err(e) => {
                warn!("Could not list models: {}", e);
                return false;
            }
        };

        if has_model(&models, &self.model) {
            info!("Model {} already available", self.model);
            return true;
        }

        info!("Model {} not found, pulling...", self.model);
        match self.pull_model().await {
            Ok(()) => {
                info!("Model {} pulled successfully", self.model);
                true
            }
            Err(e) => {
                error!("Failed to pull model {}: {}", self.model, e);
                false
            }
        }
    }

    async fn generate_response(
        &self,
        user_message: &str,
        system_prompt: Option<&str>,
        history: &[ChatMessage],
        temperature: f32,
    ) -> Result<String> {
        let context = "POST /api/chat";
        let messages = build_messages(user_message, system_prompt, history);
        debug!("Sending {} messages to {}", messages.len(), self.model);

        let response = self
            .http
            .post(self.url("/api/chat"))
            .json(&ChatRequestBody {
                model: &self.model,
                messages: &messages,
                stream: false,
                options: ChatOptions { temperature },
            })
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ClientError::from_http(e, self.timeout, context))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::from_http(e, self.timeout, context))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ClientError::Status {
                status: status.as_u16(),
                context: format!("{}: {}", context, detail),
            });
        }

        let parsed: ChatResponseBody = serde_json::from_str(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", context, e)))?;

        if let Some(err) = parsed.error {
            return Err(ClientError::Engine(err));
        }

        parsed
            .message
            .map(|m| m.content)
            .ok_or_else(|| ClientError::InvalidResponse(format!("{}: missing message", context)))
    }
}
