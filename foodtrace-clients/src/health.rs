//! Connection health reporting for collaborators
//!
//! Each client exposes a cheap `ping`. [`probe`] times a ping and folds the
//! outcome into a [`ProbeResult`] that never carries an error outward, so
//! health reporting can't fail the caller.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Which collaborator a probe targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeTarget {
    /// LLM chat-completion engine
    Inference,
    /// Expiring key-value store
    Cache,
    /// Ingredient document API
    Backend,
}

impl std::fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeTarget::Inference => write!(f, "inference"),
            ProbeTarget::Cache => write!(f, "cache"),
            ProbeTarget::Backend => write!(f, "backend"),
        }
    }
}

/// Health status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Collaborator answered within the degraded threshold
    Healthy,
    /// Collaborator answered, but slowly
    Degraded,
    /// Collaborator unreachable or erroring
    Unhealthy,
}

impl HealthStatus {
    /// Check if status is healthy or degraded (operational)
    pub fn is_operational(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded)
    }
}

/// Probe tuning
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Upper bound on a single ping
    pub timeout: Duration,
    /// Response time above which a reachable collaborator counts as degraded
    pub degraded_threshold_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            degraded_threshold_ms: 1000,
        }
    }
}

/// Result of probing one collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub target: ProbeTarget,
    pub status: HealthStatus,
    pub response_time_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub error: Option<String>,
}

impl ProbeResult {
    pub(crate) fn healthy(
        target: ProbeTarget,
        response_time: Duration,
        degraded_threshold_ms: u64,
    ) -> Self {
        let response_time_ms = response_time.as_millis() as u64;
        let status = if response_time_ms > degraded_threshold_ms {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            target,
            status,
            response_time_ms,
            timestamp: Utc::now(),
            error: None,
        }
    }

    pub(crate) fn unhealthy(target: ProbeTarget, response_time: Duration, error: &str) -> Self {
        Self {
            target,
            status: HealthStatus::Unhealthy,
            response_time_ms: response_time.as_millis() as u64,
            timestamp: Utc::now(),
            error: Some(error.to_string()),
        }
    }

    /// Whether the collaborator answered at all
    pub fn is_connected(&self) -> bool {
        self.status.is_operational()
    }
}

/// Time a ping and classify the outcome.
pub async fn probe<F>(target: ProbeTarget, config: &ProbeConfig, ping: F) -> ProbeResult
where
    F: Future<Output = Result<()>>,
{
    let start = Instant::now();

    match tokio::time::timeout(config.timeout, ping).await {
        Ok(Ok(())) => {
            let elapsed = start.elapsed();
            debug!("{} probe passed ({}ms)", target, elapsed.as_millis());
            ProbeResult::healthy(target, elapsed, config.degraded_threshold_ms)
        }
        Ok(Err(e)) => {
            warn!("{} probe failed: {}", target, e);
            ProbeResult::unhealthy(target, start.elapsed(), &e.to_string())
        }
        Err(_) => {
            warn!("{} probe timed out after {:?}", target, config.timeout);
            ProbeResult::unhealthy(
                target,
                start.elapsed(),
                &format!("probe timed out after {}ms", config.timeout.as_millis()),
            )
        }
    }
}
