//! HTTP client for the ingredient document API

use crate::error::{ClientError, Result};
use crate::ingredients::model::{Envelope, IngredientRecord};
use crate::ingredients::IngredientSource;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, warn};

/// Default bound on a single document API request
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for `GET /ingredients` and `GET /ingredients/{batch}`
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl BackendClient {
    /// Create a client for the document API at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ClientError::Config(format!("invalid backend URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!("backend URL '{}' cannot be a base", base_url)));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, url: Url, context: &str) -> Result<reqwest::Response> {
        debug!("{}", context);
        self.http
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::from_http(e, self.timeout, context))
    }
}

#[async_trait]
impl IngredientSource for BackendClient {
    async fn list_all_ingredients(&self) -> Result<Vec<IngredientRecord>> {
        let context = "GET /ingredients";
        let response = self.get(self.endpoint(&["ingredients"]), context).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                context: context.to_string(),
            });
        }

        let envelope: Envelope<Option<Vec<JsonValue>>> = response
            .json()
            .await
            .map_err(|e| ClientError::from_http(e, self.timeout, context))?;

        let records = parse_records(envelope.data.unwrap_or_default());
        debug!("Fetched {} ingredient records", records.len());
        Ok(records)
    }

    async fn get_ingredient_by_batch(
        &self,
        batch_number: &str,
    ) -> Result<Option<IngredientRecord>> {
        let context = format!("GET /ingredients/{}", batch_number);
        let response = self
            .get(self.endpoint(&["ingredients", batch_number]), &context)
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("Batch {} not found", batch_number);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                context,
            });
        }

        let envelope: Envelope<Option<JsonValue>> = response
            .json()
            .await
            .map_err(|e| ClientError::from_http(e, self.timeout, &context))?;

        match envelope.data {
            None | Some(JsonValue::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", context, e))),
        }
    }

    async fn ping(&self) -> Result<()> {
        let context = "GET /ingredients";
        let response = self.get(self.endpoint(&["ingredients"]), context).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::Status {
                status: response.status().as_u16(),
                context: context.to_string(),
            })
        }
    }
}

/// Keep well-formed records, logging and dropping the rest.
fn parse_records(values: Vec<JsonValue>) -> Vec<IngredientRecord> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<IngredientRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed ingredient record at index {}: {}", index, e);
                None
            }
        })
        .collect()
}
