use crate::{
    config::Config,
    error::{AppError, Result},
};
use graphql_client::{QueryBody, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use url::Url;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Thin GraphQL-over-HTTP client for a single gateway endpoint.
///
/// Transport failures, non-2xx statuses and GraphQL `errors` are all surfaced as
/// `AppError` values. No retries happen at this layer.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl GraphQlClient {
    pub fn new(endpoint: &str, connect_timeout: Duration, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint.trim())
            .map_err(|e| AppError::Internal(format!("Invalid GraphQL URL: {}", e)))?;
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("GraphQL HTTP client init failed: {}", e)))?;

        Ok(Self { http, endpoint })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.graphql_url,
            Duration::from_secs(config.upstream_connect_timeout_secs),
            Duration::from_secs(config.upstream_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub async fn execute<V, D>(
        &self,
        operation_name: &'static str,
        query: &'static str,
        variables: V,
    ) -> Result<D>
    where
        V: Serialize,
        D: DeserializeOwned,
    {
        let body = QueryBody {
            variables,
            query,
            operation_name,
        };

        tracing::debug!("GraphQL {} -> {}", operation_name, self.endpoint);
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::Upstream(format!("{} request failed: {}", operation_name, e))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            AppError::Upstream(format!("{} response read failed: {}", operation_name, e))
        })?;

        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "{} returned HTTP {}: {}",
                operation_name,
                status,
                truncate(&text, MAX_ERROR_BODY_CHARS)
            )));
        }

        decode_response(operation_name, &text)
    }
}

fn decode_response<D: DeserializeOwned>(operation_name: &str, text: &str) -> Result<D> {
    let response: Response<D> = serde_json::from_str(text).map_err(|e| {
        AppError::Upstream(format!("{} response parse failed: {}", operation_name, e))
    })?;

    if let Some(errors) = response.errors {
        if !errors.is_empty() {
            return Err(AppError::GraphQL(format!(
                "{}: {}",
                operation_name,
                errors
                    .iter()
                    .map(|e| e.message.clone())
                    .collect::<Vec<_>>()
                    .join("; ")
            )));
        }
    }

    response
        .data
        .ok_or_else(|| AppError::Upstream(format!("{} returned no data", operation_name)))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}
