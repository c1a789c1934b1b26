use std::error::Error as StdError;
use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use serde_json::Value;

use crate::error::{GenerationError, Result};

/// Status and body of a provider reply, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One blocking JSON POST per call. Implementations must not retry.
pub trait HttpTransport: Send + Sync {
    fn post_json(
        &self,
        provider: &'static str,
        url: &str,
        api_key: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<TransportResponse>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: HttpClient,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_json(
        &self,
        provider: &'static str,
        url: &str,
        api_key: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<TransportResponse> {
        let response = self
            .http
            .post(url)
            .query(&[("key", api_key)])
            .timeout(timeout)
            .json(payload)
            .send()
            .map_err(|err| transport_error(provider, url, api_key, timeout, err))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| GenerationError::Transport {
                provider,
                status: Some(status),
                message: redact(
                    &format!(
                        "response body read failed: {}",
                        error_chain_text(&err.without_url(), 512)
                    ),
                    api_key,
                ),
            })?;
        Ok(TransportResponse { status, body })
    }
}

/// Rejects non-2xx replies, keeping a truncated body for the message.
pub fn ensure_success(provider: &'static str, response: &TransportResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(GenerationError::Transport {
        provider,
        status: Some(response.status),
        message: truncate_text(&response.body, 512),
    })
}

/// Messages name the endpoint without its query string; the key never
/// appears in them.
fn transport_error(
    provider: &'static str,
    url: &str,
    api_key: &str,
    timeout: Duration,
    err: reqwest::Error,
) -> GenerationError {
    let endpoint = url.split('?').next().unwrap_or(url);
    let status = err.status().map(|status| status.as_u16());
    let message = if err.is_timeout() {
        format!("timed out after {}s ({endpoint})", timeout.as_secs_f64())
    } else {
        format!("{} ({endpoint})", error_chain_text(&err.without_url(), 512))
    };
    GenerationError::Transport {
        provider,
        status,
        message: redact(&message, api_key),
    }
}

fn redact(text: &str, api_key: &str) -> String {
    if api_key.is_empty() {
        return text.to_string();
    }
    text.replace(api_key, "[redacted]")
}

fn error_chain_text(err: &(dyn StdError + 'static), max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = Some(err);
    while let Some(cause) = current {
        let text = cause.to_string();
        let trimmed = text.trim();
        if !trimmed.is_empty()
            && parts
                .last()
                .map(|existing| existing != trimmed)
                .unwrap_or(true)
        {
            parts.push(trimmed.to_string());
        }
        current = cause.source();
    }
    truncate_text(&parts.join(" | caused by: "), max_chars)
}

pub(crate) fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
