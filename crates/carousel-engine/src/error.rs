//! Error types for image generation.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of a single generation call.
///
/// Every variant is fatal for the call that raised it; the batch loop stops
/// at the first one.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Missing API key or an out-of-range batch setting. Raised before any
    /// network traffic.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The provider answered but the response held no usable image.
    #[error("{provider} returned no image{}", diagnostic_suffix(.body.as_deref()))]
    MissingImage {
        provider: &'static str,
        /// Full raw response body, when the response shape allows it.
        body: Option<String>,
    },

    /// Image bytes were present but could not be decoded.
    #[error("image decode failed: {0}")]
    ImageDecode(String),

    /// An in-memory image could not be encoded for upload.
    #[error("image encode failed: {0}")]
    Encode(String),

    /// Non-2xx status, timeout or connection failure. Not retried.
    #[error("{provider} request failed{}: {message}", status_suffix(.status))]
    Transport {
        provider: &'static str,
        status: Option<u16>,
        message: String,
    },

    /// A 2xx response whose body could not be parsed.
    #[error("{provider} returned a malformed response: {detail}")]
    MalformedResponse {
        provider: &'static str,
        detail: String,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("i/o error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("event log write failed: {0:#}")]
    Events(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GenerationError>;

fn diagnostic_suffix(body: Option<&str>) -> String {
    body.map(|body| format!(":\n{body}")).unwrap_or_default()
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" ({code})")).unwrap_or_default()
}
