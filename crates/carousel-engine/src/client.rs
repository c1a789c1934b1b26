//! Structured client calling convention.
//!
//! Callers hand over an ordered list of typed content items (text and decoded
//! images) plus a typed config; the client owns the wire encoding and returns
//! the reply as typed parts.

use std::path::{Path, PathBuf};

use carousel_contracts::models::{AspectRatio, ImageModel};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::GeneratorConfig;
use crate::error::{GenerationError, Result};
use crate::imaging::{decode_base64_image, encode_png_base64, write_png};
use crate::request::GenerationRequest;
use crate::transport::{ensure_success, HttpTransport};

pub const PROVIDER: &str = "gemini-client";

#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Text(String),
    Image(DynamicImage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    Text,
    Image,
}

/// Image knobs for models without a resolution setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageConfig {
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateContentConfig {
    pub response_modalities: Vec<Modality>,
    pub image_config: ImageConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientCall {
    pub model: ImageModel,
    pub contents: Vec<ContentItem>,
    pub config: GenerateContentConfig,
}

/// Content list is brand prompt, content prompt, logo. No base64 step here.
pub fn build_call(request: &GenerationRequest) -> ClientCall {
    ClientCall {
        model: request.model(),
        contents: vec![
            ContentItem::Text(request.brand_prompt().to_string()),
            ContentItem::Text(request.content_prompt().to_string()),
            ContentItem::Image(request.logo().image().clone()),
        ],
        config: GenerateContentConfig {
            response_modalities: vec![Modality::Image],
            image_config: ImageConfig {
                aspect_ratio: request.aspect_ratio(),
            },
        },
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Blob {
    #[serde(default, alias = "mimeType")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, alias = "inlineData")]
    pub inline_data: Option<Blob>,
}

impl Part {
    pub fn has_image(&self) -> bool {
        self.inline_data
            .as_ref()
            .map(|blob| !blob.data.trim().is_empty())
            .unwrap_or(false)
    }

    /// `None` for parts without inline data.
    pub fn as_image(&self) -> Option<Result<DynamicImage>> {
        if !self.has_image() {
            return None;
        }
        self.inline_data
            .as_ref()
            .map(|blob| decode_base64_image(&blob.data))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate.
    pub fn parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.as_slice())
            .unwrap_or_default()
    }
}

pub struct GenaiClient<'a> {
    transport: &'a dyn HttpTransport,
    config: &'a GeneratorConfig,
}

impl<'a> GenaiClient<'a> {
    pub fn new(transport: &'a dyn HttpTransport, config: &'a GeneratorConfig) -> Self {
        Self { transport, config }
    }

    pub fn generate_content(&self, call: &ClientCall) -> Result<GenerateContentResponse> {
        let endpoint = self.config.endpoint_for_model(call.model);
        let body = wire_body(call)?;
        let response = self.transport.post_json(
            PROVIDER,
            &endpoint,
            self.config.api_key(),
            &body,
            self.config.request_timeout(),
        )?;
        ensure_success(PROVIDER, &response)?;
        serde_json::from_str(&response.body).map_err(|err| GenerationError::MalformedResponse {
            provider: PROVIDER,
            detail: format!("unexpected response shape: {err}"),
        })
    }
}

/// Wire form of a call, using the API's snake_case field names.
pub fn wire_body(call: &ClientCall) -> Result<Value> {
    let parts = call
        .contents
        .iter()
        .map(|item| match item {
            ContentItem::Text(text) => Ok(json!({ "text": text })),
            ContentItem::Image(image) => Ok(json!({
                "inline_data": {
                    "mime_type": "image/png",
                    "data": encode_png_base64(image)?,
                }
            })),
        })
        .collect::<Result<Vec<Value>>>()?;
    let generation_config =
        serde_json::to_value(&call.config).map_err(|err| {
            GenerationError::Configuration(format!("generation config not serializable: {err}"))
        })?;
    Ok(json!({
        "contents": [{ "parts": parts }],
        "generation_config": generation_config,
    }))
}

/// Saves the first part that carries image data. Nothing is written unless
/// that image decodes cleanly.
pub fn decode_response(parts: &[Part], output_path: &Path) -> Result<PathBuf> {
    let Some(decoded) = parts.iter().find_map(Part::as_image) else {
        return Err(GenerationError::MissingImage {
            provider: PROVIDER,
            body: None,
        });
    };
    write_png(&decoded?, output_path)?;
    Ok(output_path.to_path_buf())
}
