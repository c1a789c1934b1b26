//! Raw JSON calling convention: the request body is assembled by hand with the
//! logo inlined as base64, and the reply is read at a fixed key path.

use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use crate::error::{GenerationError, Result};
use crate::imaging::{decode_base64_image, encode_png_base64, write_png, Logo};
use crate::request::GenerationRequest;

pub const PROVIDER: &str = "gemini";

pub fn logo_part(logo: &Logo) -> Result<Value> {
    Ok(json!({
        "inlineData": {
            "mimeType": "image/png",
            "data": encode_png_base64(logo.image())?,
        }
    }))
}

/// Builds the `generateContent` body. Parts are ordered brand prompt, content
/// prompt, logo.
pub fn build_payload(request: &GenerationRequest) -> Result<Value> {
    let parts = vec![
        json!({ "text": request.brand_prompt() }),
        json!({ "text": request.content_prompt() }),
        logo_part(request.logo())?,
    ];

    let mut image_config = Map::new();
    image_config.insert(
        "aspectRatio".to_string(),
        Value::String(request.aspect_ratio().as_str().to_string()),
    );
    if request.model().supports_image_size() {
        if let Some(size) = request.image_size() {
            image_config.insert(
                "image_size".to_string(),
                Value::String(size.as_str().to_string()),
            );
        }
    }

    Ok(json!({
        "contents": [{ "parts": parts }],
        "generationConfig": {
            "responseModalities": ["IMAGE"],
            "imageConfig": Value::Object(image_config),
        },
    }))
}

/// Base64 payload at `candidates[0].content.parts[0].inlineData.data`.
pub fn extract_inline_data(payload: &Value) -> Option<&str> {
    let part = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?;
    part.get("inlineData")
        .or_else(|| part.get("inline_data"))?
        .get("data")?
        .as_str()
        .filter(|data| !data.is_empty())
}

/// Decodes a successful reply body and writes the image to `output_path`.
///
/// Nothing is written unless an image decodes cleanly.
pub fn decode_response(body: &str, output_path: &Path) -> Result<PathBuf> {
    let payload: Value =
        serde_json::from_str(body).map_err(|err| GenerationError::MalformedResponse {
            provider: PROVIDER,
            detail: format!("invalid JSON payload: {err}"),
        })?;
    let Some(data) = extract_inline_data(&payload) else {
        return Err(GenerationError::MissingImage {
            provider: PROVIDER,
            body: Some(body.to_string()),
        });
    };
    let image = decode_base64_image(data)?;
    write_png(&image, output_path)?;
    Ok(output_path.to_path_buf())
}
