use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Image models the generator can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ImageModel {
    #[default]
    #[serde(rename = "gemini-3-pro-image-preview")]
    GeminiProImage,
    #[serde(rename = "gemini-2.5-flash-image")]
    GeminiFlashImage,
}

impl ImageModel {
    pub const ALL: [ImageModel; 2] = [ImageModel::GeminiProImage, ImageModel::GeminiFlashImage];

    pub fn id(self) -> &'static str {
        match self {
            ImageModel::GeminiProImage => "gemini-3-pro-image-preview",
            ImageModel::GeminiFlashImage => "gemini-2.5-flash-image",
        }
    }

    /// Whether the model accepts an `image_size` resolution tier.
    pub fn supports_image_size(self) -> bool {
        matches!(self, ImageModel::GeminiProImage)
    }

    pub fn calling_convention(self) -> CallingConvention {
        match self {
            ImageModel::GeminiProImage => CallingConvention::RestJson,
            ImageModel::GeminiFlashImage => CallingConvention::StructuredClient,
        }
    }
}

impl fmt::Display for ImageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ImageModel {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let name = trimmed.strip_prefix("models/").unwrap_or(trimmed);
        ImageModel::ALL
            .into_iter()
            .find(|model| model.id() == name)
            .ok_or_else(|| format!("unknown image model '{trimmed}'"))
    }
}

/// How a request for a model is put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallingConvention {
    /// Hand-built camelCase JSON with the logo inlined as base64.
    RestJson,
    /// Typed content list handed to the structured client.
    StructuredClient,
}

impl CallingConvention {
    pub fn as_str(self) -> &'static str {
        match self {
            CallingConvention::RestJson => "rest_json",
            CallingConvention::StructuredClient => "structured_client",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub model: ImageModel,
    pub provider: String,
    pub label: String,
    pub convention: CallingConvention,
    pub supports_image_size: bool,
}

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ModelRegistry {
    pub fn new(models: Option<IndexMap<String, ModelSpec>>) -> Self {
        Self {
            models: models.unwrap_or_else(default_models),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name.trim())
    }

    pub fn spec(&self, model: ImageModel) -> Option<&ModelSpec> {
        self.models.get(model.id())
    }

    pub fn list(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.values()
    }

    /// First registered model, used when the caller does not pick one.
    pub fn default_model(&self) -> Option<ImageModel> {
        self.models.values().next().map(|spec| spec.model)
    }
}

fn default_models() -> IndexMap<String, ModelSpec> {
    let mut map = IndexMap::new();

    let mut insert = |model: ImageModel, label: &str| {
        map.insert(
            model.id().to_string(),
            ModelSpec {
                model,
                provider: "gemini".to_string(),
                label: label.to_string(),
                convention: model.calling_convention(),
                supports_image_size: model.supports_image_size(),
            },
        );
    };

    insert(ImageModel::GeminiProImage, "Gemini 3 Pro Image (preview)");
    insert(ImageModel::GeminiFlashImage, "Gemini 2.5 Flash Image");

    map
}
