use carousel_contracts::models::{AspectRatio, ImageModel, ImageSize};

use crate::imaging::Logo;

/// Everything needed to render one slide.
///
/// `image_size` is `Some` exactly when the model exposes the resolution knob.
/// A size passed for any other model is dropped and noted in `warnings`.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    brand_prompt: String,
    content_prompt: String,
    logo: Logo,
    model: ImageModel,
    aspect_ratio: AspectRatio,
    image_size: Option<ImageSize>,
    warnings: Vec<String>,
}

impl GenerationRequest {
    pub fn new(
        brand_prompt: impl Into<String>,
        content_prompt: impl Into<String>,
        logo: Logo,
        model: ImageModel,
        aspect_ratio: AspectRatio,
        image_size: Option<ImageSize>,
    ) -> Self {
        let mut warnings = Vec::new();
        let image_size = if model.supports_image_size() {
            Some(image_size.unwrap_or_default())
        } else {
            if let Some(ignored) = image_size {
                warnings.push(format!(
                    "{} does not accept image_size; dropped {ignored}.",
                    model.id()
                ));
            }
            None
        };
        Self {
            brand_prompt: brand_prompt.into(),
            content_prompt: content_prompt.into(),
            logo,
            model,
            aspect_ratio,
            image_size,
            warnings,
        }
    }

    pub fn brand_prompt(&self) -> &str {
        &self.brand_prompt
    }

    pub fn content_prompt(&self) -> &str {
        &self.content_prompt
    }

    pub fn logo(&self) -> &Logo {
        &self.logo
    }

    pub fn model(&self) -> ImageModel {
        self.model
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn image_size(&self) -> Option<ImageSize> {
        self.image_size
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
