use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{ImageModel, ImageSize};

/// Published list price for one model.
///
/// `cost_per_image_usd` is the flat price; models with a resolution knob may
/// override it per tier in `cost_per_image_usd_by_image_size`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub cost_per_image_usd: f64,
    pub cost_per_image_usd_by_image_size: BTreeMap<ImageSize, f64>,
}

/// Read-only unit prices used for display estimates. Never reconciled against
/// actual billing.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    rows: BTreeMap<ImageModel, PriceRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostEstimate {
    pub per_image_usd: f64,
    pub total_usd: f64,
    pub images: u32,
}

impl Default for PriceTable {
    fn default() -> Self {
        let mut rows = BTreeMap::new();
        rows.insert(
            ImageModel::GeminiFlashImage,
            PriceRow {
                cost_per_image_usd: 0.039,
                cost_per_image_usd_by_image_size: BTreeMap::new(),
            },
        );
        rows.insert(
            ImageModel::GeminiProImage,
            PriceRow {
                cost_per_image_usd: 0.134,
                cost_per_image_usd_by_image_size: BTreeMap::from([
                    (ImageSize::OneK, 0.134),
                    (ImageSize::TwoK, 0.134),
                    (ImageSize::FourK, 0.24),
                ]),
            },
        );
        Self { rows }
    }
}

impl PriceTable {
    pub fn row(&self, model: ImageModel) -> Option<&PriceRow> {
        self.rows.get(&model)
    }

    /// Unit price for one image. Resolution is ignored for models without the
    /// knob; models with it price at 2K when no tier is given.
    pub fn price(&self, model: ImageModel, resolution: Option<ImageSize>) -> Option<f64> {
        let row = self.rows.get(&model)?;
        if !model.supports_image_size() {
            return Some(row.cost_per_image_usd);
        }
        let tier = resolution.unwrap_or_default();
        Some(
            row.cost_per_image_usd_by_image_size
                .get(&tier)
                .copied()
                .unwrap_or(row.cost_per_image_usd),
        )
    }

    pub fn estimate(
        &self,
        model: ImageModel,
        resolution: Option<ImageSize>,
        images: u32,
    ) -> Option<CostEstimate> {
        let per_image_usd = self.price(model, resolution)?;
        Some(CostEstimate {
            per_image_usd,
            total_usd: round_usd(per_image_usd * f64::from(images)),
            images,
        })
    }
}

/// Unit price from the built-in table.
pub fn get_image_price(model: ImageModel, resolution: Option<ImageSize>) -> f64 {
    PriceTable::default()
        .price(model, resolution)
        .unwrap_or_default()
}

fn round_usd(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::{get_image_price, PriceTable};
    use crate::models::{ImageModel, ImageSize};

    #[test]
    fn builtin_prices_are_fixed() {
        assert_eq!(
            get_image_price(ImageModel::GeminiProImage, Some(ImageSize::FourK)),
            0.24
        );
        assert_eq!(
            get_image_price(ImageModel::GeminiProImage, Some(ImageSize::OneK)),
            0.134
        );
        assert_eq!(get_image_price(ImageModel::GeminiProImage, None), 0.134);
    }

    #[test]
    fn flash_price_ignores_resolution() {
        for size in [None, Some(ImageSize::OneK), Some(ImageSize::TwoK), Some(ImageSize::FourK)] {
            assert_eq!(get_image_price(ImageModel::GeminiFlashImage, size), 0.039);
        }
    }

    #[test]
    fn estimate_rounds_total_to_three_decimals() {
        let table = PriceTable::default();
        let flash = table.estimate(ImageModel::GeminiFlashImage, None, 7);
        assert_eq!(flash.map(|cost| cost.total_usd), Some(0.273));

        let pro = table.estimate(ImageModel::GeminiProImage, Some(ImageSize::FourK), 3);
        assert_eq!(pro.map(|cost| cost.per_image_usd), Some(0.24));
        assert_eq!(pro.map(|cost| cost.total_usd), Some(0.72));
        assert_eq!(pro.map(|cost| cost.images), Some(3));
    }
}
