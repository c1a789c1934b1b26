use std::fs;
use std::path::{Path, PathBuf};

use carousel_contracts::events::{BatchEvent, BatchLog, EventLog};
use carousel_contracts::models::ImageModel;
use carousel_contracts::pricing::PriceTable;
use thiserror::Error;
use uuid::Uuid;

use crate::error::GenerationError;
use crate::generator::ImageGenerator;
use crate::request::GenerationRequest;

pub const MAX_IMAGES_PER_BATCH: u32 = 10;
pub const DEFAULT_FILE_PREFIX: &str = "carousel_slide";

/// One saved slide.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    output_path: PathBuf,
    source_model: ImageModel,
    price_estimate_usd: f64,
}

impl GenerationResult {
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn source_model(&self) -> ImageModel {
        self.source_model
    }

    pub fn price_estimate_usd(&self) -> f64 {
        self.price_estimate_usd
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub count: u32,
    pub output_dir: PathBuf,
    pub file_prefix: String,
}

impl BatchPlan {
    pub fn new(count: u32, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            count,
            output_dir: output_dir.into(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }

    pub fn with_file_prefix(mut self, prefix: &str) -> Self {
        let trimmed = prefix.trim();
        if !trimmed.is_empty() {
            self.file_prefix = trimmed.to_string();
        }
        self
    }

    /// `{output_dir}/{prefix}_{index}.png`, index starting at 1.
    pub fn output_path(&self, index: u32) -> PathBuf {
        self.output_dir
            .join(format!("{}_{index}.png", self.file_prefix))
    }

    fn validate(&self) -> Result<(), GenerationError> {
        if !(1..=MAX_IMAGES_PER_BATCH).contains(&self.count) {
            return Err(GenerationError::Configuration(format!(
                "image count must be between 1 and {MAX_IMAGES_PER_BATCH}, got {}",
                self.count
            )));
        }
        if self.file_prefix.contains(['/', '\\']) {
            return Err(GenerationError::Configuration(format!(
                "file prefix '{}' must not contain path separators",
                self.file_prefix
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchProgress<'a> {
    Started { index: u32, count: u32 },
    Saved { index: u32, count: u32, path: &'a Path },
}

/// A batch that stopped early. Slides saved before the failure are kept in
/// `completed`, in request order.
///
/// `index` is `None` when the batch failed outside any single image: bad
/// plan, unusable output directory or event log.
#[derive(Debug, Error)]
#[error("{}", headline(.index, .requested))]
pub struct BatchError {
    pub index: Option<u32>,
    pub requested: u32,
    pub completed: Vec<GenerationResult>,
    #[source]
    pub source: GenerationError,
}

fn headline(index: &Option<u32>, requested: &u32) -> String {
    match index {
        Some(index) => format!("image {index} of {requested} failed"),
        None => format!("batch of {requested} image(s) failed"),
    }
}

pub struct BatchRunner<'a> {
    generator: &'a ImageGenerator,
    prices: PriceTable,
    events: Option<EventLog>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(generator: &'a ImageGenerator) -> Self {
        Self {
            generator,
            prices: PriceTable::default(),
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_price_table(mut self, prices: PriceTable) -> Self {
        self.prices = prices;
        self
    }

    /// Generates `plan.count` slides one after another from the same request.
    ///
    /// The first failure stops the batch; nothing after it is attempted.
    pub fn run(
        &self,
        request: &GenerationRequest,
        plan: &BatchPlan,
        mut on_progress: impl FnMut(BatchProgress<'_>),
    ) -> Result<Vec<GenerationResult>, BatchError> {
        let mut completed: Vec<GenerationResult> = Vec::new();
        let fail = |index: Option<u32>, completed: Vec<GenerationResult>, source: GenerationError| {
            BatchError {
                index,
                requested: plan.count,
                completed,
                source,
            }
        };

        if let Err(err) = plan.validate() {
            return Err(fail(None, completed, err));
        }
        if let Err(source) = fs::create_dir_all(&plan.output_dir) {
            return Err(fail(
                None,
                completed,
                GenerationError::Io {
                    path: plan.output_dir.clone(),
                    source,
                },
            ));
        }

        let mut log = match self
            .events
            .as_ref()
            .map(|events| events.open_batch(format!("batch-{}", Uuid::new_v4())))
            .transpose()
        {
            Ok(log) => log,
            Err(err) => return Err(fail(None, completed, GenerationError::Events(err))),
        };
        let model = request.model();
        let per_image_usd = self
            .prices
            .price(model, request.image_size())
            .unwrap_or_default();
        let estimate = self.prices.estimate(model, request.image_size(), plan.count);

        let started = BatchEvent::BatchStarted {
            model,
            calling_convention: model.calling_convention(),
            aspect_ratio: request.aspect_ratio(),
            image_size: request.image_size(),
            count: plan.count,
            output_dir: plan.output_dir.clone(),
            warnings: request.warnings().to_vec(),
            per_image_usd,
            estimated_total_usd: estimate.map(|cost| cost.total_usd),
        };
        if let Err(err) = record(log.as_mut(), &started) {
            return Err(fail(None, completed, err));
        }

        for index in 1..=plan.count {
            let output_path = plan.output_path(index);
            on_progress(BatchProgress::Started {
                index,
                count: plan.count,
            });

            let outcome = record(
                log.as_mut(),
                &BatchEvent::ImageStarted {
                    index,
                    output_path: output_path.clone(),
                },
            )
            .and_then(|()| self.generator.generate_and_save(request, &output_path));

            let saved = match outcome {
                Ok(saved) => saved,
                Err(err) => {
                    let _ = record(
                        log.as_mut(),
                        &BatchEvent::BatchFailed {
                            index,
                            completed: completed.len(),
                            error: err.to_string(),
                        },
                    );
                    return Err(fail(Some(index), completed, err));
                }
            };

            completed.push(GenerationResult {
                output_path: saved.clone(),
                source_model: model,
                price_estimate_usd: per_image_usd,
            });
            let created = BatchEvent::ArtifactCreated {
                index,
                output_path: saved.clone(),
                price_estimate_usd: per_image_usd,
            };
            if let Err(err) = record(log.as_mut(), &created) {
                return Err(fail(Some(index), completed, err));
            }
            on_progress(BatchProgress::Saved {
                index,
                count: plan.count,
                path: &saved,
            });
        }

        let finished = BatchEvent::BatchFinished {
            images: completed.len(),
            estimated_total_usd: estimate.map(|cost| cost.total_usd),
        };
        if let Err(err) = record(log.as_mut(), &finished) {
            return Err(fail(None, completed, err));
        }
        Ok(completed)
    }
}

fn record(log: Option<&mut BatchLog>, event: &BatchEvent) -> Result<(), GenerationError> {
    match log {
        Some(log) => log.record(event).map_err(GenerationError::Events),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use carousel_contracts::events::EventLog;
    use carousel_contracts::models::{AspectRatio, ImageModel, ImageSize};
    use serde_json::{json, Value};

    use super::{BatchPlan, BatchProgress, BatchRunner, MAX_IMAGES_PER_BATCH};
    use crate::config::GeneratorConfig;
    use crate::error::GenerationError;
    use crate::generator::ImageGenerator;
    use crate::request::GenerationRequest;
    use crate::testing::{image_reply, sample_logo, ScriptedTransport};
    use crate::transport::TransportResponse;

    fn flash_square() -> GenerationRequest {
        GenerationRequest::new(
            "BRAND",
            "CONTENT",
            sample_logo(),
            ImageModel::GeminiFlashImage,
            AspectRatio::Square,
            None,
        )
    }

    fn read_event_types(path: &std::path::Path) -> anyhow::Result<Vec<String>> {
        let raw = fs::read_to_string(path)?;
        Ok(raw
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .filter_map(|row| row.get("type").and_then(Value::as_str).map(str::to_string))
            .collect())
    }

    #[test]
    fn three_flash_images_land_in_request_order() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let out_dir = temp.path().join("outputs");
        let transport = ScriptedTransport::new(|call, _| Ok(image_reply(10 + call as u32, 10)));
        let generator =
            ImageGenerator::with_transport(GeneratorConfig::new("key")?, transport.clone());
        let plan = BatchPlan::new(3, &out_dir);

        let mut progress = Vec::new();
        let results = BatchRunner::new(&generator).run(&flash_square(), &plan, |event| {
            if let BatchProgress::Saved { index, .. } = event {
                progress.push(index);
            }
        })?;

        assert_eq!(progress, vec![1, 2, 3]);
        assert_eq!(results.len(), 3);
        for (offset, result) in results.iter().enumerate() {
            let index = offset as u32 + 1;
            assert_eq!(
                result.output_path(),
                out_dir.join(format!("carousel_slide_{index}.png"))
            );
            assert_eq!(result.source_model(), ImageModel::GeminiFlashImage);
            assert_eq!(result.price_estimate_usd(), 0.039);
            let image = image::open(result.output_path())?;
            assert_eq!(image.width(), 10 + offset as u32);
        }
        assert_eq!(fs::read_dir(&out_dir)?.count(), 3);
        assert_eq!(transport.calls().len(), 3);
        Ok(())
    }

    #[test]
    fn failure_aborts_remaining_images_and_keeps_completed() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let transport = ScriptedTransport::new(|call, _| {
            if call == 1 {
                return Ok(TransportResponse {
                    status: 200,
                    body: json!({ "candidates": [] }).to_string(),
                });
            }
            Ok(image_reply(4, 4))
        });
        let generator =
            ImageGenerator::with_transport(GeneratorConfig::new("key")?, transport.clone());
        let plan = BatchPlan::new(4, temp.path()).with_file_prefix("slide");

        let err = match BatchRunner::new(&generator).run(&flash_square(), &plan, |_| {}) {
            Ok(results) => anyhow::bail!("expected failure, got {} results", results.len()),
            Err(err) => err,
        };

        assert_eq!(err.index, Some(2));
        assert_eq!(err.to_string(), "image 2 of 4 failed");
        assert_eq!(err.requested, 4);
        assert_eq!(err.completed.len(), 1);
        assert_eq!(err.completed[0].output_path(), temp.path().join("slide_1.png"));
        assert!(matches!(err.source, GenerationError::MissingImage { body: None, .. }));
        assert!(!temp.path().join("slide_2.png").exists());
        assert_eq!(transport.calls().len(), 2);
        Ok(())
    }

    #[test]
    fn out_of_range_count_fails_before_any_request() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let transport = ScriptedTransport::new(|_, _| Ok(image_reply(1, 1)));
        let generator =
            ImageGenerator::with_transport(GeneratorConfig::new("key")?, transport.clone());

        for count in [0, MAX_IMAGES_PER_BATCH + 1] {
            let plan = BatchPlan::new(count, temp.path());
            let err = BatchRunner::new(&generator)
                .run(&flash_square(), &plan, |_| {})
                .err();
            assert_eq!(err.as_ref().map(|err| err.index), Some(None));
            assert!(matches!(
                err.map(|err| err.source),
                Some(GenerationError::Configuration(_))
            ));
        }
        assert!(transport.calls().is_empty());
        Ok(())
    }

    #[test]
    fn unusable_output_dir_fails_outside_any_image() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let blocker = temp.path().join("taken");
        fs::write(&blocker, b"not a directory")?;
        let transport = ScriptedTransport::new(|_, _| Ok(image_reply(1, 1)));
        let generator =
            ImageGenerator::with_transport(GeneratorConfig::new("key")?, transport.clone());

        let err = match BatchRunner::new(&generator).run(
            &flash_square(),
            &BatchPlan::new(3, blocker.join("slides")),
            |_| {},
        ) {
            Ok(_) => anyhow::bail!("expected the output dir to be rejected"),
            Err(err) => err,
        };
        assert_eq!(err.index, None);
        assert_eq!(err.to_string(), "batch of 3 image(s) failed");
        assert!(matches!(err.source, GenerationError::Io { .. }));
        assert!(transport.calls().is_empty());
        Ok(())
    }

    #[test]
    fn events_trace_the_batch() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let events_path = temp.path().join("events.jsonl");
        let transport = ScriptedTransport::new(|_, _| Ok(image_reply(2, 2)));
        let generator = ImageGenerator::with_transport(GeneratorConfig::new("key")?, transport);
        let request = GenerationRequest::new(
            "BRAND",
            "CONTENT",
            sample_logo(),
            ImageModel::GeminiProImage,
            AspectRatio::Landscape4x3,
            Some(ImageSize::FourK),
        );

        BatchRunner::new(&generator)
            .with_events(EventLog::new(&events_path))
            .run(&request, &BatchPlan::new(2, temp.path().join("out")), |_| {})?;

        assert_eq!(
            read_event_types(&events_path)?,
            vec![
                "batch_started",
                "image_started",
                "artifact_created",
                "image_started",
                "artifact_created",
                "batch_finished",
            ]
        );

        let raw = fs::read_to_string(&events_path)?;
        let started: Value = serde_json::from_str(raw.lines().next().unwrap_or("{}"))?;
        assert_eq!(started["model"], json!("gemini-3-pro-image-preview"));
        assert_eq!(started["image_size"], json!("4K"));
        assert_eq!(started["estimated_total_usd"], json!(0.48));
        assert!(started["batch_id"]
            .as_str()
            .map(|id| id.starts_with("batch-"))
            .unwrap_or(false));
        Ok(())
    }

    #[test]
    fn failed_batch_is_logged() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let events_path = temp.path().join("events.jsonl");
        let transport = ScriptedTransport::new(|_, _| {
            Err(GenerationError::Transport {
                provider: "gemini-client",
                status: None,
                message: "timed out after 120s".to_string(),
            })
        });
        let generator = ImageGenerator::with_transport(GeneratorConfig::new("key")?, transport);

        let err = BatchRunner::new(&generator)
            .with_events(EventLog::new(&events_path))
            .run(&flash_square(), &BatchPlan::new(3, temp.path()), |_| {})
            .err();
        assert!(matches!(
            err.map(|err| err.source),
            Some(GenerationError::Transport { status: None, .. })
        ));
        assert_eq!(
            read_event_types(&events_path)?,
            vec!["batch_started", "image_started", "batch_failed"]
        );
        Ok(())
    }
}
