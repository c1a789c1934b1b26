//! Batch run log. Every batch appends its events to one `events.jsonl`
//! file, one compact JSON object per line, tagged with the batch id and a
//! UTC timestamp.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::models::{AspectRatio, CallingConvention, ImageModel, ImageSize};

/// What happened in a batch, in the order the batch loop reports it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchEvent {
    BatchStarted {
        model: ImageModel,
        calling_convention: CallingConvention,
        aspect_ratio: AspectRatio,
        image_size: Option<ImageSize>,
        count: u32,
        output_dir: PathBuf,
        warnings: Vec<String>,
        per_image_usd: f64,
        estimated_total_usd: Option<f64>,
    },
    ImageStarted {
        index: u32,
        output_path: PathBuf,
    },
    ArtifactCreated {
        index: u32,
        output_path: PathBuf,
        price_estimate_usd: f64,
    },
    BatchFailed {
        index: u32,
        completed: usize,
        error: String,
    },
    BatchFinished {
        images: usize,
        estimated_total_usd: Option<f64>,
    },
}

impl BatchEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            BatchEvent::BatchStarted { .. } => "batch_started",
            BatchEvent::ImageStarted { .. } => "image_started",
            BatchEvent::ArtifactCreated { .. } => "artifact_created",
            BatchEvent::BatchFailed { .. } => "batch_failed",
            BatchEvent::BatchFinished { .. } => "batch_finished",
        }
    }
}

#[derive(Serialize)]
struct Line<'a> {
    #[serde(flatten)]
    event: &'a BatchEvent,
    batch_id: &'a str,
    ts: String,
}

/// Location of the shared log. Nothing is touched until a batch opens it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the file for appending, creating it and its directory as needed.
    pub fn open_batch(&self, batch_id: impl Into<String>) -> anyhow::Result<BatchLog> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed creating {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed opening {}", self.path.display()))?;
        Ok(BatchLog {
            batch_id: batch_id.into(),
            path: self.path.clone(),
            file,
        })
    }
}

/// Append handle for one batch.
#[derive(Debug)]
pub struct BatchLog {
    batch_id: String,
    path: PathBuf,
    file: File,
}

impl BatchLog {
    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    /// Writes the event as a single line in one `write_all`.
    pub fn record(&mut self, event: &BatchEvent) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(&Line {
            event,
            batch_id: &self.batch_id,
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        })
        .with_context(|| format!("failed encoding {} event", event.kind()))?;
        line.push(b'\n');
        self.file
            .write_all(&line)
            .with_context(|| format!("failed appending to {}", self.path.display()))
    }
}
