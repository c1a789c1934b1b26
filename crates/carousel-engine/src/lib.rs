//! Builds Gemini image requests from a brand prompt, post content and a logo,
//! and turns the replies into PNG files.

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod generator;
pub mod imaging;
pub mod request;
pub mod rest;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{
    BatchError, BatchPlan, BatchProgress, BatchRunner, GenerationResult, DEFAULT_FILE_PREFIX,
    MAX_IMAGES_PER_BATCH,
};
pub use config::{GeneratorConfig, DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT};
pub use error::{GenerationError, Result};
pub use generator::{ImageGenerator, PreparedRequest};
pub use imaging::Logo;
pub use request::GenerationRequest;
pub use transport::{HttpTransport, ReqwestTransport, TransportResponse};
