mod options;
mod registry;

pub use options::{AspectRatio, ImageSize};
pub use registry::{CallingConvention, ImageModel, ModelRegistry, ModelSpec};
