pub mod events;
pub mod models;
pub mod pricing;
pub mod prompts;
