// Daily journal: section classification, English feedback generation,
// persistence and the monthly history view.
// All model calls go through llm_client.

pub mod classifier;
pub mod feedback;
pub mod handlers;
pub mod history;
pub mod prompts;
pub mod repository;
pub mod service;
