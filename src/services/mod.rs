pub mod grading_service;
pub mod llm_service;
pub mod rubric;
pub mod schema;

#[cfg(test)]
pub(crate) mod testing;

pub use grading_service::{parse_grading_json, validate_input, GradingService};
pub use llm_service::{CompletionBackend, LlmService};
