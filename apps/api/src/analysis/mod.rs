// Resume analysis: prompt, single completion call, extraction, validation.
// All LLM calls go through llm_client, never direct HTTP calls here.

pub mod document;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod validation;
