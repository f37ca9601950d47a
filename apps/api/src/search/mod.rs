// Job search: prompt construction, provider call, and normalization of the
// completion into `JobListing`s. All LLM calls go through llm_client.

pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod prompts;
pub mod provider;
pub mod service;
