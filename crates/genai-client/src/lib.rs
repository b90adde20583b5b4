//! Generative Model Client
//!
//! Narrow interface to an externally hosted language model:
//! - `GenerativeModel` trait returning schema-constrained JSON
//! - HTTP implementation for Gemini-style `generateContent` endpoints
//! - Scripted in-process model for tests and offline runs
//! - Response schema builders

mod error;
mod http;
mod mock;
mod model;
pub mod schema;

pub use error::ExternalServiceError;
pub use http::{GenAiConfig, HttpModel};
pub use mock::ScriptedModel;
pub use model::{generate_structured, GenerativeModel, StructuredPrompt};
