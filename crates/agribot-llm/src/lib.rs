//! Language-model client for AgriBot.
//!
//! Defines the [`LanguageModel`] trait consumed by the router, the
//! specialists, and the synthesis step, plus the Gemini REST implementation
//! and the fenced-JSON parsing utility for model output.

pub mod client;
pub mod error;
pub mod json;

pub use client::{GeminiClient, LanguageModel};
pub use error::LlmError;
pub use json::{parse_fenced, strip_code_fence};
