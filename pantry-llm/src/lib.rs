//! # pantry-llm: Text Generation for Pantry
//!
//! Provides one interface for recipe generation across backends:
//!   - **Ollama** (local, default; `llama3`)
//!   - **OpenAI-compatible API**
//!   - **None**: every call fails, callers fall back to "no recipe"
//!
//! The [`RecipeSynthesizer`] owns the prompt and the reply parser; it is
//! generic over [`TextGenerator`] so tests can script replies.
//!
//! ```text
//! ingredients ──► prompt::recipe_prompt ──► TextGenerator ──► parse_reply ──► ParsedRecipe
//! ```

pub mod client;
pub mod error;
pub mod prompt;
pub mod synthesizer;
pub mod types;

pub use client::{LlmClient, LlmProvider, TextGenerator};
pub use error::LlmError;
pub use synthesizer::{RecipeSynthesizer, parse_reply};
pub use types::{LlmRequest, LlmResponse};
