//! Recipe synthesis: prompt the model, then parse its free-form reply.
//!
//! The parser only understands the layout the prompt asks for:
//!
//! ```text
//! **Garlic Chicken**
//!
//! Ingredients:
//! * 2 chicken breasts
//! * 4 cloves garlic
//!
//! Instructions:
//! 1. Season the chicken.
//! 2. Roast with garlic.
//! ```
//!
//! Section headings must match exactly, whole line, case included.  If
//! either heading is missing the recipe comes back with a title and an
//! empty body; replies that drift from the template are not repaired.
//! Everything after `Instructions:` counts as a step, tips included.

use pantry_core::ParsedRecipe;
use pantry_core::codec::strip_ordinal;
use pantry_core::config::LlmConfig;
use tracing::{debug, info, warn};

use crate::client::TextGenerator;
use crate::prompt::{self, INGREDIENTS_MARKER, INSTRUCTIONS_MARKER};
use crate::types::LlmRequest;

/// Title used when the reply's first line is blank.
pub const DEFAULT_TITLE: &str = "AI-Generated Recipe";

/// Sampling settings applied to every synthesis request.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisSettings {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for SynthesisSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout_ms: config.request_timeout_ms,
        }
    }
}

/// Asks a [`TextGenerator`] for new recipes.
#[derive(Debug)]
pub struct RecipeSynthesizer<G> {
    generator: G,
    settings: SynthesisSettings,
}

impl<G: TextGenerator> RecipeSynthesizer<G> {
    /// Create a synthesizer with default settings.
    pub fn new(generator: G) -> Self {
        Self::with_settings(generator, SynthesisSettings::default())
    }

    /// Create a synthesizer with explicit settings.
    pub fn with_settings(generator: G, settings: SynthesisSettings) -> Self {
        Self { generator, settings }
    }

    /// The underlying generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Generate a recipe from a raw, comma-separated ingredient string.
    ///
    /// Returns `None` when the model produced nothing: an unreachable
    /// provider, a failed call and an empty reply all look the same to the
    /// caller. The cause is logged.
    pub async fn synthesize(&self, ingredients_csv: &str) -> Option<ParsedRecipe> {
        let request = LlmRequest::new(prompt::recipe_prompt(ingredients_csv))
            .with_max_tokens(self.settings.max_tokens)
            .with_temperature(self.settings.temperature)
            .with_timeout(self.settings.timeout_ms);

        let response = match self.generator.generate(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(model = self.generator.model_name(), error = %e, "Recipe generation failed");
                return None;
            }
        };

        if response.text.is_empty() {
            warn!(model = %response.model, "Recipe generation returned no text");
            return None;
        }

        let recipe = parse_reply(&response.text);
        if recipe.is_body_empty() {
            debug!(reply = %response.text, "Reply did not follow the recipe layout");
        }
        info!(
            title = %recipe.title,
            ingredients = recipe.ingredients.len(),
            steps = recipe.instructions.len(),
            latency_ms = response.latency_ms,
            "Recipe generated"
        );
        Some(recipe)
    }
}

/// Parse a model reply laid out as requested by [`prompt::RECIPE_PROMPT`].
#[must_use]
pub fn parse_reply(reply: &str) -> ParsedRecipe {
    let lines: Vec<&str> = reply.split('\n').collect();

    let title = lines
        .first()
        .map(|line| line.replace("**", "").trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let ingredients_at = lines.iter().position(|line| *line == INGREDIENTS_MARKER);
    let instructions_at = lines.iter().position(|line| *line == INSTRUCTIONS_MARKER);

    let (Some(ing), Some(ins)) = (ingredients_at, instructions_at) else {
        return ParsedRecipe {
            title,
            ..ParsedRecipe::default()
        };
    };

    // Headings in the wrong order leave the ingredient range empty.
    let ingredients = lines
        .get(ing + 1..ins)
        .unwrap_or_default()
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.strip_prefix("* ").unwrap_or(line).trim().to_string())
        .collect();

    let instructions = lines[ins + 1..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| strip_ordinal(line).trim().to_string())
        .collect();

    ParsedRecipe {
        title,
        ingredients,
        instructions,
    }
}
