//! Prompt template for recipe synthesis.
//!
//! The reply parser in [`crate::synthesizer`] depends on the exact section
//! headings requested here (`Ingredients:` and `Instructions:` on lines of
//! their own). Change both together.

/// Section heading that opens the ingredient list in a reply.
pub const INGREDIENTS_MARKER: &str = "Ingredients:";

/// Section heading that opens the instruction list in a reply.
pub const INSTRUCTIONS_MARKER: &str = "Instructions:";

/// Recipe generation prompt. `{ingredients}` receives the raw user input.
pub const RECIPE_PROMPT: &str = "Create a detailed recipe using the following ingredients: {ingredients}. Format it as follows:

**[Recipe Title]**

Ingredients:
* [ingredient 1]
* [ingredient 2]
* [ingredient 3]

Instructions:
1. [Step 1]
2. [Step 2]
3. [Step 3]

Include tips if possible.";

/// Simple template interpolation for prompts.
///
/// Replaces `{key}` with the corresponding value.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}

/// The recipe prompt for a raw, comma-separated ingredient string.
#[must_use]
pub fn recipe_prompt(ingredients_csv: &str) -> String {
    render_template(RECIPE_PROMPT, &[("ingredients", ingredients_csv)])
}
