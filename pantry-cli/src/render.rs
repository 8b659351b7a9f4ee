//! Plain-text rendering of recipes and action outcomes.

use pantry_core::codec::{self, INGREDIENT_BULLET};
use pantry_core::{CatalogRecipe, ParsedRecipe, SaveOutcome, SavedRecipe};

/// A catalog search hit. `slot` is the 1-based position the session uses
/// to refer to it.
pub fn catalog(slot: usize, recipe: &CatalogRecipe) -> String {
    body(
        &format!("[{slot}] {}  (#{})", recipe.title, recipe.id),
        &codec::format_ingredients(&recipe.ingredients),
        &codec::format_instructions(&recipe.instructions),
    )
}

/// A saved recipe, keyed by its saved id.
pub fn saved(recipe: &SavedRecipe) -> String {
    body(
        &format!("{}  (saved #{})", recipe.title, recipe.id),
        &codec::format_ingredients(&recipe.ingredients),
        &codec::format_instructions(&recipe.instructions),
    )
}

/// A freshly generated recipe.
pub fn generated(recipe: &ParsedRecipe) -> String {
    let ingredients: Vec<String> = recipe
        .ingredients
        .iter()
        .map(|item| format!("{INGREDIENT_BULLET}{item}"))
        .collect();
    let steps: Vec<String> = recipe
        .instructions
        .iter()
        .enumerate()
        .map(|(i, step)| format!("Step {}: {step}", i + 1))
        .collect();
    body(&format!("AI-Generated Recipe: {}", recipe.title), &ingredients, &steps)
}

/// Outcome line for a save attempt.
pub fn save_outcome(title: &str, outcome: SaveOutcome) -> String {
    match outcome {
        SaveOutcome::Saved(_) => format!("Recipe '{title}' saved!"),
        SaveOutcome::AlreadySaved => format!("Recipe '{title}' is already saved!"),
    }
}

fn body(heading: &str, ingredients: &[String], steps: &[String]) -> String {
    let mut lines = Vec::with_capacity(ingredients.len() + steps.len() + 3);
    lines.push(heading.to_string());
    lines.push("  Ingredients:".to_string());
    lines.extend(ingredients.iter().map(|line| format!("    {line}")));
    lines.push("  Instructions:".to_string());
    lines.extend(steps.iter().map(|line| format!("    {line}")));
    lines.join("\n") + "\n"
}
