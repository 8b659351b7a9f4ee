//! Core type definitions for the Pantry recipe store.
//!
//! Stored recipes keep their ingredient and instruction lists as serialized
//! list text (see [`crate::codec`]); only [`ParsedRecipe`] holds them as
//! real sequences.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::codec;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Row id of a catalog or saved recipe.
///
/// Catalog and saved ids live in separate tables and are never compared
/// with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecipeId(pub i64);

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecipeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A pre-loaded, searchable recipe from the `recipes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecipe {
    /// Auto-assigned row id.
    pub id: RecipeId,
    /// Display title.
    pub title: String,
    /// Serialized ingredient list.
    pub ingredients: String,
    /// Serialized instruction list.
    pub instructions: String,
}

/// A user-curated copy of a recipe from the `saved_recipes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRecipe {
    /// Auto-assigned row id.
    pub id: RecipeId,
    /// Title; unique among saved recipes.
    pub title: String,
    /// Serialized ingredient list.
    pub ingredients: String,
    /// Serialized instruction list.
    pub instructions: String,
}

/// A recipe with its lists decoded, as produced by the codec or by the
/// synthesizer. Never stored directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRecipe {
    /// Display title.
    pub title: String,
    /// Ingredient lines in order.
    pub ingredients: Vec<String>,
    /// Instruction lines in order, without step numbers.
    pub instructions: Vec<String>,
}

impl ParsedRecipe {
    /// Serialized `(ingredients, instructions)` text in the canonical stored
    /// form, ready for [`crate::RecipeStore::insert_saved`].
    #[must_use]
    pub fn to_stored(&self) -> (String, String) {
        (
            codec::encode_list(&self.ingredients),
            codec::encode_list(&self.instructions),
        )
    }

    /// Whether the recipe carries no ingredient or instruction lines.
    #[must_use]
    pub fn is_body_empty(&self) -> bool {
        self.ingredients.is_empty() && self.instructions.is_empty()
    }
}

/// Result of trying to save a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new saved row was written.
    Saved(RecipeId),
    /// A saved recipe with the same title already exists; nothing written.
    AlreadySaved,
}

impl SaveOutcome {
    /// Whether this outcome wrote a new row.
    #[must_use]
    pub fn is_saved(self) -> bool {
        matches!(self, Self::Saved(_))
    }
}
