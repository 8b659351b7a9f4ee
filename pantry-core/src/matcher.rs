//! Ingredient matcher: the conjunctive substring filter behind search.
//!
//! A raw query such as `"chicken, garlic"` becomes one term per comma.  A
//! catalog recipe matches when its stored ingredient text contains **every**
//! term as a case-sensitive substring.  Matching is plain substring search:
//! `"egg"` matches `"eggplant"`, and no normalisation of plurals, units, or
//! synonyms is attempted.
//!
//! Terms are trimmed but never dropped.  A trailing comma therefore adds an
//! empty term, which every recipe contains, so `"chicken,"` behaves like
//! `"chicken"`.
//!
//! In SQL each term becomes `instr(ingredients, ?) > 0`; unlike `LIKE`,
//! `instr` is case-sensitive and treats `%` and `_` literally.

use rusqlite::types::Value;

use crate::error::Result;
use crate::store::RecipeStore;
use crate::types::{CatalogRecipe, RecipeId};

/// A parsed ingredient query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientFilter {
    terms: Vec<String>,
}

impl IngredientFilter {
    /// Split `ingredient_csv` on commas and trim each term.
    #[must_use]
    pub fn parse(ingredient_csv: &str) -> Self {
        Self {
            terms: ingredient_csv
                .split(',')
                .map(|term| term.trim().to_string())
                .collect(),
        }
    }

    /// The trimmed terms, in query order. Always at least one.
    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Whether any term is empty and thus matches everything.
    #[must_use]
    pub fn has_wildcard_term(&self) -> bool {
        self.terms.iter().any(String::is_empty)
    }

    /// Evaluate the filter against ingredient text in memory.
    ///
    /// Agrees with the SQL predicate built by [`Self::sql_predicate`].
    #[must_use]
    pub fn matches(&self, ingredients: &str) -> bool {
        self.terms.iter().all(|term| ingredients.contains(term.as_str()))
    }

    /// The `WHERE` clause body and its positional parameters.
    ///
    /// `exclude_id` appends `AND id != ?`.
    pub(crate) fn sql_predicate(&self, exclude_id: Option<RecipeId>) -> (String, Vec<Value>) {
        let mut clauses: Vec<&str> = Vec::with_capacity(self.terms.len() + 1);
        let mut params: Vec<Value> = Vec::with_capacity(self.terms.len() + 1);

        for term in &self.terms {
            clauses.push("instr(ingredients, ?) > 0");
            params.push(Value::Text(term.clone()));
        }
        if let Some(id) = exclude_id {
            clauses.push("id != ?");
            params.push(Value::Integer(id.0));
        }

        (clauses.join(" AND "), params)
    }
}

/// Find up to `limit` catalog recipes containing every ingredient in
/// `ingredient_csv`, in random order.
///
/// `exclude_id` skips the recipe currently on screen, which is how
/// "find another" avoids repeating itself.  No matches is an empty vector.
///
/// # Errors
///
/// Returns [`crate::PantryError::Database`] if the store cannot be queried.
pub fn find(
    store: &RecipeStore,
    ingredient_csv: &str,
    exclude_id: Option<RecipeId>,
    limit: usize,
) -> Result<Vec<CatalogRecipe>> {
    let filter = IngredientFilter::parse(ingredient_csv);
    store.list_catalog(&filter, exclude_id, limit)
}
