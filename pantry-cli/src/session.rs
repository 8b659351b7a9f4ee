//! Interactive session state and command handling.
//!
//! A [`Session`] owns the store and the synthesizer and remembers what the
//! user last looked at: the current ingredient query, the recipes on screen
//! and the last generated recipe. One-shot subcommands drive the same
//! methods as the REPL.

use anyhow::{Context, Result};
use pantry_core::config::SearchConfig;
use pantry_core::{
    CatalogRecipe, IngredientFilter, ParsedRecipe, PantryError, RecipeId, RecipeStore, matcher,
};
use pantry_llm::{RecipeSynthesizer, TextGenerator};
use tracing::debug;

use crate::render;

/// Shown when an action needs ingredients and none were given.
pub const EMPTY_QUERY: &str = "Please enter at least one ingredient.";

/// Shown when a search matches nothing.
pub const NO_MATCHES: &str = "No recipes found for those ingredients.";

/// Shown when "find another" runs out of recipes.
pub const NO_MORE_MATCHES: &str = "No other recipes found for those ingredients.";

/// Prefixed to search output when the query has an empty term, such as a
/// trailing comma.
pub const WILDCARD_NOTICE: &str = "Note: an empty ingredient matches every recipe.";

/// Shown when the model produced nothing.
pub const NOTHING_GENERATED: &str = "No recipe was generated. Is the model service running?";

/// Help text for the interactive prompt.
pub const HELP: &str = "\
Commands:
  find <ingredients>      search recipes containing every ingredient (comma separated)
  another <n>             show a different recipe for the current search, skipping result n
  save <n>                save result n to your favorites
  generate [ingredients]  ask the model for a new recipe (defaults to the current search)
  save-generated          save the last generated recipe
  saved                   list saved recipes
  remove <id>             delete a saved recipe
  help                    show this text
  quit                    leave";

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `find <ingredients>`
    Find(String),
    /// `another <n>`
    Another(usize),
    /// `save <n>`
    Save(usize),
    /// `generate [ingredients]`
    Generate(Option<String>),
    /// `save-generated`
    SaveGenerated,
    /// `saved`
    Saved,
    /// `remove <id>`
    Remove(RecipeId),
    /// `help`
    Help,
    /// `quit`
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines are `Ok(None)`; anything
    /// unrecognised is an error message for the user.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "find" | "f" | "search" => Self::Find(rest.to_string()),
            "another" | "a" => Self::Another(slot(rest)?),
            "save" | "s" => Self::Save(slot(rest)?),
            "generate" | "g" => {
                Self::Generate((!rest.is_empty()).then(|| rest.to_string()))
            }
            "save-generated" | "sg" => Self::SaveGenerated,
            "saved" | "favorites" => Self::Saved,
            "remove" | "rm" => Self::Remove(
                rest.parse()
                    .map_err(|_| format!("'{rest}' is not a saved recipe id"))?,
            ),
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
        };
        Ok(Some(command))
    }
}

fn slot(arg: &str) -> std::result::Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("'{arg}' is not a result number")),
    }
}

/// What the REPL should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Print the text and keep reading.
    Continue(String),
    /// Leave the loop.
    Quit,
}

/// Per-user interactive state.
pub struct Session<G> {
    store: RecipeStore,
    synthesizer: RecipeSynthesizer<G>,
    limits: SearchConfig,
    query: String,
    shown: Vec<CatalogRecipe>,
    generated: Option<ParsedRecipe>,
}

impl<G: TextGenerator> Session<G> {
    /// Start a session with nothing on screen.
    pub fn new(store: RecipeStore, synthesizer: RecipeSynthesizer<G>, limits: SearchConfig) -> Self {
        Self {
            store,
            synthesizer,
            limits,
            query: String::new(),
            shown: Vec::new(),
            generated: None,
        }
    }

    /// The underlying store.
    #[cfg(test)]
    pub fn store(&self) -> &RecipeStore {
        &self.store
    }

    /// Recipes currently on screen, in slot order.
    #[cfg(test)]
    pub fn shown(&self) -> &[CatalogRecipe] {
        &self.shown
    }

    /// The last generated recipe, if any.
    pub fn generated(&self) -> Option<&ParsedRecipe> {
        self.generated.as_ref()
    }

    /// Run one REPL line.
    ///
    /// # Errors
    ///
    /// Store failures propagate; the caller reports them and keeps going.
    pub async fn handle(&mut self, line: &str) -> Result<Flow> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue(String::new())),
            Err(message) => return Ok(Flow::Continue(message)),
        };
        debug!(?command, "Session command");

        let text = match command {
            Command::Find(query) => self.search(&query, self.limits.limit)?,
            Command::Another(n) => self.another(n)?,
            Command::Save(n) => self.save_slot(n)?,
            Command::Generate(query) => self.generate(query.as_deref()).await,
            Command::SaveGenerated => self.save_generated()?,
            Command::Saved => self.saved()?,
            Command::Remove(id) => self.remove(id)?,
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Flow::Quit),
        };
        Ok(Flow::Continue(text))
    }

    /// Search the catalog and replace the recipes on screen.
    ///
    /// On a store failure the previous query and results are kept.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn search(&mut self, query: &str, limit: usize) -> Result<String> {
        if query.trim().is_empty() {
            return Ok(EMPTY_QUERY.to_string());
        }
        let found = matcher::find(&self.store, query, None, limit).context("search failed")?;
        self.query = query.to_string();
        self.shown = found;

        let mut text = if self.shown.is_empty() {
            NO_MATCHES.to_string()
        } else {
            self.shown
                .iter()
                .enumerate()
                .map(|(i, recipe)| render::catalog(i + 1, recipe))
                .collect::<Vec<_>>()
                .join("\n")
        };
        if IngredientFilter::parse(query).has_wildcard_term() {
            text = format!("{WILDCARD_NOTICE}\n{text}");
        }
        Ok(text)
    }

    /// Append a different match for the current query, skipping the
    /// recipe in slot `n`.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn another(&mut self, n: usize) -> Result<String> {
        let Some(current) = n.checked_sub(1).and_then(|i| self.shown.get(i)) else {
            return Ok(format!("There is no result {n} on screen."));
        };
        let exclude = current.id;
        let query = self.query.clone();
        self.another_excluding(&query, exclude)
    }

    /// Find a match for `query` other than `exclude` and append it to the
    /// recipes on screen.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn another_excluding(&mut self, query: &str, exclude: RecipeId) -> Result<String> {
        if query.trim().is_empty() {
            return Ok(EMPTY_QUERY.to_string());
        }
        let found = matcher::find(&self.store, query, Some(exclude), self.limits.another_limit)
            .context("search failed")?;
        self.query = query.to_string();
        if found.is_empty() {
            return Ok(NO_MORE_MATCHES.to_string());
        }

        let first_new = self.shown.len();
        self.shown.extend(found);
        Ok(self.shown[first_new..]
            .iter()
            .enumerate()
            .map(|(i, recipe)| render::catalog(first_new + i + 1, recipe))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Save the recipe in slot `n`.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn save_slot(&mut self, n: usize) -> Result<String> {
        let Some(recipe) = n.checked_sub(1).and_then(|i| self.shown.get(i)) else {
            return Ok(format!("There is no result {n} on screen."));
        };
        let outcome = self
            .store
            .insert_saved(&recipe.title, &recipe.ingredients, &recipe.instructions)
            .context("could not save recipe")?;
        Ok(render::save_outcome(&recipe.title, outcome))
    }

    /// Save a catalog recipe by id.
    ///
    /// # Errors
    ///
    /// Store failures, or [`PantryError::RecipeNotFound`] for an unknown id.
    pub fn save_catalog(&mut self, id: RecipeId) -> Result<String> {
        let recipe = self
            .store
            .catalog_recipe(id)?
            .ok_or(PantryError::RecipeNotFound(id))?;
        let outcome = self
            .store
            .insert_saved(&recipe.title, &recipe.ingredients, &recipe.instructions)
            .context("could not save recipe")?;
        Ok(render::save_outcome(&recipe.title, outcome))
    }

    /// Ask the model for a recipe from `query`, or from the current search
    /// when `query` is `None`.
    ///
    /// A failed generation forgets any earlier generated recipe, so
    /// [`Self::save_generated`] never saves something the user did not just
    /// see.
    pub async fn generate(&mut self, query: Option<&str>) -> String {
        let query = query.map_or_else(|| self.query.clone(), str::to_string);
        if query.trim().is_empty() {
            return EMPTY_QUERY.to_string();
        }

        match self.synthesizer.synthesize(&query).await {
            Some(recipe) => {
                let text = render::generated(&recipe);
                self.generated = Some(recipe);
                text
            }
            None => {
                self.generated = None;
                NOTHING_GENERATED.to_string()
            }
        }
    }

    /// Save the last generated recipe.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn save_generated(&mut self) -> Result<String> {
        let Some(recipe) = &self.generated else {
            return Ok("Generate a recipe first.".to_string());
        };
        let (ingredients, instructions) = recipe.to_stored();
        let outcome = self
            .store
            .insert_saved(&recipe.title, &ingredients, &instructions)
            .context("could not save generated recipe")?;
        Ok(render::save_outcome(&recipe.title, outcome))
    }

    /// All saved recipes, newest first.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn saved(&self) -> Result<String> {
        let recipes = self.store.list_saved().context("could not list saved recipes")?;
        if recipes.is_empty() {
            return Ok("No saved recipes yet.".to_string());
        }
        Ok(recipes.iter().map(render::saved).collect::<Vec<_>>().join("\n"))
    }

    /// Delete a saved recipe.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn remove(&self, id: RecipeId) -> Result<String> {
        if self.store.delete_saved(id).context("could not remove recipe")? {
            Ok(format!("Removed saved recipe #{id}."))
        } else {
            Ok(format!("No saved recipe #{id}."))
        }
    }
}
