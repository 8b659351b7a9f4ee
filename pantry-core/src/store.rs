//! SQLite persistence for the recipe catalog and the user's saved recipes.
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS recipes (
//!     id           INTEGER PRIMARY KEY AUTOINCREMENT,
//!     title        TEXT NOT NULL,
//!     ingredients  TEXT NOT NULL,
//!     instructions TEXT NOT NULL
//! );
//! -- saved_recipes has the same columns.
//! ```
//!
//! The two tables share no keys; saving copies a recipe by value.  Saved
//! titles are kept unique by checking before insert, not by a constraint,
//! so uniqueness only holds with a single writer.  Nothing here runs inside
//! a multi-statement transaction except CSV import.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params, params_from_iter};
use rusqlite::types::Value;
use tracing::{debug, info};

use crate::bootstrap;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::matcher::IngredientFilter;
use crate::types::{CatalogRecipe, RecipeId, SaveOutcome, SavedRecipe};

/// Handle to an open recipe database.
///
/// # Usage
///
/// ```no_run
/// # use pantry_core::store::RecipeStore;
/// # use pantry_core::config::StoreConfig;
/// # use pantry_core::matcher::IngredientFilter;
/// let store = RecipeStore::open("recipes.db", &StoreConfig::default())?;
/// let filter = IngredientFilter::parse("chicken, garlic");
/// let hits = store.list_catalog(&filter, None, 10)?;
/// # Ok::<(), pantry_core::error::PantryError>(())
/// ```
pub struct RecipeStore {
    pub(crate) conn: Connection,
    db_path: PathBuf,
}

impl std::fmt::Debug for RecipeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeStore")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl RecipeStore {
    /// Open (or create) the database at `path`.
    ///
    /// Both tables are created if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PantryError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &StoreConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        bootstrap::ensure_schema(&conn)?;

        info!(path = %db_path.display(), "Recipe store opened");

        Ok(Self { conn, db_path })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`crate::PantryError::Database`] on SQLite failures.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        bootstrap::ensure_schema(&conn)?;

        Ok(Self {
            conn,
            db_path: PathBuf::from(":memory:"),
        })
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    /// Catalog recipes matching every term of `filter`, excluding
    /// `exclude_id`, in random order, at most `limit` of them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PantryError::Database`] on SQLite failures.
    pub fn list_catalog(
        &self,
        filter: &IngredientFilter,
        exclude_id: Option<RecipeId>,
        limit: usize,
    ) -> Result<Vec<CatalogRecipe>> {
        let start = Instant::now();
        let (predicate, mut values) = filter.sql_predicate(exclude_id);
        values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));

        let sql = format!(
            "SELECT id, title, ingredients, instructions FROM recipes
             WHERE {predicate} ORDER BY RANDOM() LIMIT ?"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let recipes = stmt
            .query_map(params_from_iter(values.iter()), catalog_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(
            terms = filter.terms().len(),
            exclude = ?exclude_id,
            limit,
            found = recipes.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Catalog lookup"
        );

        Ok(recipes)
    }

    /// Fetch one catalog recipe by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PantryError::Database`] on SQLite failures.
    pub fn catalog_recipe(&self, id: RecipeId) -> Result<Option<CatalogRecipe>> {
        let recipe = self
            .conn
            .prepare_cached(
                "SELECT id, title, ingredients, instructions FROM recipes WHERE id = ?1",
            )?
            .query_row(params![id.0], catalog_from_row)
            .optional()?;
        Ok(recipe)
    }

    /// Append a recipe to the catalog and return its id.
    ///
    /// `ingredients` and `instructions` are stored as given; callers holding
    /// lists should encode them with [`crate::codec::encode_list`] first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PantryError::Database`] on SQLite failures.
    pub fn insert_catalog(
        &self,
        title: &str,
        ingredients: &str,
        instructions: &str,
    ) -> Result<RecipeId> {
        insert_catalog_row(&self.conn, title, ingredients, instructions)
    }

    /// Number of catalog recipes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PantryError::Database`] on SQLite failures.
    pub fn catalog_count(&self) -> Result<usize> {
        self.count("recipes")
    }

    // ------------------------------------------------------------------
    // Saved recipes
    // ------------------------------------------------------------------

    /// Save a recipe unless one with the same title is already saved.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PantryError::Database`] on SQLite failures.
    pub fn insert_saved(
        &self,
        title: &str,
        ingredients: &str,
        instructions: &str,
    ) -> Result<SaveOutcome> {
        let existing: Option<i64> = self
            .conn
            .prepare_cached("SELECT id FROM saved_recipes WHERE title = ?1")?
            .query_row(params![title], |row| row.get(0))
            .optional()?;

        if existing.is_some() {
            debug!(title, "Recipe already saved");
            return Ok(SaveOutcome::AlreadySaved);
        }

        self.conn.execute(
            "INSERT INTO saved_recipes (title, ingredients, instructions) VALUES (?1, ?2, ?3)",
            params![title, ingredients, instructions],
        )?;
        let id = RecipeId(self.conn.last_insert_rowid());

        info!(%id, title, "Recipe saved");
        Ok(SaveOutcome::Saved(id))
    }

    /// All saved recipes, most recently saved first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PantryError::Database`] on SQLite failures.
    pub fn list_saved(&self) -> Result<Vec<SavedRecipe>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, title, ingredients, instructions FROM saved_recipes ORDER BY id DESC",
        )?;
        let saved = stmt
            .query_map([], |row| {
                Ok(SavedRecipe {
                    id: RecipeId(row.get(0)?),
                    title: row.get(1)?,
                    ingredients: row.get(2)?,
                    instructions: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(saved)
    }

    /// Remove a saved recipe. Removing an id that does not exist is not an
    /// error; the return value says whether a row was actually deleted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PantryError::Database`] on SQLite failures.
    pub fn delete_saved(&self, id: RecipeId) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM saved_recipes WHERE id = ?1", params![id.0])?;
        debug!(%id, deleted, "Delete saved recipe");
        Ok(deleted > 0)
    }

    /// Number of saved recipes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PantryError::Database`] on SQLite failures.
    pub fn saved_count(&self) -> Result<usize> {
        self.count("saved_recipes")
    }

    // ------------------------------------------------------------------
    // Utility
    // ------------------------------------------------------------------

    /// Return the path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn count(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

pub(crate) fn insert_catalog_row(
    conn: &Connection,
    title: &str,
    ingredients: &str,
    instructions: &str,
) -> Result<RecipeId> {
    conn.execute(
        "INSERT INTO recipes (title, ingredients, instructions) VALUES (?1, ?2, ?3)",
        params![title, ingredients, instructions],
    )?;
    Ok(RecipeId(conn.last_insert_rowid()))
}

fn catalog_from_row(row: &Row<'_>) -> rusqlite::Result<CatalogRecipe> {
    Ok(CatalogRecipe {
        id: RecipeId(row.get(0)?),
        title: row.get(1)?,
        ingredients: row.get(2)?,
        instructions: row.get(3)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_list;

    fn store_with(recipes: &[(&str, &[&str])]) -> RecipeStore {
        let store = RecipeStore::open_in_memory().expect("open");
        for (title, ingredients) in recipes {
            store
                .insert_catalog(title, &encode_list(ingredients), &encode_list(&["Cook."]))
                .expect("insert");
        }
        store
    }

    fn titles(recipes: &[CatalogRecipe]) -> Vec<&str> {
        let mut t: Vec<&str> = recipes.iter().map(|r| r.title.as_str()).collect();
        t.sort_unstable();
        t
    }

    #[test]
    fn conjunctive_match() {
        let store = store_with(&[
            ("Roast", &["chicken", "garlic", "onion"][..]),
            ("Pesto", &["basil", "garlic"][..]),
        ]);

        let hits = store
            .list_catalog(&IngredientFilter::parse("chicken, garlic"), None, 10)
            .expect("query");
        assert_eq!(titles(&hits), ["Roast"]);

        let hits = store
            .list_catalog(&IngredientFilter::parse("chicken, basil"), None, 10)
            .expect("query");
        assert!(hits.is_empty());

        let hits = store
            .list_catalog(&IngredientFilter::parse("garlic"), None, 10)
            .expect("query");
        assert_eq!(titles(&hits), ["Pesto", "Roast"]);
    }

    #[test]
    fn match_is_case_sensitive_and_literal() {
        let store = store_with(&[("Omelette", &["eggs", "100% butter"][..])]);
        let find = |q: &str| {
            store
                .list_catalog(&IngredientFilter::parse(q), None, 10)
                .expect("query")
                .len()
        };
        assert_eq!(find("egg"), 1);
        assert_eq!(find("Eggs"), 0);
        assert_eq!(find("100%"), 1);
        assert_eq!(find("e_gs"), 0);
    }

    #[test]
    fn trailing_comma_matches_like_single_term() {
        let store = store_with(&[("Roast", &["chicken"][..]), ("Salad", &["lettuce"][..])]);
        let hits = store
            .list_catalog(&IngredientFilter::parse("chicken,"), None, 10)
            .expect("query");
        assert_eq!(titles(&hits), ["Roast"]);
    }

    #[test]
    fn exclude_and_limit() {
        let store = store_with(&[
            ("A", &["rice"][..]),
            ("B", &["rice"][..]),
            ("C", &["rice"][..]),
        ]);
        let filter = IngredientFilter::parse("rice");

        assert_eq!(store.list_catalog(&filter, None, 2).expect("query").len(), 2);
        assert!(store.list_catalog(&filter, None, 0).expect("query").is_empty());

        let first = store.list_catalog(&filter, None, 1).expect("query");
        let excluded = first[0].id;
        for _ in 0..10 {
            let others = store.list_catalog(&filter, Some(excluded), 10).expect("query");
            assert_eq!(others.len(), 2);
            assert!(others.iter().all(|r| r.id != excluded));
        }
    }

    #[test]
    fn catalog_recipe_lookup() {
        let store = store_with(&[("Roast", &["chicken"][..])]);
        let id = store
            .insert_catalog("Stew", r#"["beef"]"#, r#"["Simmer."]"#)
            .expect("insert");
        let recipe = store.catalog_recipe(id).expect("get").expect("Some");
        assert_eq!(recipe.title, "Stew");
        assert!(store.catalog_recipe(RecipeId(999)).expect("get").is_none());
        assert_eq!(store.catalog_count().expect("count"), 2);
    }

    #[test]
    fn duplicate_save_is_noop() {
        let store = RecipeStore::open_in_memory().expect("open");
        let first = store.insert_saved("Soup", "[]", "[]").expect("save");
        assert!(first.is_saved());
        let second = store.insert_saved("Soup", r#"["x"]"#, "[]").expect("save");
        assert_eq!(second, SaveOutcome::AlreadySaved);
        assert_eq!(store.saved_count().expect("count"), 1);
        assert_eq!(store.list_saved().expect("list")[0].ingredients, "[]");
    }

    #[test]
    fn saved_listed_newest_first() {
        let store = RecipeStore::open_in_memory().expect("open");
        store.insert_saved("First", "[]", "[]").expect("save");
        store.insert_saved("Second", "[]", "[]").expect("save");
        store.insert_saved("Third", "[]", "[]").expect("save");
        let saved: Vec<String> = store
            .list_saved()
            .expect("list")
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(saved, ["Third", "Second", "First"]);
    }

    #[test]
    fn delete_saved_is_idempotent() {
        let store = RecipeStore::open_in_memory().expect("open");
        let SaveOutcome::Saved(id) = store.insert_saved("Soup", "[]", "[]").expect("save") else {
            panic!("expected a fresh save");
        };
        assert!(store.delete_saved(id).expect("delete"));
        assert!(!store.delete_saved(id).expect("delete again"));
        assert!(!store.delete_saved(RecipeId(12345)).expect("delete missing"));
        assert_eq!(store.saved_count().expect("count"), 0);
    }

    #[test]
    fn file_backed_store_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("recipes.db");
        {
            let store = RecipeStore::open(&path, &StoreConfig::default()).expect("open");
            store.insert_saved("Soup", "[]", "[]").expect("save");
        }
        let reopened = RecipeStore::open(&path, &StoreConfig::default()).expect("reopen");
        assert_eq!(reopened.saved_count().expect("count"), 1);
        assert_eq!(reopened.db_path(), path.as_path());
    }
}
