//! Catalog bootstrap: schema creation, sample recipes, and CSV import.
//!
//! CSV files are expected to look like
//!
//! ```text
//! title,ingredients,instructions
//! Pancakes,"[""flour"",""milk"",""egg""]","[""Whisk."",""Fry.""]"
//! ```
//!
//! The header row is always skipped.  Rows that do not have exactly three
//! columns are skipped without failing the import; the list columns are
//! stored verbatim, so they should already be serialized list text.

use std::path::Path;
use std::time::Instant;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::codec::encode_list;
use crate::error::Result;
use crate::store::{RecipeStore, insert_catalog_row};

/// Schema for both tables. Idempotent.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS recipes (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        title        TEXT NOT NULL,
        ingredients  TEXT NOT NULL,
        instructions TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS saved_recipes (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        title        TEXT NOT NULL,
        ingredients  TEXT NOT NULL,
        instructions TEXT NOT NULL
    );";

/// Built-in sample recipes: `(title, ingredients, instructions)`.
pub const SAMPLE_RECIPES: &[(&str, &[&str], &[&str])] = &[
    (
        "Spaghetti Bolognese",
        &["spaghetti", "minced beef", "tomato sauce", "onion", "garlic", "olive oil", "salt", "pepper"],
        &[
            "Cook the spaghetti.",
            "Sauté onions and garlic.",
            "Add minced beef and cook.",
            "Pour tomato sauce and simmer.",
            "Serve over spaghetti.",
        ],
    ),
    (
        "Chicken Curry",
        &["chicken breast", "curry powder", "coconut milk", "onion", "garlic", "ginger", "salt", "pepper"],
        &[
            "Sauté onions, garlic, and ginger.",
            "Add chicken and curry powder.",
            "Pour coconut milk and simmer.",
            "Serve hot with rice.",
        ],
    ),
    (
        "Vegetable Stir-Fry",
        &["broccoli", "bell peppers", "carrots", "soy sauce", "ginger", "garlic", "sesame oil"],
        &[
            "Heat oil in a pan.",
            "Add garlic and ginger.",
            "Stir-fry vegetables.",
            "Add soy sauce and toss.",
            "Serve immediately.",
        ],
    ),
];

/// Summary of a CSV import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Rows written to the catalog.
    pub imported: usize,
    /// Data rows skipped for not having exactly three columns.
    pub skipped: usize,
}

/// Create the `recipes` and `saved_recipes` tables if absent.
///
/// # Errors
///
/// Returns [`crate::PantryError::Database`] on SQLite failures.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Insert [`SAMPLE_RECIPES`] into the catalog and return how many were
/// added. Running it twice adds them twice, as the catalog has no unique
/// constraint on titles.
///
/// # Errors
///
/// Returns [`crate::PantryError::Database`] on SQLite failures.
pub fn seed_samples(store: &RecipeStore) -> Result<usize> {
    for (title, ingredients, instructions) in SAMPLE_RECIPES {
        store.insert_catalog(title, &encode_list(ingredients), &encode_list(instructions))?;
    }
    info!(count = SAMPLE_RECIPES.len(), "Sample recipes added");
    Ok(SAMPLE_RECIPES.len())
}

/// Import catalog recipes from a CSV file.
///
/// # Errors
///
/// Returns [`crate::PantryError::Io`] or [`crate::PantryError::Csv`] if the
/// file cannot be read, or [`crate::PantryError::Database`] on SQLite
/// failures. On error nothing from this file is kept.
pub fn import_csv<P: AsRef<Path>>(store: &mut RecipeStore, path: P) -> Result<ImportReport> {
    let file = std::fs::File::open(path.as_ref())?;
    let report = import_reader(store, file)?;
    info!(
        path = %path.as_ref().display(),
        imported = report.imported,
        skipped = report.skipped,
        "CSV import finished"
    );
    Ok(report)
}

/// Import catalog recipes from any CSV source. See [`import_csv`].
///
/// # Errors
///
/// Returns [`crate::PantryError::Csv`] on malformed CSV, or
/// [`crate::PantryError::Database`] on SQLite failures.
pub fn import_reader<R: std::io::Read>(store: &mut RecipeStore, source: R) -> Result<ImportReport> {
    let start = Instant::now();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let tx = store.conn.transaction()?;
    let mut report = ImportReport::default();

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != 3 {
            warn!(row = line + 1, columns = record.len(), "Skipping CSV row");
            report.skipped += 1;
            continue;
        }
        insert_catalog_row(&tx, &record[0], &record[1], &record[2])?;
        report.imported += 1;
    }

    tx.commit()?;
    debug!(elapsed_us = start.elapsed().as_micros(), "CSV rows written");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::format_ingredients;
    use crate::matcher::IngredientFilter;

    #[test]
    fn schema_is_idempotent() {
        let store = RecipeStore::open_in_memory().expect("open");
        ensure_schema(&store.conn).expect("second run");
        assert_eq!(store.catalog_count().expect("count"), 0);
    }

    #[test]
    fn samples_are_stored_in_canonical_form() {
        let store = RecipeStore::open_in_memory().expect("open");
        assert_eq!(seed_samples(&store).expect("seed"), 3);

        let hits = store
            .list_catalog(&IngredientFilter::parse("coconut milk, ginger"), None, 10)
            .expect("query");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Chicken Curry");
        assert_eq!(format_ingredients(&hits[0].ingredients)[0], "• chicken breast");
    }

    #[test]
    fn csv_import_skips_header_and_bad_rows() {
        let mut store = RecipeStore::open_in_memory().expect("open");
        let csv = "title,ingredients,instructions\n\
                   Pancakes,\"[\"\"flour\"\", \"\"milk\"\"]\",\"[\"\"Whisk.\"\"]\"\n\
                   Broken,only two\n\
                   Toast,\"['bread']\",\"['Toast it.']\"\n\
                   Too,many,columns,here\n";
        let report = import_reader(&mut store, csv.as_bytes()).expect("import");
        assert_eq!(report, ImportReport { imported: 2, skipped: 2 });
        assert_eq!(store.catalog_count().expect("count"), 2);

        let hits = store
            .list_catalog(&IngredientFilter::parse("milk"), None, 10)
            .expect("query");
        assert_eq!(hits[0].title, "Pancakes");
    }

    #[test]
    fn csv_import_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("recipes.csv");
        std::fs::write(&path, "title,ingredients,instructions\nSoup,\"['water']\",\"['Boil.']\"\n")
            .expect("write");

        let mut store = RecipeStore::open_in_memory().expect("open");
        let report = import_csv(&mut store, &path).expect("import");
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn missing_csv_is_io_error() {
        let mut store = RecipeStore::open_in_memory().expect("open");
        let err = import_csv(&mut store, "/nonexistent/pantry.csv").expect_err("should fail");
        assert!(matches!(err, crate::PantryError::Io(_)));
    }
}
