//! Error types for the Pantry core library.

use thiserror::Error;

/// Top-level error type for all Pantry store and loader operations.
///
/// Malformed list text has no variant: the codec falls back to a sentinel
/// line instead.
#[derive(Error, Debug)]
pub enum PantryError {
    /// SQLite persistence error (missing file, locked database, bad SQL).
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// CSV reader failure during catalog import.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A catalog recipe with the given ID was not found.
    #[error("Recipe not found: {0}")]
    RecipeNotFound(crate::RecipeId),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, PantryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecipeId;

    #[test]
    fn variants_cover_every_failure_source() {
        let not_found = PantryError::RecipeNotFound(RecipeId(7));
        assert_eq!(not_found.to_string(), "Recipe not found: 7");

        let io: PantryError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(io, PantryError::Io(_)));

        let config = crate::PantryConfig::from_toml("[store\n").expect_err("bad toml");
        assert!(matches!(config, PantryError::Config(_)));
    }
}
