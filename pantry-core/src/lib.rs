//! # Pantry Core Library
//!
//! Ingredient-driven recipe lookup backed by a local SQLite file.
//!
//! The crate is split along the path a search takes:
//!
//! - **Matcher**: turns `"chicken, garlic"` into a conjunctive substring
//!   filter over the catalog's ingredient text ([`matcher`])
//! - **Store**: the `recipes` catalog and the user's `saved_recipes`
//!   ([`store`], with schema/sample/CSV loading in [`bootstrap`])
//! - **Codec**: stored list text to display lines and back ([`codec`])
//!
//! Generation of new recipes lives in `pantry-llm`; rendering and session
//! state live in `pantry-cli`.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bootstrap;
pub mod codec;
pub mod config;
pub mod error;
pub mod matcher;
pub mod store;
pub mod types;

pub use config::PantryConfig;
pub use error::PantryError;
pub use matcher::IngredientFilter;
pub use store::RecipeStore;
pub use types::*;
