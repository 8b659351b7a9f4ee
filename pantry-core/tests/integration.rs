//! Integration tests: end-to-end recipe flows.
//!
//! These follow what a user does in one session: bootstrap a catalog,
//! search it, page through "find another", save and remove favorites.

use pantry_core::bootstrap;
use pantry_core::codec::{self, ListKind};
use pantry_core::config::{PantryConfig, StoreConfig};
use pantry_core::matcher;
use pantry_core::store::RecipeStore;
use pantry_core::types::{ParsedRecipe, SaveOutcome};

fn seeded_store() -> RecipeStore {
    let store = RecipeStore::open_in_memory().expect("open");
    bootstrap::seed_samples(&store).expect("seed");
    store
}

// ---------------------------------------------------------------------------
// Search → display → save → list → remove
// ---------------------------------------------------------------------------

#[test]
fn search_save_and_remove_lifecycle() {
    let store = seeded_store();

    // 1. Search: only the curry has both.
    let hits = matcher::find(&store, "chicken, coconut milk", None, 10).expect("find");
    assert_eq!(hits.len(), 1);
    let curry = &hits[0];
    assert_eq!(curry.title, "Chicken Curry");

    // 2. Display lines come out of the codec.
    let steps = codec::decode_list(&curry.instructions, ListKind::Instructions);
    assert_eq!(steps[0], "Step 1: Sauté onions, garlic, and ginger.");
    assert_eq!(steps.len(), 4);

    // 3. Save twice: the second is a no-op.
    let first = store
        .insert_saved(&curry.title, &curry.ingredients, &curry.instructions)
        .expect("save");
    let SaveOutcome::Saved(saved_id) = first else {
        panic!("first save should write a row");
    };
    let second = store
        .insert_saved(&curry.title, &curry.ingredients, &curry.instructions)
        .expect("save again");
    assert_eq!(second, SaveOutcome::AlreadySaved);

    // 4. The saved copy is independent of the catalog row.
    let saved = store.list_saved().expect("list");
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].ingredients, curry.ingredients);

    // 5. Remove, then remove again.
    assert!(store.delete_saved(saved_id).expect("delete"));
    assert!(!store.delete_saved(saved_id).expect("delete again"));
    assert!(store.list_saved().expect("list").is_empty());
    assert_eq!(store.catalog_count().expect("count"), 3);
}

// ---------------------------------------------------------------------------
// Find another: exclusion walks through all matches
// ---------------------------------------------------------------------------

#[test]
fn find_another_skips_the_current_recipe() {
    let store = seeded_store();

    // All three samples use garlic.
    let shown = matcher::find(&store, "garlic", None, 1).expect("find");
    assert_eq!(shown.len(), 1);

    let another = matcher::find(&store, "garlic", Some(shown[0].id), 1).expect("another");
    assert_eq!(another.len(), 1);
    assert_ne!(another[0].id, shown[0].id);

    // Only one recipe has broccoli: nothing else to offer.
    let stir_fry = matcher::find(&store, "broccoli", None, 1).expect("find");
    let none = matcher::find(&store, "broccoli", Some(stir_fry[0].id), 1).expect("another");
    assert!(none.is_empty());
}

#[test]
fn basil_query_finds_nothing() {
    let store = seeded_store();
    assert!(matcher::find(&store, "chicken, basil", None, 10).expect("find").is_empty());
}

// ---------------------------------------------------------------------------
// Imported legacy data and generated recipes share the same pipeline
// ---------------------------------------------------------------------------

#[test]
fn imported_literal_lists_decode_and_match() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("dump.csv");
    std::fs::write(
        &csv_path,
        "title,ingredients,instructions\n\
         Garlic Bread,\"['baguette', 'garlic', 'butter']\",\"['1. Slice.', '2) Spread.', '3 Bake.']\"\n\
         Plain row,with only two\n",
    )
    .expect("write csv");

    let mut store = RecipeStore::open(dir.path().join("recipes.db"), &StoreConfig::default())
        .expect("open");
    let report = bootstrap::import_csv(&mut store, &csv_path).expect("import");
    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped, 1);

    let hits = matcher::find(&store, "butter,garlic", None, 10).expect("find");
    assert_eq!(hits.len(), 1);
    assert_eq!(
        codec::format_instructions(&hits[0].instructions),
        ["Step 1: Slice.", "Step 2: Spread.", "Step 3: Bake."]
    );
    assert_eq!(
        codec::format_ingredients(&hits[0].ingredients),
        ["• baguette", "• garlic", "• butter"]
    );
}

#[test]
fn generated_recipe_round_trips_through_saved_table() {
    let store = RecipeStore::open_in_memory().expect("open");
    let generated = ParsedRecipe {
        title: "Tomato Rice".into(),
        ingredients: vec!["rice".into(), "tomato".into()],
        instructions: vec!["Cook rice.".into(), "Stir in tomato.".into()],
    };

    let (ingredients, instructions) = generated.to_stored();
    assert!(store
        .insert_saved(&generated.title, &ingredients, &instructions)
        .expect("save")
        .is_saved());

    let saved = &store.list_saved().expect("list")[0];
    assert_eq!(codec::parse_list(&saved.ingredients), Some(generated.ingredients.clone()));
    assert_eq!(
        codec::format_instructions(&saved.instructions),
        ["Step 1: Cook rice.", "Step 2: Stir in tomato."]
    );
}

#[test]
fn config_store_path_opens_file_database() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("kitchen.db");
    let config = PantryConfig::from_toml(&format!(
        "[store]\npath = {:?}\n",
        db.display().to_string()
    ))
    .expect("config");

    let store = RecipeStore::open(&config.store.path, &config.store).expect("open");
    bootstrap::seed_samples(&store).expect("seed");
    drop(store);

    let reopened = RecipeStore::open(&db, &config.store).expect("reopen");
    assert_eq!(reopened.catalog_count().expect("count"), 3);
}
