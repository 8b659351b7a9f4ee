//! `pantry`: find recipes by ingredient, keep favorites, ask a model for
//! new ones.
//!
//! Usage:
//! ```bash
//! # Create the database and add the sample recipes
//! pantry init
//!
//! # Load a CSV of title,ingredients,instructions rows
//! pantry import recipes.csv
//!
//! # One-shot lookups
//! pantry search "chicken, garlic"
//! pantry generate "rice, egg" --save
//!
//! # Line-oriented session (the default)
//! pantry
//! ```

mod logging;
mod render;
mod session;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pantry_core::{PantryConfig, RecipeId, RecipeStore, bootstrap};
use pantry_llm::{LlmClient, RecipeSynthesizer, TextGenerator};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::session::{Flow, Session};

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "pantry.toml";

/// Environment variable overriding `llm.api_key`.
const API_KEY_ENV: &str = "PANTRY_LLM_API_KEY";

#[derive(Parser)]
#[command(
    name = "pantry",
    version,
    about = "Ingredient-driven recipe finder",
    long_about = "Search a recipe catalog by ingredients, keep favorites, and ask a language model for new recipes"
)]
struct Cli {
    /// Config file (defaults to ./pantry.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database path override
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log filter override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database, adding sample recipes to an empty catalog
    Init {
        /// Leave the catalog empty
        #[arg(long)]
        no_samples: bool,
    },
    /// Append recipes from a CSV file with a header row
    Import {
        /// CSV with title, ingredients, instructions columns
        csv: PathBuf,
    },
    /// Find recipes containing every listed ingredient
    Search {
        /// Comma-separated ingredients
        ingredients: String,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Find a different recipe for the same ingredients
    Another {
        /// Comma-separated ingredients
        ingredients: String,
        /// Catalog id of the recipe to skip
        #[arg(long)]
        exclude: RecipeId,
    },
    /// Save a catalog recipe to favorites
    Save {
        /// Catalog id
        id: RecipeId,
    },
    /// List saved recipes
    Saved,
    /// Delete a saved recipe
    Remove {
        /// Saved recipe id
        id: RecipeId,
    },
    /// Ask the model for a new recipe
    Generate {
        /// Comma-separated ingredients
        ingredients: String,
        /// Save the result to favorites
        #[arg(long)]
        save: bool,
    },
    /// Line-oriented session
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        config.store.path = db.display().to_string();
    }
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        config.llm.api_key = key;
    }

    let level = cli.log_level.as_deref().unwrap_or(&config.general.log_level);
    logging::init(level, cli.log_json)?;

    let store = RecipeStore::open(&config.store.path, &config.store)
        .with_context(|| format!("could not open database at {}", config.store.path))?;

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Init { no_samples } => init(&store, no_samples),
        Command::Import { csv } => import(store, &csv),
        command => {
            let client = LlmClient::from_config(&config.llm).context("invalid [llm] configuration")?;
            let synthesizer = RecipeSynthesizer::with_settings(client, (&config.llm).into());
            let mut session = Session::new(store, synthesizer, config.search.clone());
            run(&mut session, command, config.search.limit).await
        }
    }
}

/// `--config` if given, else `./pantry.toml` if present, else defaults.
fn load_config(explicit: Option<&Path>) -> Result<PantryConfig> {
    let path = match explicit {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG).exists() => Path::new(DEFAULT_CONFIG),
        None => return Ok(PantryConfig::default()),
    };
    PantryConfig::from_file(path).with_context(|| format!("could not load config {}", path.display()))
}

fn init(store: &RecipeStore, no_samples: bool) -> Result<()> {
    let existing = store.catalog_count()?;
    if no_samples {
        info!("Skipping sample recipes");
    } else if existing > 0 {
        info!(existing, "Catalog already populated, skipping sample recipes");
    } else {
        bootstrap::seed_samples(store)?;
    }
    println!(
        "Catalog ready at {}: {} recipes.",
        store.db_path().display(),
        store.catalog_count()?
    );
    Ok(())
}

fn import(mut store: RecipeStore, csv: &Path) -> Result<()> {
    let report = bootstrap::import_csv(&mut store, csv)
        .with_context(|| format!("could not import {}", csv.display()))?;
    println!(
        "Imported {} recipes ({} rows skipped).",
        report.imported, report.skipped
    );
    Ok(())
}

async fn run(session: &mut Session<LlmClient>, command: Command, default_limit: usize) -> Result<()> {
    let text = match command {
        Command::Search { ingredients, limit } => {
            session.search(&ingredients, limit.unwrap_or(default_limit))?
        }
        Command::Another { ingredients, exclude } => session.another_excluding(&ingredients, exclude)?,
        Command::Save { id } => session.save_catalog(id)?,
        Command::Saved => session.saved()?,
        Command::Remove { id } => session.remove(id)?,
        Command::Generate { ingredients, save } => {
            let text = session.generate(Some(&ingredients)).await;
            if save && session.generated().is_some() {
                format!("{text}\n{}", session.save_generated()?)
            } else {
                text
            }
        }
        Command::Interactive => {
            return interactive(
                session,
                BufReader::new(tokio::io::stdin()),
                &mut std::io::stdout(),
                &mut std::io::stderr(),
            )
            .await;
        }
        Command::Init { .. } | Command::Import { .. } => return Ok(()),
    };
    println!("{text}");
    Ok(())
}

/// Read commands from `input` until EOF or `quit`. A failing command is
/// reported on `errors` and the loop keeps reading.
async fn interactive<G, R, W, E>(
    session: &mut Session<G>,
    input: R,
    out: &mut W,
    errors: &mut E,
) -> Result<()>
where
    G: TextGenerator,
    R: AsyncBufRead + Unpin,
    W: std::io::Write,
    E: std::io::Write,
{
    writeln!(out, "Pantry: type 'help' for commands, 'quit' to leave.")?;
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match session.handle(&line).await {
            Ok(Flow::Continue(text)) if text.is_empty() => {}
            Ok(Flow::Continue(text)) => writeln!(out, "{text}")?,
            Ok(Flow::Quit) => break,
            Err(e) => {
                warn!(error = %e, "Command failed");
                writeln!(errors, "error: {e:#}")?;
            }
        }
    }
    Ok(())
}
