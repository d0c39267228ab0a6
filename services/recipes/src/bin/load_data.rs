//! Loads catalog fixtures into the recipes database.
//!
//! ```bash
//! load-data --database-url postgres://localhost/foodgram ingredients data/ingredients.json
//! load-data tags data/tags.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use sea_orm::Database;
use serde::de::DeserializeOwned;
use tracing::info;

use foodgram_core::tracing::init_tracing;
use foodgram_recipes::infra::seed::{IngredientSeed, TagSeed, load_ingredients, load_tags};

#[derive(Parser)]
#[command(about = "Load ingredient and tag fixtures into the recipes database")]
struct Args {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a JSON array of `{name, measurement_unit}` objects
    Ingredients { path: PathBuf },
    /// Load a JSON array of `{name, color, slug}` objects
    Tags { path: PathBuf },
}

async fn read_fixture<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parse {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info");
    let args = Args::parse();

    let db = Database::connect(&args.database_url)
        .await
        .context("connect to database")?;

    match args.command {
        Command::Ingredients { path } => {
            let seeds: Vec<IngredientSeed> = read_fixture(&path).await?;
            let inserted = load_ingredients(&db, &seeds).await?;
            info!(total = seeds.len(), inserted, "ingredients loaded");
        }
        Command::Tags { path } => {
            let seeds: Vec<TagSeed> = read_fixture(&path).await?;
            let inserted = load_tags(&db, &seeds).await?;
            info!(total = seeds.len(), inserted, "tags loaded");
        }
    }
    Ok(())
}
