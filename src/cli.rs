use clap::{Args, Parser, Subcommand};
use log::info;
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::error::{ChefError, Result};
use crate::extract::ExtractInput;
use crate::model::{RecipeUpdate, StagedRecipe};
use crate::pipelines::{Chef, UpdateInput};

#[derive(Parser, Debug)]
#[command(name = "chef-digital")]
#[command(about = "Chef Digital - personal recipe manager", long_about = None)]
pub struct Cli {
    /// sqlx connection string, overriding the configured database
    #[arg(long, global = true, env = "CHEF_DATABASE_URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize and store a new recipe
    Add {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Edit fields of a stored recipe, or replace it from new input
    Update {
        /// Recipe ID
        id: String,

        /// New title
        #[arg(long, conflicts_with_all = ["text", "image", "video"])]
        title: Option<String>,

        /// New source URL; an empty value clears it
        #[arg(long, conflicts_with_all = ["text", "image", "video"])]
        source_url: Option<String>,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Search by exact title, then ingredients, then list everything
    Search {
        /// Search query
        query: String,
    },

    /// Find a recipe on the web
    Discover {
        /// What to look for, e.g. "vegan lasagna"
        query: String,

        /// Store the discovered recipe instead of only showing it
        #[arg(long)]
        confirm: bool,
    },

    /// List every stored recipe
    List,

    /// Show one recipe
    Show {
        /// Recipe ID
        id: String,
    },
}

/// Raw recipe input; at most one of these may be given
#[derive(Args, Debug, Default)]
#[group(multiple = false)]
pub struct InputArgs {
    /// Recipe text
    #[arg(long)]
    pub text: Option<String>,

    /// Photo of a recipe
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Recipe video link (YouTube)
    #[arg(long, value_name = "URL")]
    pub video: Option<String>,
}

impl InputArgs {
    /// Read the given input, or `None` when no input flag was passed
    pub async fn into_input(self) -> Result<Option<ExtractInput>> {
        if let Some(text) = self.text {
            return Ok(Some(ExtractInput::text(text)));
        }
        if let Some(video) = self.video {
            return Ok(Some(ExtractInput::video(video)));
        }
        if let Some(path) = self.image {
            let bytes = tokio::fs::read(&path).await.map_err(|e| {
                ChefError::Extraction(format!("cannot read {}: {e}", path.display()))
            })?;
            return Ok(Some(ExtractInput::image(bytes)));
        }
        Ok(None)
    }
}

/// Run one command against `chef` and return its JSON output
pub async fn run(command: Commands, chef: &Chef) -> Result<Value> {
    match command {
        Commands::Add { input } => {
            let input = input.into_input().await?.ok_or_else(|| {
                ChefError::Validation("Pass one of --text, --image or --video.".to_string())
            })?;
            Ok(serde_json::to_value(chef.ingest_add(input).await?)?)
        }
        Commands::Update {
            id,
            title,
            source_url,
            input,
        } => {
            let update = match input.into_input().await? {
                Some(raw) => UpdateInput::Resubmit(raw),
                None => {
                    let fields = RecipeUpdate {
                        title,
                        source_url: source_url.map(|url| Some(url).filter(|u| !u.trim().is_empty())),
                        ..RecipeUpdate::default()
                    };
                    if fields.is_empty() {
                        return Err(ChefError::Validation(
                            "Nothing to update. Pass --title, --source-url or new input."
                                .to_string(),
                        ));
                    }
                    UpdateInput::Fields(fields)
                }
            };
            Ok(serde_json::to_value(chef.ingest_update(&id, update).await?)?)
        }
        Commands::Search { query } => {
            let (tier, recipes) = chef.search_with_tier(&query).await?;
            Ok(json!({ "tier": tier, "recipes": recipes }))
        }
        Commands::Discover { query, confirm } => {
            let staged: StagedRecipe = chef.discover(&query).await?;
            if confirm {
                let stored = chef.confirm(staged).await?;
                info!("Stored discovered recipe {}", stored.id);
                Ok(serde_json::to_value(stored)?)
            } else {
                Ok(serde_json::to_value(staged)?)
            }
        }
        Commands::List => Ok(serde_json::to_value(chef.list().await?)?),
        Commands::Show { id } => Ok(serde_json::to_value(chef.get(&id).await?)?),
    }
}
