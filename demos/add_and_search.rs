//! Add a recipe from text, then search for it
//!
//! Needs an API key for the configured provider (OPENAI_API_KEY by default).
//! Uses an in-memory database so nothing is left behind.

use chef_digital::{Chef, ExtractInput, RecipeUpdate, UpdateInput};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let chef = Chef::builder()
        .database_url("sqlite::memory:")
        .build()
        .await?;

    println!("=== Add ===");
    let recipe = chef
        .ingest_add(ExtractInput::text(
            "Garlic butter pasta. Boil 200g spaghetti. Melt 50g butter with 3 cloves \
             of minced garlic, toss with the pasta and finish with parmesan.",
        ))
        .await?;
    println!("{}", serde_json::to_string_pretty(&recipe)?);

    println!("\n=== Rename ===");
    let renamed = chef
        .ingest_update(
            &recipe.id,
            UpdateInput::Fields(RecipeUpdate {
                title: Some(format!("{} (quick)", recipe.title)),
                ..RecipeUpdate::default()
            }),
        )
        .await?;
    println!("Now called: {}", renamed.title);

    println!("\n=== Search ===");
    for query in [renamed.title.as_str(), "garlic", "tiramisu"] {
        let (tier, found) = chef.search_with_tier(query).await?;
        println!("{query:>20} -> {tier:?}: {} recipe(s)", found.len());
    }

    Ok(())
}
