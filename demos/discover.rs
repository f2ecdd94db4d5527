//! Discover a recipe on the web and store it after confirmation
//!
//! Needs TAVILY_API_KEY and a key for the configured LLM provider.
//!
//! Usage: cargo run --example discover -- "vegan lasagna"

use chef_digital::{Chef, ChefError};
use std::io::{self, BufRead, Write};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "shakshuka".to_string());

    let chef = Chef::builder()
        .database_url("sqlite:target/demo-recipes.db")
        .build()
        .await?;

    let staged = match chef.discover(&query).await {
        Ok(staged) => staged,
        Err(err @ ChefError::NoResults(_)) => {
            println!("{}", err.user_message());
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    println!("Found at {}", staged.page_url);
    println!("{}", serde_json::to_string_pretty(&staged.recipe)?);

    print!("Save this recipe? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    if answer.trim().eq_ignore_ascii_case("y") {
        let stored = chef.confirm(staged).await?;
        println!("Saved as {}", stored.id);
    }

    Ok(())
}
