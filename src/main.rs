use clap::Parser;
use log::{debug, error};
use std::process::ExitCode;

use chef_digital::cli::{self, Cli};
use chef_digital::{AppConfig, Chef, ChefError};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{} failed: {}", err.kind(), err);
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String, ChefError> {
    let config = AppConfig::load()?;
    debug!("Using provider {}", config.default_provider);

    let mut builder = Chef::builder().config(config);
    if let Some(url) = cli.database_url {
        builder = builder.database_url(url);
    }
    let chef = builder.build().await?;

    let output = cli::run(cli.command, &chef).await?;
    Ok(serde_json::to_string_pretty(&output)?)
}
