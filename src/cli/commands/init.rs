//! Init command - interactive first-run setup.

use crate::cli::commands::open_warehouse;
use crate::cli::Output;
use crate::config::{SearchProvider, Settings};
use crate::store::Warehouse;
use console::style;
use std::io::{self, Write};

/// Run the init command for first-time setup.
pub async fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Sok Setup");
    println!();
    println!("Welcome to Sok! Let's make sure everything is configured correctly.\n");

    // Step 1: Check API configuration
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    if std::env::var("OPENAI_API_KEY").is_err() {
        Output::warning("OPENAI_API_KEY environment variable is not set.");
        println!();
        println!("  Sok requires an OpenAI API key for result summaries.");
        println!("  Get your API key from: {}", style("https://platform.openai.com/api-keys").underlined());
        println!();
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style("export OPENAI_API_KEY='sk-...'").green());
        println!();

        if !prompt_continue("Continue without API key?")? {
            println!();
            Output::info("Setup cancelled. Set your API key and run 'sok init' again.");
            return Ok(());
        }
    } else {
        Output::success("OpenAI API key is configured!");
    }

    if settings.search.provider == SearchProvider::Remote
        && std::env::var(&settings.search.api_key_env).is_err()
    {
        Output::warning(&format!(
            "{} is not set; remote searches will run unauthenticated.",
            settings.search.api_key_env
        ));
    }

    println!();

    // Step 2: Create data directory
    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    let data_dir = settings.data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    println!();

    // Step 3: Provision the warehouse
    println!("{}", style("Step 3: Provisioning warehouse").bold().cyan());
    println!();

    let warehouse = open_warehouse(settings)?;
    warehouse.provision().await?;
    Output::success(&format!(
        "Warehouse ready at: {}",
        settings.sqlite_path().display()
    ));

    println!();

    // Step 4: Create config file
    println!("{}", style("Step 4: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("sok config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Load your video catalog", style("sok load <catalog.csv>").cyan());
    println!("  {} Search it", style("sok search \"<query>\"").cyan());
    println!("  {} Serve the interactive API", style("sok serve").cyan());
    println!();
    println!("For more help: {}", style("sok --help").cyan());

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}
