//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let rendered = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            print!("{}", rendered);
        }

        ConfigAction::Path => {
            println!("{}", Settings::default_config_path().display());
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            // Write the defaults out first so the editor has a file to open
            if !config_path.exists() {
                settings.save_to(&config_path)?;
                Output::info(&format!(
                    "Created default config at {}",
                    config_path.display()
                ));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => Output::success("Config saved."),
                Ok(_) => Output::warning("Editor exited with non-zero status."),
                Err(e) => {
                    Output::error(&format!("Failed to launch {}: {}", editor, e));
                    Output::info(&format!("Config file is at: {}", config_path.display()));
                }
            }
        }
    }

    Ok(())
}
