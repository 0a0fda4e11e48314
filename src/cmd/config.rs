//! Configuration view and validation commands: `editorial config`.

use anyhow::{Context, Result};

use editorial::editorial_config::{CONFIG_FILE, EditorialConfig, EditorialToml};
use editorial::init::write_default_config;

use super::super::ConfigCommands;
use super::effective_policy;

pub fn cmd_config(config: &EditorialConfig, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = config.config_file();

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Editorial Configuration");
            println!("=======================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
                println!();
                let toml = EditorialToml::load(&config_path)?;
                let rendered =
                    toml::to_string_pretty(&toml).context("Failed to render editorial.toml")?;
                for line in rendered.lines() {
                    println!("  {}", line);
                }
                println!();
            } else {
                println!("No {} found at {}", CONFIG_FILE, config_path.display());
                println!("Run 'editorial config init' to create one.");
                println!();
            }

            println!("Effective values (with env/CLI overrides):");
            println!("  data_dir = \"{}\"", config.data_dir().display());
            println!("  log_filter = \"{}\"", config.log_filter());
            println!("  log_format = \"{}\"", config.log_format());
            println!();

            println!("Effective review policy:");
            let policy = effective_policy(config);
            let rendered =
                toml::to_string_pretty(&policy).context("Failed to render review policy")?;
            for line in rendered.lines() {
                println!("  {}", line);
            }
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let mut warnings = config.validate();
            for warning in effective_policy(config).validate() {
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }

            if !config_path.exists() {
                println!("No {} found. Using defaults.", CONFIG_FILE);
            }
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            std::fs::create_dir_all(&config.editorial_dir).with_context(|| {
                format!(
                    "Failed to create directory: {}",
                    config.editorial_dir.display()
                )
            })?;

            if !write_default_config(&config.editorial_dir)? {
                println!("{} already exists at {}", CONFIG_FILE, config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            println!("Created {} at {}", CONFIG_FILE, config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [policy] score thresholds and auto-approval switches");
            println!("  - [storage] data_dir");
            println!("  - [logging] level, format");
            println!();
        }
    }

    Ok(())
}
