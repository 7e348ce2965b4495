//! Configuration view and validation commands — `scanstation config`.

use anyhow::Result;
use std::path::Path;

use super::super::ConfigCommands;

pub fn cmd_config(explicit: Option<&Path>, cwd: &Path, command: Option<ConfigCommands>) -> Result<()> {
    use scanstation::station_config::{
        CONFIG_DIR_NAME, CONFIG_FILE_NAME, StationConfig, StationToml, config_search_paths,
    };

    let existing = match explicit {
        Some(path) => path.exists().then(|| path.to_path_buf()),
        None => config_search_paths(cwd).into_iter().find(|p| p.exists()),
    };

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Station Configuration");
            println!("=====================");
            println!();

            match &existing {
                Some(path) => println!("Config file: {}", path.display()),
                None => {
                    println!("No station.toml found. Using defaults.");
                    println!("Run 'scanstation config init' to create one.");
                }
            }
            println!();

            let config = StationConfig::discover(existing.as_deref(), cwd)?;
            let toml = &config.toml;

            println!("[server]");
            println!("  base_url = \"{}\"", toml.server.base_url);
            println!("  timeout_secs = {}", toml.server.timeout_secs);
            println!("  order_path = \"{}\"", toml.server.order_path);
            if let Some(chat_id) = &toml.server.chat_id {
                println!("  chat_id = \"{}\"", chat_id);
            }
            println!();

            println!("[scanner]");
            println!("  mode = \"{}\"", toml.scanner.mode);
            if let Some(station) = toml.scanner.default_station {
                println!("  default_station = \"{}\"", station);
            }
            println!();

            println!("[order]");
            println!("  delivery_types = {:?}", toml.order.delivery_types);
            println!("  regions = {}", toml.order.regions.len());
            println!("  max_photo_bytes = {}", toml.order.max_photo_bytes);
            println!();

            println!("[logging]");
            println!("  level = \"{}\"", toml.logging.level);
            println!("  json = {}", toml.logging.json);
            if let Some(dir) = &toml.logging.directory {
                println!("  directory = \"{}\"", dir.display());
            }
            println!();
            println!("Values include SCANSTATION_* environment overrides.");
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let Some(path) = existing else {
                println!("No station.toml found. Using defaults (valid).");
                return Ok(());
            };

            let toml = StationToml::load(&path)?;
            let warnings = toml.validate();

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
            let target = match explicit {
                Some(path) => path.to_path_buf(),
                None => cwd.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME),
            };
            if target.exists() {
                println!("station.toml already exists at {}", target.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            StationToml::default().save(&target)?;

            println!("Created station.toml at {}", target.display());
            println!();
            println!("You can now customize:");
            println!("  - [server] base_url, timeout_secs, chat_id");
            println!("  - [scanner] mode, default_station");
            println!("  - [order] delivery_types, regions, max_photo_bytes");
            println!();
        }
    }

    Ok(())
}
