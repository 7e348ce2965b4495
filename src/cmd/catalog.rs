use anyhow::{Context, Result};

use scanstation::client::{HttpStationClient, StationApi};
use scanstation::protocol::CatalogKind;
use scanstation::station_config::StationConfig;
use scanstation::ui::RequestSpinner;

pub async fn cmd_catalog(config: &StationConfig, kind: CatalogKind) -> Result<()> {
    let client = HttpStationClient::new(config.server())?;
    let spinner = RequestSpinner::start(format!("Loading {}", kind));
    let items = match client.catalog(kind).await {
        Ok(items) => {
            spinner.clear();
            items
        }
        Err(e) => {
            spinner.fail(format!("Failed to load {}", kind));
            return Err(e).with_context(|| format!("Failed to load catalog '{}'", kind));
        }
    };

    for item in &items {
        println!("{}", item);
    }
    Ok(())
}
