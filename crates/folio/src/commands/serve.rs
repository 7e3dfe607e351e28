//! Development server command.

use std::path::Path;

use anyhow::Result;
use folio_server::DevServer;

use crate::config::Config;

/// Command-line overrides for the dev server.
#[derive(Debug, Default)]
pub struct ServeOptions {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub no_open: bool,
    pub no_reload: bool,
}

/// Run the dev server.
pub async fn run(config_path: &Path, options: ServeOptions) -> Result<()> {
    let config = Config::load(config_path)?;

    let mut server_config = config.server_config();
    if let Some(port) = options.port {
        server_config.port = port;
    }
    if let Some(host) = options.host {
        server_config.host = host;
    }
    if options.no_open {
        server_config.open = false;
    }
    if options.no_reload {
        server_config.live_reload = false;
    }

    let site = config.build_site()?;

    tracing::info!(
        "Starting development server on {}:{}",
        server_config.host,
        server_config.port
    );

    DevServer::new(server_config, site).start().await?;

    Ok(())
}
