//! `objgate serve`: run the gateway server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use objgate_engine::{GatewayConfig, GatewayServer};

use crate::telemetry;

/// Flags given on the command line; each overrides the config file
pub struct ServeOptions {
    pub config: Option<PathBuf>,
    pub address: Option<String>,
    pub port: Option<u16>,
    pub auth_token: Option<String>,
    pub verbosity: u8,
}

fn load_config(options: &ServeOptions) -> anyhow::Result<GatewayConfig> {
    let mut config = match &options.config {
        Some(path) => GatewayConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GatewayConfig::default(),
    };
    if let Some(address) = &options.address {
        config.address = address.clone();
    }
    if let Some(port) = options.port {
        config.port = port;
    }
    if let Some(token) = &options.auth_token {
        config.auth_token = Some(token.clone());
    }
    config.validate()?;
    Ok(config)
}

pub fn execute(options: ServeOptions) -> anyhow::Result<()> {
    let config = load_config(&options)?;
    telemetry::init(options.verbosity, config.log_filter.as_deref());

    let gateway = Arc::new(super::stdlib_gateway());
    let server = GatewayServer::bind(gateway, &config)
        .with_context(|| format!("binding {}:{}", config.address, config.port))?;
    println!("objgate listening on {}", server.local_addr()?);

    server.serve()?;
    tracing::info!("server stopped");
    Ok(())
}
