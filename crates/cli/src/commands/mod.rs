pub mod boot_context;
pub mod config_cmd;
pub mod memory;
pub mod route;
pub mod serve;

use std::path::Path;

use abbi_config::AppConfig;
use abbi_context::GatewayClient;

/// Load from `path` when given, otherwise from the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    config.map_err(|e| format!("Failed to load config: {e}").into())
}

pub fn gateway_client(config: &AppConfig) -> Result<GatewayClient, Box<dyn std::error::Error>> {
    Ok(GatewayClient::from_config(&config.gateway)?)
}

pub fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
