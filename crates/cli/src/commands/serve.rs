//! `abbi serve`: Start the HTTP server.

use std::path::Path;

use abbi_core::ProviderFamily;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
    host_override: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = port_override {
        config.server.port = port;
    }
    if let Some(host) = host_override {
        config.server.host = host;
    }

    let configured: Vec<&str> = ProviderFamily::ALL
        .iter()
        .filter(|f| config.credential(**f).is_some())
        .map(|f| f.as_str())
        .collect();

    println!("ABBI server");
    println!("   Listening:     {}:{}", config.server.host, config.server.port);
    println!("   Gateway:       {}", config.gateway.url);
    println!("   Default model: {}", config.default_model);
    if configured.is_empty() {
        println!("   Credentials:   none (every provider call will be rejected upstream)");
    } else {
        println!("   Credentials:   {}", configured.join(", "));
    }

    abbi_server::start(config).await?;

    Ok(())
}
