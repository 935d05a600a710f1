//! `abbi boot-context`: Print the active skill listing.

use std::path::Path;

use abbi_context::skills;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let gateway = super::gateway_client(&config)?;

    let payload = skills::boot_context(&gateway).await?;
    super::print_json(&payload)
}
