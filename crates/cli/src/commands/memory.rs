//! `abbi memory`: Shared memory through the tool gateway.

use std::path::Path;

use abbi_context::{MemoryFilter, MemoryWrite, hivemind};

pub async fn read(
    config_path: Option<&Path>,
    filter: MemoryFilter,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let gateway = super::gateway_client(&config)?;

    let payload = hivemind::read(&gateway, &filter).await?;
    super::print_json(&payload)
}

pub async fn write(
    config_path: Option<&Path>,
    entry: MemoryWrite,
) -> Result<(), Box<dyn std::error::Error>> {
    entry.validate()?;

    let config = super::load_config(config_path)?;
    let gateway = super::gateway_client(&config)?;

    let reply = hivemind::write(&gateway, &entry).await?;
    super::print_json(&reply)
}
