//! `abbi route`: Show how a model name is dispatched.

use std::path::Path;

use abbi_config::AppConfig;
use abbi_core::ChatRequest;
use abbi_providers::select_adapter;

pub fn run(config_path: Option<&Path>, model: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    for line in describe(model, &config) {
        println!("{line}");
    }
    Ok(())
}

/// Human-readable routing summary. Never includes the credential itself.
fn describe(model: &str, config: &AppConfig) -> Vec<String> {
    let adapter = select_adapter(model, config);
    let family = adapter.family();
    let built = adapter.build_request(&ChatRequest::new(Vec::new()).with_model(model), "");

    let credential = if config.credential(family).is_some() {
        "configured"
    } else {
        "missing"
    };

    vec![
        format!("Model:      {model}"),
        format!("Provider:   {family}"),
        format!("Endpoint:   {}", built.url),
        format!("Sent model: {}", built.body["model"].as_str().unwrap_or(model)),
        format!(
            "Credential: {credential} ({})",
            family.credential_env().join(" | ")
        ),
    ]
}
