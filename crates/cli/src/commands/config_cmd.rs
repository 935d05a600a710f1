//! `abbi config`: Configuration management commands.

use std::path::{Path, PathBuf};

use abbi_config::AppConfig;
use abbi_core::ProviderFamily;

pub fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    println!("{}", config.redacted_toml());
    Ok(())
}

pub fn path(config_path: Option<&Path>) {
    println!("{}", resolved_path(config_path).display());
}

fn resolved_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

pub fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating {}", resolved_path(config_path).display());

    let config = match super::load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("   Config error: {e}");
            return Err(e);
        }
    };
    println!("   Config parsed successfully");

    let missing: Vec<&str> = ProviderFamily::ALL
        .iter()
        .filter(|f| config.credential(**f).is_none())
        .map(|f| f.as_str())
        .collect();
    if !missing.is_empty() {
        println!("   No credential for: {}", missing.join(", "));
    }

    println!();
    println!("   Model:     {}", config.default_model);
    println!("   Server:    {}:{}", config.server.host, config.server.port);
    println!("   Gateway:   {}", config.gateway.url);
    println!(
        "   Context:   {} memory entries, {} skills, {} ms deadline",
        config.context.memory_limit, config.context.skills_limit, config.context.deadline_ms
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_under_config_dir() {
        let path = resolved_path(None);
        assert!(path.ends_with(".abbi/config.toml"));
    }

    #[test]
    fn explicit_path_wins() {
        let path = resolved_path(Some(Path::new("/etc/abbi.toml")));
        assert_eq!(path, PathBuf::from("/etc/abbi.toml"));
    }
}
