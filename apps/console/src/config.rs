//! Node configuration loading: defaults, optional TOML file, env overrides.

use std::{env, fs, path::Path};

use anyhow::{Context, Result};
use shared::config::NodeConfig;

pub fn load_node_config(path: Option<&Path>) -> Result<NodeConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            parse_node_config(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?
        }
        None => NodeConfig::default(),
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

fn parse_node_config(raw: &str) -> Result<NodeConfig> {
    Ok(toml::from_str(raw)?)
}

fn apply_env_overrides(config: &mut NodeConfig) {
    if let Ok(v) = env::var("NODE_HOST") {
        config.host = v;
    }
    if let Ok(v) = env::var("NODE_TCP_PORT") {
        if let Ok(parsed) = v.parse::<u16>() {
            config.tcp_port = parsed;
        }
    }
    if let Ok(v) = env::var("NODE_CLUSTER_ID") {
        if let Ok(parsed) = v.parse::<u32>() {
            config.cluster_id = parsed;
        }
    }
    if let Ok(v) = env::var("NODE_LOG_LEVEL") {
        config.log_level = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
