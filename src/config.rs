// Router configuration: a TOML file per host, looked up by hostname.
// Router identity is derived from the first configured interface's IPv4.

use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use serde::Deserialize;

use crate::error::{MospfError, Result};
use crate::iface::{DEFAULT_HELLO_INTERVAL_SEC, DEFAULT_LSUINT_SEC};

#[derive(Debug, Deserialize, Clone)]
pub struct InterfaceConfig {
    pub name: String,
    pub address: Ipv4Addr,
    pub mask: Ipv4Addr,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default = "default_hello_interval")]
    pub hello_interval: u64,
}

fn default_hello_interval() -> u64 {
    DEFAULT_HELLO_INTERVAL_SEC
}

#[derive(Debug, Deserialize, Clone)]
pub struct RouterConfig {
    #[serde(default)]
    pub area_id: u32,
    #[serde(default = "default_lsuint")]
    pub lsuint: u64,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_control_port")]
    pub control_port: u16,
    pub interfaces: Vec<InterfaceConfig>,
}

fn default_control_port() -> u16 {
    8902
}

fn default_lsuint() -> u64 {
    DEFAULT_LSUINT_SEC
}

fn default_port() -> u16 {
    8901
}

impl RouterConfig {
    /// Router id is the first configured interface's address.
    pub fn router_id(&self) -> Result<Ipv4Addr> {
        self.interfaces
            .first()
            .map(|i| i.address)
            .ok_or_else(|| MospfError::ConfigError("router config has no interfaces".into()))
    }
}

/// Reads `<config_dir>/config_<hostname>.toml`.
pub fn read_router_config(config_dir: &str) -> Result<RouterConfig> {
    let hostname = local_hostname()?;
    let config_path = format!("{}/config_{}.toml", config_dir, hostname);

    if !Path::new(&config_path).exists() {
        return Err(MospfError::ConfigError(format!(
            "config file not found: {} (available: {})",
            config_path,
            list_available_configs(config_dir)
        )));
    }

    let content = fs::read_to_string(&config_path)
        .map_err(|e| MospfError::ConfigError(format!("failed to read {}: {}", config_path, e)))?;
    let config: RouterConfig = toml::from_str(&content)
        .map_err(|e| MospfError::ConfigError(format!("failed to parse {}: {}", config_path, e)))?;

    log::info!("loaded configuration for router: {}", hostname);
    log::debug!("config: {:?}", config);
    Ok(config)
}

fn local_hostname() -> Result<String> {
    hostname::get()
        .map_err(|e| MospfError::ConfigError(format!("failed to get hostname: {}", e)))?
        .to_string_lossy()
        .to_string()
        .split('.')
        .next()
        .map(|s| s.to_string())
        .ok_or_else(|| MospfError::ConfigError("invalid hostname".into()))
}

fn list_available_configs(config_dir: &str) -> String {
    match fs::read_dir(config_dir) {
        Ok(entries) => entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? == "toml" {
                    path.file_name()?.to_str().map(str::to_string)
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join(", "),
        Err(_) => "unable to list config directory".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_id_is_first_interface_address() {
        let config = RouterConfig {
            area_id: 0,
            lsuint: 30,
            port: 8901,
            control_port: 8902,
            interfaces: vec![InterfaceConfig {
                name: "eth0".into(),
                address: Ipv4Addr::new(10, 0, 1, 1),
                mask: Ipv4Addr::new(255, 255, 255, 0),
                mac: None,
                hello_interval: 5,
            }],
        };
        assert_eq!(config.router_id().unwrap(), Ipv4Addr::new(10, 0, 1, 1));
    }

    #[test]
    fn router_id_fails_on_empty_interfaces() {
        let config = RouterConfig {
            area_id: 0,
            lsuint: 30,
            port: 8901,
            control_port: 8902,
            interfaces: vec![],
        };
        assert!(config.router_id().is_err());
    }
}
