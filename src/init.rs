// Daemon construction: binds one `UdpInterface` per configured
// interface and assembles the shared `Daemon` state.

use std::sync::Arc;

use crate::config::RouterConfig;
use crate::error::{MospfError, Result};
use crate::iface::{Interface, UdpInterface};
use crate::state::Daemon;

pub async fn build_daemon(config: &RouterConfig) -> Result<Arc<Daemon>> {
    let router_id = config.router_id()?;
    let mut ifaces: Vec<Arc<dyn Interface>> = Vec::with_capacity(config.interfaces.len());

    for iface_cfg in &config.interfaces {
        let mac = match &iface_cfg.mac {
            Some(s) => parse_mac(s)?,
            None => [0u8; 6],
        };
        let iface = UdpInterface::bind(
            iface_cfg.name.clone(),
            iface_cfg.address,
            iface_cfg.mask,
            mac,
            iface_cfg.hello_interval,
            config.port,
        )
        .await?;
        log::info!(
            "bound interface {} ({}/{})",
            iface_cfg.name,
            iface_cfg.address,
            iface_cfg.mask
        );
        ifaces.push(Arc::new(iface));
    }

    Ok(Arc::new(Daemon::new(router_id, config.area_id, ifaces)))
}

fn parse_mac(s: &str) -> Result<[u8; 6]> {
    let mut mac = [0u8; 6];
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 6 {
        return Err(MospfError::ConfigError(format!("invalid MAC address: {}", s)));
    }
    for (i, part) in parts.iter().enumerate() {
        mac[i] = u8::from_str_radix(part, 16)
            .map_err(|_| MospfError::ConfigError(format!("invalid MAC address: {}", s)))?;
    }
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_mac() {
        assert_eq!(parse_mac("01:00:5e:00:00:05").unwrap(), [0x01, 0x00, 0x5e, 0x00, 0x00, 0x05]);
    }

    #[test]
    fn rejects_malformed_mac() {
        assert!(parse_mac("not-a-mac").is_err());
    }
}
