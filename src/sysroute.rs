// Best-effort installation of computed routes into the OS routing table
// via `net-route`. This sits entirely outside the routing table's own
// mutator API; it's an optional side effect the caller may invoke once
// the table has been rebuilt, never a condition the protocol logic
// depends on.

use std::net::{IpAddr, Ipv4Addr};

use log::{info, warn};

use crate::error::Result;
use crate::routing_table::RtEntry;

fn prefix_len(mask: Ipv4Addr) -> u8 {
    u32::from(mask).count_ones() as u8
}

/// Installs (or updates) one OS route for a single routing-table entry.
/// Directly attached entries (`next_hop_router_id == 0.0.0.0`) are
/// skipped: the kernel already has a route for a locally attached
/// subnet.
pub async fn install_route(entry: &RtEntry) -> Result<()> {
    if entry.next_hop_router_id == Ipv4Addr::UNSPECIFIED {
        return Ok(());
    }

    let handle = net_route::Handle::new()
        .map_err(|e| crate::error::MospfError::RouteError(format!("cannot open routing handle (permissions?): {}", e)))?;

    let route = net_route::Route::new(IpAddr::V4(entry.destination_subnet), prefix_len(entry.mask))
        .with_gateway(IpAddr::V4(entry.next_hop_router_id));

    match handle.add(&route).await {
        Ok(()) => {
            info!(
                "installed system route {}/{} via {}",
                entry.destination_subnet,
                prefix_len(entry.mask),
                entry.next_hop_router_id
            );
            Ok(())
        }
        Err(e) => {
            let _ = handle.delete(&route).await;
            match handle.add(&route).await {
                Ok(()) => Ok(()),
                Err(e2) => {
                    warn!(
                        "failed to install system route {}/{} via {}: {} (retry: {})",
                        entry.destination_subnet,
                        prefix_len(entry.mask),
                        entry.next_hop_router_id,
                        e,
                        e2
                    );
                    Err(crate::error::MospfError::RouteError(e2.to_string()))
                }
            }
        }
    }
}

/// Installs every entry in `entries`; failures are logged and skipped,
/// never fatal. Takes owned entries so the caller can spawn this after
/// releasing the routing-table lock rather than holding it across the
/// syscalls.
pub async fn sync_entries(entries: Vec<RtEntry>) {
    for entry in &entries {
        let _ = install_route(entry).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_len_counts_mask_bits() {
        assert_eq!(prefix_len(Ipv4Addr::new(255, 255, 255, 0)), 24);
        assert_eq!(prefix_len(Ipv4Addr::new(255, 255, 255, 252)), 30);
    }
}
