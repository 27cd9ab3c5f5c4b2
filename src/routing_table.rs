// Forwarding table container. The core only ever mutates it through this
// documented API, but the crate has to own a concrete implementation to
// be runnable, so it lives here rather than behind a trait like
// `Interface`.

use std::net::Ipv4Addr;

/// `next_hop` is `0.0.0.0` for directly attached subnets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtEntry {
    pub destination_subnet: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub next_hop_router_id: Ipv4Addr,
    pub egress_interface: String,
    pub distance: u32,
}

#[derive(Debug, Default)]
pub struct RoutingTable {
    entries: Vec<RtEntry>,
}

impl RoutingTable {
    pub fn new() -> Self {
        RoutingTable {
            entries: Vec::new(),
        }
    }

    pub fn clear_rtable(&mut self) {
        self.entries.clear();
    }

    /// Installs a default gateway if configured; this deployment has none,
    /// so it is a documented no-op kept for parity with the rest of the
    /// mutator API.
    pub fn init_rtable(&mut self) {}

    pub fn new_rt_entry(
        destination_subnet: Ipv4Addr,
        mask: Ipv4Addr,
        next_hop_router_id: Ipv4Addr,
        egress_interface: String,
        distance: u32,
    ) -> RtEntry {
        RtEntry {
            destination_subnet,
            mask,
            next_hop_router_id,
            egress_interface,
            distance,
        }
    }

    pub fn add_rt_entry(&mut self, entry: RtEntry) {
        self.entries.push(entry);
    }

    pub fn find_mut(&mut self, destination_subnet: Ipv4Addr) -> Option<&mut RtEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.destination_subnet == destination_subnet)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RtEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
