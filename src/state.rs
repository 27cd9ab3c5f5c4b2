// Shared daemon state.
//
// `Daemon` owns two locks: `core` (the coarse lock guarding
// interfaces/neighbors/LSDB/flags/sequence) and `rt` (a separate lock
// guarding the forwarding table). Lock order is strict: acquire `core`
// before `rt`, never the reverse.

use std::net::Ipv4Addr;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::iface::{neighbor_timeout_secs, IfaceState, Interface, DEFAULT_LSUINT_SEC};
use crate::lsdb::Lsdb;
use crate::routing_table::RoutingTable;

pub struct CoreState {
    pub router_id: Ipv4Addr,
    pub area_id: u32,
    pub sequence_num: u16,
    pub lsuint: u64,
    pub left_interval: u64,
    pub topology_dirty: bool,
    pub ifaces: Vec<IfaceState>,
    pub lsdb: Lsdb,
}

impl CoreState {
    pub fn neighbor_timeout(&self, iface_idx: usize) -> u32 {
        neighbor_timeout_secs(self.ifaces[iface_idx].iface.hello_interval())
    }

    pub fn find_iface_idx(&self, name: &str) -> Option<usize> {
        self.ifaces.iter().position(|i| i.iface.name() == name)
    }

    /// The interface whose `ip & mask` contains `subnet`.
    pub fn iface_for_subnet(&self, subnet: Ipv4Addr, mask: Ipv4Addr) -> Option<usize> {
        self.ifaces.iter().position(|state| {
            let iface = &state.iface;
            apply_mask(iface.ipv4_addr(), mask) == subnet && iface.mask() == mask
        })
    }

    /// The interface that has a neighbor with router id `gw`.
    pub fn iface_for_gateway(&self, gw: Ipv4Addr) -> Option<usize> {
        self.ifaces
            .iter()
            .position(|state| state.neighbors.iter().any(|n| n.router_id == gw))
    }
}

pub fn apply_mask(addr: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    let a = u32::from(addr);
    let m = u32::from(mask);
    Ipv4Addr::from(a & m)
}

pub struct Daemon {
    pub core: Mutex<CoreState>,
    pub rt: Mutex<RoutingTable>,
}

impl Daemon {
    pub fn new(router_id: Ipv4Addr, area_id: u32, ifaces: Vec<Arc<dyn Interface>>) -> Self {
        let ifaces = ifaces.into_iter().map(IfaceState::new).collect();
        Daemon {
            core: Mutex::new(CoreState {
                router_id,
                area_id,
                sequence_num: 0,
                lsuint: DEFAULT_LSUINT_SEC,
                left_interval: DEFAULT_LSUINT_SEC,
                topology_dirty: false,
                ifaces,
                lsdb: Lsdb::new(),
            }),
            rt: Mutex::new(RoutingTable::new()),
        }
    }
}
