// LSU Generator: every second, checks under the coarse lock whether the
// topology is dirty or the refresh timer has elapsed; on trigger,
// rebuilds the self-LSA, floods it, and recomputes SPF.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use log::warn;
use tokio::time::interval;

use crate::iface::IfaceState;
use crate::lsdb::Lsa;
use crate::spf::rebuild_routing_table;
use crate::state::{CoreState, Daemon};
use crate::wire::header::TYPE_LSU;
use crate::wire::{LsuPayload, MospfHeader, Packet, MAX_LSU_TTL};

pub async fn run(daemon: Arc<Daemon>) {
    let mut ticker = interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;

        let mut core = daemon.core.lock().await;
        core.left_interval = core.left_interval.saturating_sub(1);
        if !core.topology_dirty && core.left_interval != 0 {
            continue;
        }

        core.topology_dirty = false;
        core.left_interval = core.lsuint;

        let lsas = build_self_lsas(&core.ifaces);
        core.sequence_num = core.sequence_num.wrapping_add(1);
        let router_id = core.router_id;
        let area_id = core.area_id;
        let sequence_num = core.sequence_num;
        core.lsdb.install_self(router_id, sequence_num, lsas.clone());

        flood_to_neighbors(&core, router_id, area_id, sequence_num, &lsas).await;

        let mut rt = daemon.rt.lock().await;
        rebuild_routing_table(&core, &mut rt);
        let entries: Vec<_> = rt.iter().cloned().collect();
        drop(rt);
        tokio::spawn(crate::sysroute::sync_entries(entries));
    }
}

/// One LSA per interface if it has no neighbors, else one LSA per
/// neighbor. A router with no neighbors at all still advertises one
/// direct LSA per interface.
fn build_self_lsas(ifaces: &[IfaceState]) -> Vec<Lsa> {
    let mut lsas = Vec::new();
    for iface_state in ifaces {
        let iface = &iface_state.iface;
        if iface_state.neighbors.is_empty() {
            lsas.push(Lsa {
                subnet: crate::state::apply_mask(iface.ipv4_addr(), iface.mask()),
                mask: iface.mask(),
                advertising_rid: Ipv4Addr::UNSPECIFIED,
            });
        } else {
            for nbr in &iface_state.neighbors {
                lsas.push(Lsa {
                    subnet: crate::state::apply_mask(nbr.ip, nbr.mask),
                    mask: nbr.mask,
                    advertising_rid: nbr.router_id,
                });
            }
        }
    }
    lsas
}

async fn flood_to_neighbors(core: &CoreState, router_id: Ipv4Addr, area_id: u32, sequence_num: u16, lsas: &[Lsa]) {
    let payload = LsuPayload {
        sequence: sequence_num,
        ttl: MAX_LSU_TTL,
        lsas: lsas.to_vec(),
    };
    let bytes = Packet::Lsu(MospfHeader::new(TYPE_LSU, router_id, area_id), payload).encode();

    for iface_state in &core.ifaces {
        for nbr in &iface_state.neighbors {
            if let Err(e) = iface_state.iface.send_packet_by_arp(nbr.ip, &bytes).await {
                warn!(
                    "failed to send LSU to {} via {}: {}",
                    nbr.ip,
                    iface_state.iface.name(),
                    e
                );
            }
        }
    }
}
