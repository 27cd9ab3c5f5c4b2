// Shortest-Path-First / routing-table builder.
//
// Builds a transient, index-keyed adjacency matrix from the LSDB's stored
// order, runs Dijkstra from the local router, and emits routing-table
// entries. Tolerates inconsistent LSDB snapshots — missing back-links or
// dangling references simply leave a destination unreachable.

use std::net::Ipv4Addr;

use log::warn;

use crate::error::MospfError;
use crate::lsdb::Lsa;
use crate::routing_table::RoutingTable;
use crate::state::CoreState;

pub const MAX_DIST: u32 = u32::MAX;

/// Recompute the routing table from the current LSDB. Caller is
/// responsible for lock order: acquire the core lock before the routing
/// table lock.
pub fn rebuild_routing_table(core: &CoreState, rt: &mut RoutingTable) {
    rt.clear_rtable();
    rt.init_rtable();

    let entries = core.lsdb.entries();
    let n = entries.len();
    let self_idx = match core.lsdb.index_of(core.router_id) {
        Some(i) => i,
        None => return,
    };

    let mut graph = vec![vec![false; n]; n];
    for (k, entry) in entries.iter().enumerate() {
        for lsa in &entry.lsas {
            if lsa.is_direct() {
                continue;
            }
            if let Some(j) = entries.iter().position(|e| e.router_id == lsa.advertising_rid) {
                graph[k][j] = true;
            }
        }
    }

    let rids: Vec<Ipv4Addr> = entries.iter().map(|e| e.router_id).collect();
    let (dist, gw) = dijkstra(&graph, self_idx, &rids);

    for (j, entry) in entries.iter().enumerate() {
        if dist[j] == MAX_DIST {
            continue; // unreachable: omit, tolerating dangling LSA references
        }
        for lsa in &entry.lsas {
            emit_entry(core, rt, lsa, dist[j], gw[j]);
        }
    }
}

/// Plain Dijkstra over a boolean adjacency matrix with unit edge weights.
/// `gw[v]` carries the first-hop neighbor router id propagated from the
/// predecessor during relaxation. `rids` gives each index's router id,
/// needed only to seed the first hop off `source`.
fn dijkstra(graph: &[Vec<bool>], source: usize, rids: &[Ipv4Addr]) -> (Vec<u32>, Vec<Ipv4Addr>) {
    let n = graph.len();
    let mut dist = vec![MAX_DIST; n];
    let mut gw = vec![Ipv4Addr::UNSPECIFIED; n];
    let mut visited = vec![false; n];
    dist[source] = 0;

    for _ in 0..n.saturating_sub(1) {
        let u = (0..n)
            .filter(|&i| !visited[i] && dist[i] != MAX_DIST)
            .min_by_key(|&i| dist[i]);
        let u = match u {
            Some(u) => u,
            None => break,
        };
        visited[u] = true;
        for v in 0..n {
            if !graph[u][v] || visited[v] {
                continue;
            }
            let candidate = dist[u].saturating_add(1);
            if candidate < dist[v] {
                dist[v] = candidate;
                // First hop off the source is v itself (its own rid);
                // everything further out inherits the predecessor's gateway.
                gw[v] = if u == source { rids[v] } else { gw[u] };
            }
        }
    }
    (dist, gw)
}

fn emit_entry(core: &CoreState, rt: &mut RoutingTable, lsa: &Lsa, distance: u32, gw: Ipv4Addr) {
    match rt.find_mut(lsa.subnet) {
        Some(existing) if distance < existing.distance => {
            if let Some((next_hop, iface_name, mask)) = resolve_egress(core, gw, lsa) {
                existing.next_hop_router_id = next_hop;
                existing.egress_interface = iface_name;
                existing.mask = mask;
                existing.distance = distance;
            } else {
                let err = MospfError::ForwardingMiss(format!(
                    "no egress interface for gateway {}, leaving existing route to {} in place",
                    gw, lsa.subnet
                ));
                warn!("{}", err);
            }
        }
        Some(_) => {} // an equal-or-closer candidate already claimed this subnet
        None => match resolve_egress(core, gw, lsa) {
            Some((next_hop, iface_name, mask)) => {
                rt.add_rt_entry(RoutingTable::new_rt_entry(
                    lsa.subnet,
                    mask,
                    next_hop,
                    iface_name,
                    distance,
                ));
            }
            None => {
                let err = MospfError::ForwardingMiss(format!(
                    "no egress interface for gateway {}, skipping route to {}",
                    gw, lsa.subnet
                ));
                warn!("{}", err);
            }
        },
    }
}

fn resolve_egress(
    core: &CoreState,
    gw: Ipv4Addr,
    lsa: &Lsa,
) -> Option<(Ipv4Addr, String, Ipv4Addr)> {
    if gw == Ipv4Addr::UNSPECIFIED {
        let idx = core.iface_for_subnet(lsa.subnet, lsa.mask)?;
        let iface = &core.ifaces[idx].iface;
        Some((Ipv4Addr::UNSPECIFIED, iface.name().to_string(), iface.mask()))
    } else {
        let idx = core.iface_for_gateway(gw)?;
        let iface = &core.ifaces[idx].iface;
        Some((gw, iface.name().to_string(), iface.mask()))
    }
}
