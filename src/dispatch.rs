// Packet Dispatcher: entry point for every received mOSPF packet.
// Validation lives in `Packet::decode`; this module owns the HELLO/LSU
// handling, re-flooding, and triggering an SPF recompute on the receive
// path.

use std::net::Ipv4Addr;

use log::{error, warn};

use crate::spf::rebuild_routing_table;
use crate::state::{CoreState, Daemon};
use crate::wire::header::TYPE_LSU;
use crate::wire::{LsuPayload, MospfHeader, Packet};

/// Handle one inbound datagram received on interface `iface_idx` from
/// `src_ip`. Never returns an error: per-packet failures are logged and
/// dropped, never propagated.
pub async fn dispatch_packet(daemon: &Daemon, iface_idx: usize, src_ip: Ipv4Addr, buf: &[u8]) {
    let mut core = daemon.core.lock().await;
    let area_id = core.area_id;

    let packet = match Packet::decode(buf, area_id) {
        Ok(p) => p,
        Err(e) => {
            error!("dropping packet from {} on {}: {}", src_ip, core.ifaces[iface_idx].iface.name(), e);
            return;
        }
    };

    match packet {
        Packet::Hello(header, hello) => {
            handle_hello(&mut core, iface_idx, header.router_id, src_ip, hello.mask);
        }
        Packet::Lsu(header, lsu) => {
            handle_lsu(&mut core, daemon, iface_idx, header, lsu).await;
        }
    }
}

fn handle_hello(core: &mut CoreState, iface_idx: usize, rid: Ipv4Addr, sender_ip: Ipv4Addr, sender_mask: Ipv4Addr) {
    let timeout = core.neighbor_timeout(iface_idx);
    let dirtied = core.ifaces[iface_idx].observe_hello(rid, sender_ip, sender_mask, timeout);
    if dirtied {
        core.topology_dirty = true;
    }
}

async fn handle_lsu(core: &mut CoreState, daemon: &Daemon, received_on: usize, header: MospfHeader, lsu: LsuPayload) {
    let accepted = core.lsdb.accept_remote(header.router_id, lsu.sequence, lsu.lsas.clone());
    if !accepted {
        return; // equal-or-lower sequence number, already have this LSA set
    }

    reflood(core, received_on, &header, &lsu).await;

    // Recompute SPF on the receive path too, not just from the LSU
    // Generator's own periodic trigger.
    let mut rt = daemon.rt.lock().await;
    rebuild_routing_table(core, &mut rt);
    let entries: Vec<_> = rt.iter().cloned().collect();
    drop(rt);
    tokio::spawn(crate::sysroute::sync_entries(entries));
}

/// Re-flood an accepted LSU on every interface other than the one it
/// arrived on, addressed per-neighbor exactly as the LSU Generator does.
async fn reflood(core: &CoreState, received_on: usize, header: &MospfHeader, lsu: &LsuPayload) {
    if lsu.ttl == 0 {
        return;
    }
    let forwarded = LsuPayload {
        sequence: lsu.sequence,
        ttl: lsu.ttl - 1,
        lsas: lsu.lsas.clone(),
    };
    let packet = Packet::Lsu(MospfHeader::new(TYPE_LSU, header.router_id, header.area_id), forwarded);
    let bytes = packet.encode();

    for (idx, iface_state) in core.ifaces.iter().enumerate() {
        if idx == received_on {
            continue;
        }
        for nbr in &iface_state.neighbors {
            if let Err(e) = iface_state.iface.send_packet_by_arp(nbr.ip, &bytes).await {
                warn!(
                    "failed to re-flood LSU from {} to {} via {}: {}",
                    header.router_id,
                    nbr.ip,
                    iface_state.iface.name(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iface::{IfaceState, Interface};
    use crate::wire::{HelloPayload, Lsa};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex as StdMutex};

    #[derive(Default)]
    struct RecordingIface {
        name: String,
        addr: Ipv4Addr,
        mask: Ipv4Addr,
        sent_by_arp: StdMutex<Vec<(Ipv4Addr, Vec<u8>)>>,
    }

    #[async_trait]
    impl Interface for RecordingIface {
        fn name(&self) -> &str {
            &self.name
        }
        fn ipv4_addr(&self) -> Ipv4Addr {
            self.addr
        }
        fn mask(&self) -> Ipv4Addr {
            self.mask
        }
        fn mac(&self) -> [u8; 6] {
            [0; 6]
        }
        async fn send_packet(&self, _buf: &[u8]) -> crate::error::Result<()> {
            Ok(())
        }
        async fn send_packet_by_arp(&self, dst_ip: Ipv4Addr, buf: &[u8]) -> crate::error::Result<()> {
            self.sent_by_arp.lock().unwrap().push((dst_ip, buf.to_vec()));
            Ok(())
        }
        async fn recv_packet(&self, _buf: &mut [u8]) -> crate::error::Result<(usize, Ipv4Addr)> {
            std::future::pending().await
        }
    }

    fn recording_iface(name: &str, addr: [u8; 4]) -> Arc<RecordingIface> {
        Arc::new(RecordingIface {
            name: name.into(),
            addr: Ipv4Addr::from(addr),
            mask: Ipv4Addr::new(255, 255, 255, 0),
            sent_by_arp: StdMutex::new(Vec::new()),
        })
    }

    fn daemon_with_ifaces(router_id: Ipv4Addr, ifaces: Vec<Arc<RecordingIface>>) -> Daemon {
        let ifaces: Vec<Arc<dyn Interface>> = ifaces.into_iter().map(|i| i as Arc<dyn Interface>).collect();
        Daemon::new(router_id, 0, ifaces)
    }

    fn valid_hello_packet(router_id: Ipv4Addr, mask: Ipv4Addr) -> Vec<u8> {
        Packet::Hello(
            MospfHeader::new(crate::wire::header::TYPE_HELLO, router_id, 0),
            HelloPayload {
                mask,
                hello_interval: 5,
            },
        )
        .encode()
    }

    #[tokio::test]
    async fn hello_creates_neighbor_and_dirties_topology() {
        let local = Ipv4Addr::new(10, 0, 1, 1);
        let peer = Ipv4Addr::new(10, 0, 1, 2);
        let daemon = daemon_with_ifaces(local, vec![recording_iface("eth0", [10, 0, 1, 1])]);

        let buf = valid_hello_packet(peer, Ipv4Addr::new(255, 255, 255, 0));
        dispatch_packet(&daemon, 0, peer, &buf).await;

        let core = daemon.core.lock().await;
        assert_eq!(core.ifaces[0].neighbors.len(), 1);
        assert!(core.topology_dirty);
    }

    #[tokio::test]
    async fn corrupted_checksum_hello_is_rejected() {
        let local = Ipv4Addr::new(10, 0, 1, 1);
        let peer = Ipv4Addr::new(10, 0, 1, 2);
        let daemon = daemon_with_ifaces(local, vec![recording_iface("eth0", [10, 0, 1, 1])]);

        let mut buf = valid_hello_packet(peer, Ipv4Addr::new(255, 255, 255, 0));
        buf[0] ^= 0xFF; // corrupt the version byte, covered by the checksum
        dispatch_packet(&daemon, 0, peer, &buf).await;

        let core = daemon.core.lock().await;
        assert!(core.ifaces[0].neighbors.is_empty());
        assert!(!core.topology_dirty);
    }

    #[tokio::test]
    async fn accepted_lsu_refloods_to_other_interfaces_with_decremented_ttl() {
        let local = Ipv4Addr::new(10, 0, 0, 1);
        let origin = Ipv4Addr::new(10, 0, 0, 9);
        let eth0 = recording_iface("eth0", [10, 0, 0, 1]);
        let eth1 = recording_iface("eth1", [10, 0, 9, 1]);
        let daemon = daemon_with_ifaces(local, vec![eth0.clone(), eth1.clone()]);
        {
            let mut core = daemon.core.lock().await;
            core.lsdb.install_self(local, 1, vec![]);
            core.ifaces[1].neighbors.push(crate::iface::NeighborEntry {
                router_id: Ipv4Addr::new(10, 0, 9, 2),
                ip: Ipv4Addr::new(10, 0, 9, 2),
                mask: Ipv4Addr::new(255, 255, 255, 0),
                alive: 15,
            });
        }

        let lsu = Packet::Lsu(
            MospfHeader::new(TYPE_LSU, origin, 0),
            LsuPayload {
                sequence: 3,
                ttl: 16,
                lsas: vec![Lsa {
                    subnet: Ipv4Addr::new(10, 0, 7, 0),
                    mask: Ipv4Addr::new(255, 255, 255, 0),
                    advertising_rid: Ipv4Addr::UNSPECIFIED,
                }],
            },
        )
        .encode();

        dispatch_packet(&daemon, 0, origin, &lsu).await;

        let core = daemon.core.lock().await;
        assert_eq!(core.lsdb.get(origin).unwrap().seq, 3);
        // eth0 received it, so only eth1 (with a neighbor) gets a re-flood.
        assert!(eth0.sent_by_arp.lock().unwrap().is_empty());
        let sent = eth1.sent_by_arp.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let forwarded = Packet::decode(&sent[0].1, 0).unwrap();
        match forwarded {
            Packet::Lsu(_, payload) => assert_eq!(payload.ttl, 15),
            _ => panic!("expected an LSU"),
        }
    }

    #[tokio::test]
    async fn second_delivery_of_same_sequence_is_a_no_op() {
        let local = Ipv4Addr::new(10, 0, 0, 1);
        let origin = Ipv4Addr::new(10, 0, 0, 9);
        let daemon = daemon_with_ifaces(local, vec![recording_iface("eth0", [10, 0, 0, 1])]);

        let lsu = || {
            Packet::Lsu(
                MospfHeader::new(TYPE_LSU, origin, 0),
                LsuPayload {
                    sequence: 4,
                    ttl: 16,
                    lsas: vec![],
                },
            )
            .encode()
        };
        dispatch_packet(&daemon, 0, origin, &lsu()).await;
        dispatch_packet(&daemon, 0, origin, &lsu()).await;

        let core = daemon.core.lock().await;
        assert_eq!(core.lsdb.get(origin).unwrap().seq, 4);
    }
}
