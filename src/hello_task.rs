// Hello Emitter: periodically multicasts HELLO on every interface under
// the coarse lock, with a debugging routing-table dump every fourth
// cycle.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use tokio::time::interval;

use crate::iface::DEFAULT_HELLO_INTERVAL_SEC;
use crate::state::Daemon;
use crate::wire::header::TYPE_HELLO;
use crate::wire::{HelloPayload, MospfHeader, Packet};

const DUMP_EVERY_N_CYCLES: u64 = 4;

pub async fn run(daemon: Arc<Daemon>) {
    let mut ticker = interval(Duration::from_secs(DEFAULT_HELLO_INTERVAL_SEC));
    let mut cycle: u64 = 0;
    loop {
        ticker.tick().await;
        cycle += 1;

        let core = daemon.core.lock().await;
        for iface_state in &core.ifaces {
            let iface = &iface_state.iface;
            let header = MospfHeader::new(TYPE_HELLO, core.router_id, core.area_id);
            let payload = HelloPayload {
                mask: iface.mask(),
                hello_interval: iface.hello_interval() as u16,
            };
            let bytes = Packet::Hello(header, payload).encode();
            if let Err(e) = iface.send_packet(&bytes).await {
                error!("failed to send HELLO on {}: {}", iface.name(), e);
            }
        }
        drop(core);

        if cycle % DUMP_EVERY_N_CYCLES == 0 {
            dump_routing_table(&daemon).await;
        }
    }
}

async fn dump_routing_table(daemon: &Daemon) {
    let rt = daemon.rt.lock().await;
    info!("routing table ({} entries):", rt.len());
    for entry in rt.iter() {
        info!(
            "  {}/{} via {} dev {} metric {}",
            entry.destination_subnet, entry.mask, entry.next_hop_router_id, entry.egress_interface, entry.distance
        );
    }
}
