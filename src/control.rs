// Control-plane listener for `mospfctl`: a JSON-over-UDP request/response
// channel for inspecting the routing table and neighbor state. Entirely
// separate from the mOSPF wire protocol in `wire/`: it never touches the
// router-to-router socket or its binary framing.

use std::net::Ipv4Addr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::net::UdpSocket;

use crate::error::Result;
use crate::state::Daemon;

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum ControlRequest {
    RoutingTable,
    Neighbors,
}

#[derive(Debug, Serialize)]
pub struct RtEntryView {
    pub destination_subnet: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub next_hop_router_id: Ipv4Addr,
    pub egress_interface: String,
    pub distance: u32,
}

#[derive(Debug, Serialize)]
pub struct NeighborView {
    pub interface: String,
    pub router_id: Ipv4Addr,
    pub ip: Ipv4Addr,
    pub alive: u32,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status")]
pub enum ControlResponse {
    #[serde(rename = "ok")]
    RoutingTable { entries: Vec<RtEntryView> },
    #[serde(rename = "ok")]
    Neighbors { neighbors: Vec<NeighborView> },
    #[serde(rename = "error")]
    Error { message: String },
}

pub async fn run(daemon: Arc<Daemon>, port: u16) -> Result<()> {
    let socket = UdpSocket::bind(("0.0.0.0", port)).await?;
    log::info!("control listener bound on 0.0.0.0:{}", port);

    let mut buf = [0u8; 4096];
    loop {
        let (len, src) = socket.recv_from(&mut buf).await?;
        let response = match serde_json::from_slice::<ControlRequest>(&buf[..len]) {
            Ok(req) => handle(&daemon, req).await,
            Err(e) => ControlResponse::Error {
                message: format!("malformed request: {}", e),
            },
        };
        let encoded = serde_json::to_vec(&response).unwrap_or_default();
        if let Err(e) = socket.send_to(&encoded, src).await {
            log::warn!("failed to send control response to {}: {}", src, e);
        }
    }
}

async fn handle(daemon: &Daemon, req: ControlRequest) -> ControlResponse {
    match req {
        ControlRequest::RoutingTable => {
            let rt = daemon.rt.lock().await;
            let entries = rt
                .iter()
                .map(|e| RtEntryView {
                    destination_subnet: e.destination_subnet,
                    mask: e.mask,
                    next_hop_router_id: e.next_hop_router_id,
                    egress_interface: e.egress_interface.clone(),
                    distance: e.distance,
                })
                .collect();
            ControlResponse::RoutingTable { entries }
        }
        ControlRequest::Neighbors => {
            let core = daemon.core.lock().await;
            let neighbors = core
                .ifaces
                .iter()
                .flat_map(|state| {
                    let iface_name = state.iface.name().to_string();
                    state.neighbors.iter().map(move |n| NeighborView {
                        interface: iface_name.clone(),
                        router_id: n.router_id,
                        ip: n.ip,
                        alive: n.alive,
                    })
                })
                .collect();
            ControlResponse::Neighbors { neighbors }
        }
    }
}
