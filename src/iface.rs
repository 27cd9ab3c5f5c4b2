// Interfaces and neighbors.
//
// `Interface` is a trait so the rest of the daemon never depends on how a
// frame actually leaves the box. `UdpInterface` is the one concrete,
// runnable implementation, standing in for real Ethernet/IP send/receive
// and ARP resolution.

use std::net::Ipv4Addr;

use async_trait::async_trait;
use log::{info, warn};

use crate::error::Result;

pub const ALL_SPF_ROUTERS: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 5);
pub const MOSPF_IP_PROTOCOL: u8 = 90;

pub const DEFAULT_HELLO_INTERVAL_SEC: u64 = 5;
pub const DEFAULT_LSUINT_SEC: u64 = 30;

/// `NEIGHBOR_TIMEOUT` default: 3x the hello interval.
pub fn neighbor_timeout_secs(hello_interval_sec: u64) -> u32 {
    (hello_interval_sec * 3) as u32
}

/// A directly attached link, abstracting raw send/receive and ARP
/// resolution. Implementors are expected to be cheap to clone behind an
/// `Arc`.
#[async_trait]
pub trait Interface: Send + Sync {
    fn name(&self) -> &str;
    fn ipv4_addr(&self) -> Ipv4Addr;
    fn mask(&self) -> Ipv4Addr;
    fn mac(&self) -> [u8; 6];
    fn hello_interval(&self) -> u64 {
        DEFAULT_HELLO_INTERVAL_SEC
    }

    /// Multicast send to AllSPFRouters (used for HELLO).
    async fn send_packet(&self, buf: &[u8]) -> Result<()>;

    /// Unicast send to `dst_ip`, resolving the link-layer address first
    /// (used for LSU origination and flooding).
    async fn send_packet_by_arp(&self, dst_ip: Ipv4Addr, buf: &[u8]) -> Result<()>;

    /// Block until one datagram arrives on this interface, returning its
    /// payload and sender address. Drives the external packet-reception
    /// loop that feeds the Packet Dispatcher.
    async fn recv_packet(&self, buf: &mut [u8]) -> Result<(usize, Ipv4Addr)>;
}

/// A neighbor discovered on one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborEntry {
    pub router_id: Ipv4Addr,
    pub ip: Ipv4Addr,
    pub mask: Ipv4Addr,
    /// Seconds remaining before this entry expires; reset to
    /// `NEIGHBOR_TIMEOUT` on every HELLO receipt.
    pub alive: u32,
}

/// One configured interface plus the neighbors discovered on it.
pub struct IfaceState {
    pub iface: std::sync::Arc<dyn Interface>,
    pub neighbors: Vec<NeighborEntry>,
}

impl IfaceState {
    pub fn new(iface: std::sync::Arc<dyn Interface>) -> Self {
        IfaceState {
            iface,
            neighbors: Vec::new(),
        }
    }

    /// Handle an inbound HELLO from `rid`/`sender_ip`/`sender_mask`. Returns
    /// `true` if this created a *new* neighbor entry (topology-dirtying),
    /// `false` if it only refreshed an existing one.
    pub fn observe_hello(
        &mut self,
        rid: Ipv4Addr,
        sender_ip: Ipv4Addr,
        sender_mask: Ipv4Addr,
        timeout: u32,
    ) -> bool {
        if let Some(existing) = self.neighbors.iter_mut().find(|n| n.router_id == rid) {
            existing.alive = timeout;
            return false;
        }
        info!(
            "new neighbor {} discovered on {} ({})",
            rid,
            self.iface.name(),
            sender_ip
        );
        self.neighbors.push(NeighborEntry {
            router_id: rid,
            ip: sender_ip,
            mask: sender_mask,
            alive: timeout,
        });
        true
    }

    /// Decrement every neighbor's `alive` by one second, dropping any that
    /// reach zero. Returns `true` if any neighbor was removed
    /// (topology-dirtying).
    pub fn tick_and_expire(&mut self) -> bool {
        for n in &mut self.neighbors {
            if n.alive > 0 {
                n.alive -= 1;
            }
        }
        let before = self.neighbors.len();
        self.neighbors.retain(|n| {
            let keep = n.alive > 0;
            if !keep {
                warn!("neighbor {} timed out, removing", n.router_id);
            }
            keep
        });
        self.neighbors.len() != before
    }
}

/// A bare-bones UDP-socket-backed `Interface`: HELLOs go out on a UDP
/// multicast socket bound to the interface address, and unicast LSU sends
/// go straight to the neighbor's IP on the same port (ARP resolution is
/// handled by the OS/kernel networking stack rather than modeled here).
pub struct UdpInterface {
    name: String,
    addr: Ipv4Addr,
    mask: Ipv4Addr,
    mac: [u8; 6],
    hello_interval: u64,
    socket: tokio::net::UdpSocket,
    port: u16,
}

impl UdpInterface {
    /// Binds to `(addr, port)` so the same socket both originates traffic
    /// and receives HELLO/LSU datagrams addressed to this interface, and
    /// joins the AllSPFRouters multicast group.
    pub async fn bind(
        name: String,
        addr: Ipv4Addr,
        mask: Ipv4Addr,
        mac: [u8; 6],
        hello_interval: u64,
        port: u16,
    ) -> Result<Self> {
        let socket = tokio::net::UdpSocket::bind((addr, port)).await?;
        socket.set_broadcast(true)?;
        socket.join_multicast_v4(ALL_SPF_ROUTERS, addr)?;
        Ok(UdpInterface {
            name,
            addr,
            mask,
            mac,
            hello_interval,
            socket,
            port,
        })
    }
}

#[async_trait]
impl Interface for UdpInterface {
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
        self.mac
    }

    fn hello_interval(&self) -> u64 {
        self.hello_interval
    }

    async fn send_packet(&self, buf: &[u8]) -> Result<()> {
        self.socket
            .send_to(buf, (ALL_SPF_ROUTERS, self.port))
            .await?;
        Ok(())
    }

    async fn send_packet_by_arp(&self, dst_ip: Ipv4Addr, buf: &[u8]) -> Result<()> {
        self.socket.send_to(buf, (dst_ip, self.port)).await?;
        Ok(())
    }

    async fn recv_packet(&self, buf: &mut [u8]) -> Result<(usize, Ipv4Addr)> {
        let (len, src) = self.socket.recv_from(buf).await?;
        let ip = match src.ip() {
            std::net::IpAddr::V4(v4) => v4,
            std::net::IpAddr::V6(_) => {
                return Err(crate::error::MospfError::NetworkError(
                    "received from an IPv6 peer on an IPv4 interface".into(),
                ))
            }
        };
        Ok((len, ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct NullInterface {
        name: String,
        addr: Ipv4Addr,
        mask: Ipv4Addr,
    }

    #[async_trait]
    impl Interface for NullInterface {
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
        async fn send_packet(&self, _buf: &[u8]) -> Result<()> {
            Ok(())
        }
        async fn send_packet_by_arp(&self, _dst_ip: Ipv4Addr, _buf: &[u8]) -> Result<()> {
            Ok(())
        }
        async fn recv_packet(&self, _buf: &mut [u8]) -> Result<(usize, Ipv4Addr)> {
            std::future::pending().await
        }
    }

    fn iface_state() -> IfaceState {
        IfaceState::new(Arc::new(NullInterface {
            name: "eth0".into(),
            addr: Ipv4Addr::new(10, 0, 1, 1),
            mask: Ipv4Addr::new(255, 255, 255, 0),
        }))
    }

    #[test]
    fn first_hello_creates_neighbor_and_dirties() {
        let mut state = iface_state();
        let dirtied = state.observe_hello(
            Ipv4Addr::new(10, 0, 1, 2),
            Ipv4Addr::new(10, 0, 1, 2),
            Ipv4Addr::new(255, 255, 255, 0),
            15,
        );
        assert!(dirtied);
        assert_eq!(state.neighbors.len(), 1);
    }

    #[test]
    fn repeat_hello_only_refreshes() {
        let mut state = iface_state();
        let rid = Ipv4Addr::new(10, 0, 1, 2);
        state.observe_hello(rid, rid, Ipv4Addr::new(255, 255, 255, 0), 15);
        state.neighbors[0].alive = 1;
        let dirtied = state.observe_hello(rid, rid, Ipv4Addr::new(255, 255, 255, 0), 15);
        assert!(!dirtied);
        assert_eq!(state.neighbors[0].alive, 15);
    }

    #[test]
    fn neighbor_expires_exactly_at_zero() {
        let mut state = iface_state();
        let rid = Ipv4Addr::new(10, 0, 1, 2);
        state.observe_hello(rid, rid, Ipv4Addr::new(255, 255, 255, 0), 2);
        assert!(!state.tick_and_expire()); // alive: 2 -> 1
        assert_eq!(state.neighbors.len(), 1);
        assert!(state.tick_and_expire()); // alive: 1 -> 0, removed
        assert!(state.neighbors.is_empty());
    }
}
