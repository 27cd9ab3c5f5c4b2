// Neighbor Monitor: once per second, ages every neighbor under the
// coarse lock and marks the topology dirty on any expiry.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;

use crate::state::Daemon;

pub async fn run(daemon: Arc<Daemon>) {
    let mut ticker = interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;

        let mut core = daemon.core.lock().await;
        let mut any_expired = false;
        for iface_state in &mut core.ifaces {
            if iface_state.tick_and_expire() {
                any_expired = true;
            }
        }
        if any_expired {
            core.topology_dirty = true;
        }
    }
}
