// Spawns the three background activities that share the daemon's core
// lock with the Packet Dispatcher: Hello Emitter, Neighbor Monitor, LSU
// Generator. Each runs as its own task since they tick on independent
// periods and trigger conditions (see DESIGN.md).

use std::sync::Arc;

use crate::state::Daemon;
use crate::{hello_task, lsu_task, neighbor_monitor};

pub fn spawn_background_tasks(daemon: Arc<Daemon>) {
    tokio::spawn(hello_task::run(Arc::clone(&daemon)));
    tokio::spawn(neighbor_monitor::run(Arc::clone(&daemon)));
    tokio::spawn(lsu_task::run(daemon));
}
