// Entry point for the mOSPF routing daemon: loads configuration, binds
// interfaces, spawns the Hello Emitter / Neighbor Monitor / LSU
// Generator, and runs the Packet Dispatcher against every interface's
// inbound traffic.

use std::sync::Arc;

use mospfd::dispatch::dispatch_packet;
use mospfd::error::Result;
use mospfd::{config, control, init, logging, tasks};

const CONFIG_DIR: &str = "conf";

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    log::info!("starting mospfd...");

    let router_config = config::read_router_config(CONFIG_DIR)?;
    let daemon = init::build_daemon(&router_config).await?;

    tasks::spawn_background_tasks(Arc::clone(&daemon));

    let control_port = router_config.control_port;
    let control_daemon = Arc::clone(&daemon);
    tokio::spawn(async move {
        if let Err(e) = control::run(control_daemon, control_port).await {
            log::error!("control listener failed: {}", e);
        }
    });

    let ifaces: Vec<_> = {
        let core = daemon.core.lock().await;
        core.ifaces
            .iter()
            .enumerate()
            .map(|(idx, state)| (idx, Arc::clone(&state.iface)))
            .collect()
    };

    for (idx, iface) in ifaces {
        let daemon = Arc::clone(&daemon);
        tokio::spawn(async move {
            let mut buf = [0u8; 2048];
            loop {
                match iface.recv_packet(&mut buf).await {
                    Ok((len, src)) => dispatch_packet(&daemon, idx, src, &buf[..len]).await,
                    Err(e) => log::error!("receive error on {}: {}", iface.name(), e),
                }
            }
        });
    }

    // Background tasks and per-interface receive loops run forever;
    // there is no graceful shutdown in this design.
    std::future::pending::<()>().await;
    Ok(())
}
