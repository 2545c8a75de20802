use std::net::SocketAddr;

use kube::Client;
use tokio::{task::JoinHandle, try_join};

use crate::{
    config::TrmConfig, controller::run_controller, web::run_http_server,
};

/// Compute the HTTP bind address based on config.
pub fn compute_http_addr(cfg: &TrmConfig) -> SocketAddr {
    ([0, 0, 0, 0], cfg.http_port).into()
}

/// Spawn the Kubernetes controller loop.
pub fn spawn_controller(client: Client) -> JoinHandle<anyhow::Result<()>> {
    tokio::spawn(async move { run_controller(client).await })
}

/// Spawn the health HTTP server on the provided address.
pub fn spawn_http(addr: SocketAddr) -> JoinHandle<anyhow::Result<()>> {
    tokio::spawn(async move { run_http_server(addr).await })
}

/// Start both controller and HTTP services and wait until either finishes.
pub async fn run_all(client: Client, cfg: TrmConfig) -> anyhow::Result<()> {
    let http_addr = compute_http_addr(&cfg);

    let controller = spawn_controller(client);
    let http = spawn_http(http_addr);

    let (c_res, h_res) = try_join!(controller, http)?;
    c_res?;
    h_res?;
    Ok(())
}
