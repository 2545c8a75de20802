use envconfig::Envconfig;
use kube::Client;
use pmesh_trm::{config::TrmConfig, init_tracing, runtime};
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");

    // Ensure rustls uses the aws-lc-rs provider explicitly, so the kube
    // client never starts without a default provider installed.
    if let Err(e) = rustls::crypto::CryptoProvider::install_default(
        rustls::crypto::aws_lc_rs::default_provider(),
    ) {
        tracing::debug!(
            ?e,
            "CryptoProvider already installed or incompatible; proceeding"
        );
    }

    let cfg = TrmConfig::init_from_env()?;
    info!(?cfg, "Starting TRM");

    let client = Client::try_default().await?;
    runtime::run_all(client, cfg).await
}
