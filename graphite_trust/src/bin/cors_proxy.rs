use anyhow::Result;
use graphite_trust::{
    config::Config,
    proxy::{self, ProxyConfig},
};
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let proxy_config = ProxyConfig::from_config(&config);

    info!("Starting Graphite CORS proxy...");
    info!("Upstream: {}", proxy_config.upstream_url);
    info!("Listen address: {}", proxy_config.bind_addr());

    proxy::serve_with_shutdown(proxy_config, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down proxy");
        }
    })
    .await?;

    Ok(())
}
