use clap::Parser;
use log::{error, info};

use chat_directory::{
    bootstrap::bootstrap_directory,
    config::{Args, DirectoryConfig},
    server,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DirectoryConfig::from(Args::parse());
    let directory = bootstrap_directory(&config);

    let cancel = directory.cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {e}");
            return;
        }
        info!("Shutdown signal received");
        cancel.cancel();
    });

    let res = server::serve(
        config.bind_addr,
        directory.gateway.clone(),
        directory.cancel.clone(),
    )
    .await;
    directory.gateway.shutdown().await;
    res
}
