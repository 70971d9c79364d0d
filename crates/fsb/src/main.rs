use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use fsb_core::{
    catalog::Catalog,
    config::{Config, LivenessConfig},
};

#[tokio::main]
async fn main() -> Result<(), fsb_core::Error> {
    fsb_core::logging::init("fsb")?;

    // The keep-alive endpoint comes up first and independently of the bot.
    let shutdown = CancellationToken::new();
    let liveness = LivenessConfig::from_env();
    let keepalive = fsb_keepalive::spawn(liveness.addr(), shutdown.clone());

    let res = run_bot().await;
    if let Err(e) = &res {
        tracing::error!(error = %e, "bot did not start or stopped with an error");
    }

    shutdown.cancel();
    if let Err(e) = keepalive.await {
        tracing::error!(error = %e, "keep-alive task panicked");
    }

    res
}

async fn run_bot() -> Result<(), fsb_core::Error> {
    let cfg = Arc::new(Config::load()?);
    let catalog = Arc::new(Catalog::load(&cfg.catalog_path)?);

    fsb_telegram::router::run_polling(cfg, catalog)
        .await
        .map_err(|e| fsb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
