#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Result;
use parcel_api::setup;
use parcel_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let (_state, app, sweeper) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, app).await?;

    if let Some(handle) = sweeper {
        handle.abort();
        tracing::info!("Expiry sweeper stopped");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
