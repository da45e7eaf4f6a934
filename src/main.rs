use anyhow::Context;
use clap::Parser;
use tracing::{error, info, Instrument};

use storefront::actor_framework::Page;
use storefront::app_system::{setup_tracing, CommerceSystem};
use storefront::config::AppConfig;
use storefront::seed::{ensure_superuser, seed_sample_data};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();
    setup_tracing(&config.logging)?;

    info!(?config, "Starting storefront");
    let system = CommerceSystem::new(&config.system);

    let span = tracing::info_span!("bootstrap");
    let bootstrap = async {
        let admin = ensure_superuser(&system, &config.bootstrap)
            .await
            .context("creating the first superuser")?;
        info!(user_id = %admin.id, "Superuser ready");

        if config.bootstrap.seed_sample_data {
            let sample = seed_sample_data(&system, &admin)
                .await
                .context("seeding sample data")?;
            println!("{}", serde_json::to_string_pretty(&sample)?);

            let found = system
                .product_client
                .search_products("demonstration", Page::default())
                .await?;
            info!(hits = found.len(), "Sample search finished");
        }
        anyhow::Ok(())
    }
    .instrument(span)
    .await;

    if let Err(e) = &bootstrap {
        error!(error = %e, "Bootstrap failed");
    }

    // Shutdown system gracefully
    system.shutdown().await.context("shutting down")?;
    bootstrap?;

    info!("Application completed successfully");
    Ok(())
}
