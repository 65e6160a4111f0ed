use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use atelier_api::{app, AppState};
use atelier_catalog::{CatalogGenerator, PricingEngine};
use atelier_fulfillment::DeliveryService;
use atelier_store::{app_config::Config, DryRunProvisioner, LocalObjectStore};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier_api=debug,atelier_catalog=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Atelier API on port {}", config.server.port);

    // Range, pricing and option problems surface here, before any provisioning
    let catalog = config.catalog.build().context("Invalid catalog configuration")?;
    let pricing = PricingEngine::new(config.pricing.clone()).context("Invalid pricing configuration")?;
    let generator = CatalogGenerator::new(pricing, Arc::new(DryRunProvisioner::new()), config.generation.clone())
        .context("Invalid generation options")?;
    tracing::info!(
        items = catalog.inventory_size(),
        tiers = catalog.tiers().len(),
        "Catalog loaded"
    );

    let store = LocalObjectStore::new(&config.storage.root, config.storage.base_url.clone());
    let delivery = DeliveryService::new(Arc::new(store), config.delivery.clone())
        .context("Invalid delivery configuration")?;
    let layout = delivery.setup_layout().await;
    if !layout.failed.is_empty() {
        tracing::warn!("{} delivery folders could not be created", layout.failed.len());
    }

    let shutdown = CancellationToken::new();
    let app_state = AppState {
        catalog: Arc::new(catalog),
        generator: Arc::new(generator),
        delivery: Arc::new(delivery),
        shutdown: shutdown.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.context("Failed to bind")?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
