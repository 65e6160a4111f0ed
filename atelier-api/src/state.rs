use std::sync::Arc;

use atelier_catalog::{Catalog, CatalogGenerator};
use atelier_fulfillment::DeliveryService;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub generator: Arc<CatalogGenerator>,
    pub delivery: Arc<DeliveryService>,
    /// Cancelled on shutdown; stops provisioning runs in progress
    pub shutdown: CancellationToken,
}
