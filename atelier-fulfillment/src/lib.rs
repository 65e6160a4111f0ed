pub mod delivery;

pub use delivery::{DeliveryConfig, DeliveryError, DeliveryService, DownloadLink, LayoutReport, DELIVERY_FOLDERS, MAX_URL_EXPIRY_SECONDS};
