pub mod app_config;
pub mod dry_run;
pub mod local_store;

pub use dry_run::DryRunProvisioner;
pub use local_store::LocalObjectStore;
