use axum::{
    http::Method,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod catalog;
pub mod error;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .merge(catalog::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use atelier_catalog::{Catalog, CatalogGenerator, GenerationOptions, PricingEngine};
    use atelier_fulfillment::{DeliveryConfig, DeliveryService};
    use atelier_store::{DryRunProvisioner, LocalObjectStore};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let generator = CatalogGenerator::new(
            PricingEngine::default(),
            Arc::new(DryRunProvisioner::new()),
            GenerationOptions::default(),
        )
        .unwrap();
        let root = std::env::temp_dir().join(format!("atelier-api-{}", uuid::Uuid::new_v4().simple()));
        let store = LocalObjectStore::new(root, "http://localhost/files");

        app(AppState {
            catalog: Arc::new(Catalog::template_marketplace()),
            generator: Arc::new(generator),
            delivery: Arc::new(DeliveryService::new(Arc::new(store), DeliveryConfig::default()).unwrap()),
            shutdown: CancellationToken::new(),
        })
    }

    async fn call(method: &str, uri: &str) -> (StatusCode, Value) {
        let response = test_app()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _) = call("GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_category_lookup() {
        let (status, body) = call("GET", "/categories/61").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "Financial Services");

        let (_, body) = call("GET", "/categories/9000").await;
        assert_eq!(body["category"], "Miscellaneous");

        let (status, _) = call("GET", "/categories/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_plan_lists_every_entry() {
        let (status, body) = call("GET", "/catalog/plan").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currency"], "usd");
        assert_eq!(body["entries"].as_array().unwrap().len(), 487 + 16);
        assert_eq!(body["entries"][0]["metadata"]["category"], "Corporate & Enterprise");
    }

    #[tokio::test]
    async fn test_provision_with_dry_run() {
        let (status, body) = call("POST", "/catalog/provision").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"].as_array().unwrap().len(), 487 + 16);
        assert_eq!(body["errors"].as_array().unwrap().len(), 0);
        assert_eq!(body["stats"]["provisioned"], 503);
    }

    #[tokio::test]
    async fn test_download_link() {
        let (status, body) = call("POST", "/delivery/cus_7/link").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["url"].as_str().unwrap().starts_with("http://localhost/files/packages/cus_7_"));

        let (status, body) = call("POST", "/delivery/%20/link").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Invalid customer id"));
    }
}
