use std::net::SocketAddr;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use pazaryeri_core::config::{AppConfig, ProviderConfig};
use pazaryeri_core::{CatalogError, CatalogProvider};
use pazaryeri_provider::{HttpCatalogProvider, SnapshotFileProvider};
use serde_json::{json, Value};
use tempfile::TempDir;

fn envelope() -> Value {
    json!({
        "items": [
            { "sku": "TEL-1", "name": "iPhone 15", "price": 45000, "vatPrice": 54000, "stock": 7, "isFeature": true },
            { "sku": "MUT-1", "name": "Çelik Tencere", "price": 1200, "stock": 40 },
            { "sku": "BAD", "name": "Bozuk", "price": -1 }
        ],
        "meta": { "page": 1, "pages": 1, "total": 3 }
    })
}

async fn products() -> Json<Value> {
    Json(envelope())
}

async fn guarded(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    let authorized = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "Bearer catalog-token");
    if authorized {
        Ok(Json(envelope()))
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn unavailable() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

async fn html() -> &'static str {
    "<html><body>bakımdayız</body></html>"
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(envelope())
}

async fn spawn_mock() -> SocketAddr {
    let app = Router::new()
        .route("/api/product", get(products))
        .route("/api/guarded", get(guarded))
        .route("/api/down", get(unavailable))
        .route("/api/html", get(html))
        .route("/api/slow", get(slow));

    let listener =
        tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("mock listener should bind");
    let address = listener.local_addr().expect("mock listener has an address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    address
}

fn config_for(address: SocketAddr, path: &str) -> ProviderConfig {
    let mut config = AppConfig::default().provider;
    config.base_url = format!("http://{address}");
    config.products_path = path.to_owned();
    config.timeout_secs = 1;
    config
}

async fn fetch(config: &ProviderConfig) -> Result<pazaryeri_core::CatalogSnapshot, CatalogError> {
    HttpCatalogProvider::new(config).expect("http provider should build").fetch().await
}

#[tokio::test]
async fn http_provider_decodes_envelope_and_quarantines() {
    let address = spawn_mock().await;

    let snapshot = fetch(&config_for(address, "/api/product")).await.expect("fetch should succeed");

    assert_eq!(snapshot.products.len(), 2);
    assert_eq!(snapshot.quarantined.len(), 1);
    assert_eq!(snapshot.quarantined[0].sku.as_deref(), Some("BAD"));
    assert!(snapshot.products[0].featured);
    assert_eq!(snapshot.meta.map(|meta| meta.total), Some(3));
}

#[tokio::test]
async fn http_provider_sends_bearer_token() {
    let address = spawn_mock().await;
    let mut config = config_for(address, "/api/guarded");

    let error = fetch(&config).await.expect_err("request without token is rejected");
    assert_eq!(error, CatalogError::bad_status(401));

    config.api_token = Some("catalog-token".to_owned().into());
    let snapshot = fetch(&config).await.expect("authorized fetch should succeed");
    assert_eq!(snapshot.products.len(), 2);
}

#[tokio::test]
async fn non_success_status_is_bad_response() {
    let address = spawn_mock().await;

    let error = fetch(&config_for(address, "/api/down")).await.expect_err("503 must fail");
    assert!(matches!(error, CatalogError::ProviderBadResponse { status: Some(503), .. }));
    assert!(error.to_string().contains("HTTP status 503"));
}

#[tokio::test]
async fn non_json_body_is_bad_response() {
    let address = spawn_mock().await;

    let error = fetch(&config_for(address, "/api/html")).await.expect_err("html must fail");
    assert!(matches!(error, CatalogError::ProviderBadResponse { status: None, .. }));
}

#[tokio::test]
async fn slow_provider_times_out_distinctly() {
    let address = spawn_mock().await;

    let error = fetch(&config_for(address, "/api/slow")).await.expect_err("slow fetch must time out");
    assert_eq!(error, CatalogError::ProviderTimeout { timeout_secs: 1 });
}

#[tokio::test]
async fn refused_connection_is_unavailable() {
    let listener =
        tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("probe listener should bind");
    let address = listener.local_addr().expect("probe listener has an address");
    drop(listener);

    let error = fetch(&config_for(address, "/api/product")).await.expect_err("nothing is listening");
    assert_eq!(error.error_class(), "provider_unavailable");
}

#[tokio::test]
async fn snapshot_provider_reads_envelope_file() {
    let dir = TempDir::new().expect("temp dir should be created");
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, envelope().to_string()).expect("snapshot should be written");

    let provider = SnapshotFileProvider::new(&path);
    let snapshot = provider.fetch().await.expect("snapshot should load");
    assert_eq!(snapshot.products.len(), 2);
    assert_eq!(provider.path(), path.as_path());
}

#[tokio::test]
async fn missing_snapshot_file_is_unavailable() {
    let dir = TempDir::new().expect("temp dir should be created");
    let provider = SnapshotFileProvider::new(dir.path().join("absent.json"));

    let error = provider.fetch().await.expect_err("missing file must fail");
    assert!(matches!(error, CatalogError::ProviderUnavailable { .. }));
}

#[tokio::test]
async fn snapshot_without_items_is_bad_response() {
    let dir = TempDir::new().expect("temp dir should be created");
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, r#"{"products": []}"#).expect("snapshot should be written");

    let error = SnapshotFileProvider::new(path).fetch().await.expect_err("items are required");
    assert!(matches!(error, CatalogError::ProviderBadResponse { .. }));
}
