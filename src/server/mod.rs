pub mod handlers;
pub mod models;

use crate::storage::Storage;
use axum::{
    http::Method,
    routing::get,
    Extension, Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Create the HTTP server with all routes
pub fn create_server(storage: Arc<dyn Storage>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/frameworks", get(handlers::list_frameworks))
        .route("/controls", get(handlers::list_controls))
        .route("/labs", get(handlers::list_labs))
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/evidence",
            get(handlers::list_evidence).post(handlers::create_evidence),
        )
        .route(
            "/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .layer(Extension(storage))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified address
pub async fn start_server(
    storage: Arc<dyn Storage>,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(storage);

    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    info!("HTTP server listening on {}", addr);
    println!("🚀 HTTP server running on http://{addr}");
    println!("💚 Health check: http://{addr}/health");
    println!("📋 Frameworks:   http://{addr}/frameworks");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
