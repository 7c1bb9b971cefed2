use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::config::{AppConfig, CorsConfig};
use server::state::AppState;
use server::workflow::InternshipWorkflow;
use server::{build_router, database, gateways, seed};

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Credentials are allowed so the session cookie travels cross-origin.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(config.max_age))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let store = database::open_store(&config.database)
        .await
        .context("Failed to open record store")?;
    if let Some(path) = &config.database.seed_path {
        seed::apply_file(store.as_ref(), path)
            .await
            .with_context(|| format!("Failed to apply seed file {}", path.display()))?;
        info!(path = %path.display(), "Seed data applied");
    }

    let gateways = gateways::build(&config)
        .await
        .context("Failed to initialize gateways")?;
    let workflow = InternshipWorkflow::new(
        store.clone(),
        &gateways,
        Duration::from_secs(config.upload.gateway_timeout_secs),
    );

    let state = AppState {
        config: config.clone(),
        store,
        workflow: Arc::new(workflow),
        local_files: gateways.local_files.clone(),
    };
    let app = build_router(state).layer(cors_layer(&config.server.cors));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
