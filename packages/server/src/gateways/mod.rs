//! Concrete gateway adapters and their construction from configuration.
//!
//! Clients are built once at startup and shared read-only by every request.

pub mod classifier;
pub mod google;

use std::sync::Arc;
use std::time::Duration;

use common::gateway::{
    DisabledClassifier, DisabledMirror, DocumentClassifier, FileStore, GatewayError, TabularMirror,
};
use common::storage::LocalFileStore;
use tracing::info;

use crate::config::{AppConfig, MirrorBackend, StorageBackend};
use classifier::HttpClassifier;
use google::{DriveFileStore, SCOPES, ServiceAccountAuth, SheetsMirror};

#[derive(Clone)]
pub struct Gateways {
    pub classifier: Arc<dyn DocumentClassifier>,
    pub files: Arc<dyn FileStore>,
    pub mirror: Arc<dyn TabularMirror>,
    /// Set for the `local` storage backend so its files can be served back.
    pub local_files: Option<Arc<LocalFileStore>>,
}

fn missing(setting: &str) -> GatewayError {
    GatewayError::Unavailable(format!("{setting} is not configured"))
}

pub async fn build(config: &AppConfig) -> Result<Gateways, GatewayError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upload.gateway_timeout_secs))
        .build()
        .map_err(|e| GatewayError::Unavailable(format!("failed to build HTTP client: {e}")))?;

    let needs_google = config.storage.backend == StorageBackend::GoogleDrive
        || config.mirror.backend == MirrorBackend::GoogleSheets;
    let google_auth = if needs_google {
        let path = config
            .google
            .credentials_path
            .as_deref()
            .ok_or_else(|| missing("google.credentials_path"))?;
        let auth =
            ServiceAccountAuth::from_file(path, config.google.token_uri.as_deref(), SCOPES).await?;
        Some(Arc::new(auth))
    } else {
        None
    };

    let classifier: Arc<dyn DocumentClassifier> = match &config.classifier.url {
        Some(url) => {
            info!(url = %url, "Classification service enabled");
            Arc::new(HttpClassifier::new(client.clone(), url))
        }
        None => {
            info!("Classification service not configured; documents stay unverified");
            Arc::new(DisabledClassifier)
        }
    };

    let mut local_files = None;
    let files: Arc<dyn FileStore> = match config.storage.backend {
        StorageBackend::GoogleDrive => {
            let root = config
                .storage
                .root_folder_id
                .clone()
                .ok_or_else(|| missing("storage.root_folder_id"))?;
            let auth = google_auth
                .clone()
                .ok_or_else(|| missing("google.credentials_path"))?;
            info!("Using Google Drive file store");
            Arc::new(DriveFileStore::new(client.clone(), auth, root))
        }
        StorageBackend::Local => {
            let store = Arc::new(
                LocalFileStore::new(
                    config.storage.root.clone(),
                    &config.storage.public_base_url,
                )
                .await?,
            );
            info!(root = %config.storage.root.display(), "Using local file store");
            local_files = Some(store.clone());
            store
        }
    };

    let mirror: Arc<dyn TabularMirror> = match config.mirror.backend {
        MirrorBackend::GoogleSheets => {
            let spreadsheet_id = config
                .mirror
                .spreadsheet_id
                .clone()
                .ok_or_else(|| missing("mirror.spreadsheet_id"))?;
            let auth = google_auth.ok_or_else(|| missing("google.credentials_path"))?;
            info!("Mirroring records to Google Sheets");
            Arc::new(SheetsMirror::new(
                client,
                auth,
                spreadsheet_id,
                config.mirror.sheet_name.clone(),
            ))
        }
        MirrorBackend::Disabled => Arc::new(DisabledMirror),
    };

    Ok(Gateways {
        classifier,
        files,
        mirror,
        local_files,
    })
}
