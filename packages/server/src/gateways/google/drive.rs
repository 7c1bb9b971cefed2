use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use common::gateway::{FileStore, GatewayError};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use reqwest::{Body, Url};
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use super::{GoogleApiError, ServiceAccountAuth, check};

const DEFAULT_API_BASE: &str = "https://www.googleapis.com";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Deserialize)]
struct FileRef {
    id: String,
    #[serde(default)]
    trashed: bool,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileRef>,
}

/// Durable file store backed by a Google Drive folder with one sub-folder
/// per student, named by register number.
pub struct DriveFileStore {
    client: reqwest::Client,
    auth: Arc<ServiceAccountAuth>,
    root_folder_id: String,
    api_base: String,
}

/// Quote a value for a Drive `q` expression.
fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Shareable view link for a Drive file id.
pub fn view_link(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{file_id}/view?usp=sharing")
}

/// File id of a link produced by [`view_link`].
pub fn file_id_from_link(link: &str) -> Option<&str> {
    let rest = link.split_once("/file/d/")?.1;
    let id = rest.split(['/', '?']).next()?;
    (!id.is_empty()).then_some(id)
}

impl DriveFileStore {
    pub fn new(client: reqwest::Client, auth: Arc<ServiceAccountAuth>, root_folder_id: String) -> Self {
        Self {
            client,
            auth,
            root_folder_id,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    fn url(&self, path: &str) -> Result<Url, GoogleApiError> {
        Url::parse(&format!("{}{}", self.api_base, path))
            .map_err(|e| GoogleApiError::UnexpectedResponse(format!("bad URL {path}: {e}")))
    }

    /// Folders with this name under the root, oldest first.
    async fn find_folders(&self, name: &str) -> Result<Vec<FileRef>, GoogleApiError> {
        let token = self.auth.access_token(&self.client).await?;
        let q = format!(
            "mimeType='{FOLDER_MIME}' and name='{}' and '{}' in parents and trashed=false",
            quote(name),
            quote(&self.root_folder_id)
        );
        let response = self
            .client
            .get(self.url("/drive/v3/files")?)
            .bearer_auth(token)
            .query(&[
                ("q", q.as_str()),
                ("fields", "files(id,trashed)"),
                ("orderBy", "createdTime"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await?;
        Ok(check(response).await?.json::<FileList>().await?.files)
    }

    async fn create_folder(&self, name: &str) -> Result<String, GoogleApiError> {
        let token = self.auth.access_token(&self.client).await?;
        let response = self
            .client
            .post(self.url("/drive/v3/files")?)
            .bearer_auth(token)
            .query(&[("fields", "id"), ("supportsAllDrives", "true")])
            .json(&json!({
                "name": name,
                "mimeType": FOLDER_MIME,
                "parents": [self.root_folder_id],
            }))
            .send()
            .await?;
        Ok(check(response).await?.json::<FileRef>().await?.id)
    }

    async fn upload_file(&self, folder: &str, name: &str, path: &Path) -> Result<String, GoogleApiError> {
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        let mime = mime_guess::from_path(name).first_or_octet_stream().to_string();
        let token = self.auth.access_token(&self.client).await?;

        // Resumable session: metadata first, then the content in one PUT.
        let session = self
            .client
            .post(self.url("/upload/drive/v3/files")?)
            .bearer_auth(&token)
            .query(&[
                ("uploadType", "resumable"),
                ("supportsAllDrives", "true"),
                ("fields", "id"),
            ])
            .header("X-Upload-Content-Type", &mime)
            .header("X-Upload-Content-Length", size.to_string())
            .json(&json!({ "name": name, "parents": [folder] }))
            .send()
            .await?;
        let session = check(session).await?;
        let location = session
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                GoogleApiError::UnexpectedResponse("resumable session without Location".into())
            })?
            .to_string();

        let response = self
            .client
            .put(location)
            .bearer_auth(&token)
            .header(CONTENT_TYPE, &mime)
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;
        Ok(check(response).await?.json::<FileRef>().await?.id)
    }

    async fn file_exists(&self, file_id: &str) -> Result<bool, GoogleApiError> {
        let token = self.auth.access_token(&self.client).await?;
        let mut url = self.url("/drive/v3/files")?;
        url.path_segments_mut()
            .map_err(|_| GoogleApiError::UnexpectedResponse("cannot-be-a-base URL".into()))?
            .push(file_id);
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "id,trashed"), ("supportsAllDrives", "true")])
            .send()
            .await?;
        match check(response).await {
            Ok(response) => Ok(!response.json::<FileRef>().await?.trashed),
            Err(GoogleApiError::Api { status: 404, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl FileStore for DriveFileStore {
    async fn ensure_folder(&self, name: &str) -> Result<String, GatewayError> {
        if let Some(existing) = self.find_folders(name).await?.into_iter().next() {
            debug!(folder = name, id = %existing.id, "Found student folder");
            return Ok(existing.id);
        }

        let created = self.create_folder(name).await?;
        // A concurrent request may have created one too; settle on the oldest.
        let settled = self
            .find_folders(name)
            .await?
            .into_iter()
            .next()
            .map(|f| f.id)
            .unwrap_or(created);
        info!(folder = name, id = %settled, "Created student folder");
        Ok(settled)
    }

    async fn upload(&self, folder: &str, name: &str, path: &Path) -> Result<String, GatewayError> {
        let id = self.upload_file(folder, name, path).await?;
        debug!(name, id = %id, "Uploaded file to Drive");
        Ok(view_link(&id))
    }

    async fn resolve(&self, link: &str) -> Result<bool, GatewayError> {
        match file_id_from_link(link) {
            Some(id) => Ok(self.file_exists(id).await?),
            None => Ok(false),
        }
    }
}
