use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::gateway::{FileStore, GatewayError};

/// Filesystem-backed durable file store.
///
/// Files live at `{root}/{folder}/{name}` and are linked as
/// `{public_base_url}/{folder}/{name}`. Writes go through `{root}/.tmp` and are
/// linked into place, so a link never points at a partial file. An existing
/// file is never replaced.
pub struct LocalFileStore {
    root: PathBuf,
    public_base_url: String,
}

fn io_error(err: std::io::Error) -> GatewayError {
    GatewayError::Unavailable(format!("local storage IO error: {err}"))
}

/// Reject names that would escape the store root.
fn check_segment(segment: &str) -> Result<&str, GatewayError> {
    let trimmed = segment.trim();
    if trimmed.is_empty()
        || trimmed.starts_with('.')
        || trimmed.contains(['/', '\\', '\0'])
        || trimmed.chars().any(|c| c.is_ascii_control())
    {
        return Err(GatewayError::Rejected(format!(
            "invalid storage path segment: {segment:?}"
        )));
    }
    Ok(trimmed)
}

impl LocalFileStore {
    pub async fn new(root: PathBuf, public_base_url: &str) -> Result<Self, GatewayError> {
        fs::create_dir_all(root.join(".tmp")).await.map_err(io_error)?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Path of a stored file, if both segments are acceptable.
    pub fn file_path(&self, folder: &str, name: &str) -> Result<PathBuf, GatewayError> {
        Ok(self
            .root
            .join(check_segment(folder)?)
            .join(check_segment(name)?))
    }

    pub fn link_for(&self, folder: &str, name: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, folder, name)
    }

    /// Map a link back to its on-disk path.
    pub fn path_for_link(&self, link: &str) -> Option<PathBuf> {
        let rest = link.strip_prefix(&self.public_base_url)?.strip_prefix('/')?;
        let (folder, name) = rest.split_once('/')?;
        self.file_path(folder, name).ok()
    }

    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn ensure_folder(&self, name: &str) -> Result<String, GatewayError> {
        let name = check_segment(name)?;
        // create_dir_all succeeds if the directory already exists.
        fs::create_dir_all(self.root.join(name))
            .await
            .map_err(io_error)?;
        Ok(name.to_string())
    }

    async fn upload(&self, folder: &str, name: &str, path: &Path) -> Result<String, GatewayError> {
        let target = self.file_path(folder, name)?;
        let folder_dir = self.root.join(check_segment(folder)?);
        if !fs::try_exists(&folder_dir).await.map_err(io_error)? {
            return Err(GatewayError::NotFound(format!("folder {folder}")));
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::copy(path, &temp_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(io_error(e));
        }
        let linked = fs::hard_link(&temp_path, &target).await;
        let _ = fs::remove_file(&temp_path).await;
        match linked {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(GatewayError::Rejected(format!(
                    "{folder}/{name} already exists"
                )));
            }
            Err(e) => return Err(io_error(e)),
        }

        Ok(self.link_for(folder.trim(), name.trim()))
    }

    async fn resolve(&self, link: &str) -> Result<bool, GatewayError> {
        match self.path_for_link(link) {
            Some(path) => fs::try_exists(&path).await.map_err(io_error),
            None => Ok(false),
        }
    }
}
