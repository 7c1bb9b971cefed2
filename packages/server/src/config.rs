use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    /// Keep records in process memory instead of PostgreSQL.
    #[serde(default)]
    pub memory: bool,
    /// Optional JSON file of accounts and student profiles loaded at startup.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub cookie_secure: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Maximum size of a single uploaded file in bytes.
    pub max_file_size: u64,
    pub max_files: usize,
    /// Lowercase extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
    /// Directory for staged uploads. Defaults to the OS temp dir.
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,
    /// Upper bound on any single gateway call.
    pub gateway_timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024,
            max_files: 6,
            allowed_extensions: vec!["pdf".into(), "doc".into(), "docx".into()],
            staging_dir: None,
            gateway_timeout_secs: 30,
        }
    }
}

impl UploadConfig {
    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Largest request body the upload routes accept.
    pub fn body_limit(&self) -> usize {
        let files = self.max_file_size.saturating_mul(self.max_files as u64);
        // Room for the scalar fields and multipart framing.
        usize::try_from(files.saturating_add(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClassifierConfig {
    /// Base URL of the classification service; unset disables classification.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    GoogleDrive,
    Local,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Drive folder that holds one sub-folder per student.
    #[serde(default)]
    pub root_folder_id: Option<String>,
    /// Local backend: directory holding one sub-directory per student.
    pub root: PathBuf,
    /// Local backend: prefix of the links handed back for stored files.
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MirrorBackend {
    GoogleSheets,
    Disabled,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MirrorConfig {
    pub backend: MirrorBackend,
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    pub sheet_name: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct GoogleConfig {
    /// Service-account JSON key used for Drive and Sheets.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
    /// Overrides the token endpoint from the key file.
    #[serde(default)]
    pub token_uri: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    pub storage: StorageConfig,
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub google: GoogleConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.token_ttl_secs", 3600)?
            .set_default("auth.cookie_secure", false)?
            .set_default("upload.max_file_size", 100 * 1024 * 1024)?
            .set_default("upload.max_files", 6)?
            .set_default("upload.allowed_extensions", vec!["pdf", "doc", "docx"])?
            .set_default("upload.gateway_timeout_secs", 30)?
            .set_default("storage.backend", "local")?
            .set_default("storage.root", "./data/files")?
            .set_default("storage.public_base_url", "http://127.0.0.1:5000/api/user/files")?
            .set_default("mirror.backend", "disabled")?
            .set_default("mirror.sheet_name", "Sheet1")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., INTERNSHIP__AUTH__JWT_SECRET)
            .add_source(
                Environment::with_prefix("INTERNSHIP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .with_list_parse_key("upload.allowed_extensions"),
            )
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that would only fail later at first use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message("auth.jwt_secret must be set".into()));
        }
        if !self.database.memory && self.database.url.trim().is_empty() {
            return Err(ConfigError::Message(
                "database.url must be set unless database.memory is enabled".into(),
            ));
        }
        let needs_google = self.storage.backend == StorageBackend::GoogleDrive
            || self.mirror.backend == MirrorBackend::GoogleSheets;
        if needs_google && self.google.credentials_path.is_none() {
            return Err(ConfigError::Message(
                "google.credentials_path is required for Google Drive or Sheets".into(),
            ));
        }
        if self.storage.backend == StorageBackend::GoogleDrive
            && self.storage.root_folder_id.is_none()
        {
            return Err(ConfigError::Message(
                "storage.root_folder_id is required for the google_drive backend".into(),
            ));
        }
        if self.mirror.backend == MirrorBackend::GoogleSheets
            && self.mirror.spreadsheet_id.is_none()
        {
            return Err(ConfigError::Message(
                "mirror.spreadsheet_id is required for the google_sheets backend".into(),
            ));
        }
        Ok(())
    }
}
