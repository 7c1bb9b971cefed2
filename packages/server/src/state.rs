use std::sync::Arc;

use common::storage::LocalFileStore;

use crate::config::AppConfig;
use crate::store::RecordStore;
use crate::workflow::InternshipWorkflow;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn RecordStore>,
    pub workflow: Arc<InternshipWorkflow>,
    /// Present only with the `local` storage backend.
    pub local_files: Option<Arc<LocalFileStore>>,
}
