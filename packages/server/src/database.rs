use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::store::{MemoryStore, RecordStore, SeaOrmStore};

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    opt.max_connections(20)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// Open the configured record store.
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn RecordStore>, DbErr> {
    if config.memory {
        info!("Using in-memory record store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let db = init_db(&config.url).await?;
    info!("Connected to database");
    Ok(Arc::new(SeaOrmStore::new(db)))
}
