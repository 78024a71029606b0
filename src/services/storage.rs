use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tracing::warn;

use crate::{
    config::StorageBackend,
    db::{init_pool, DbPool},
    error::AppError,
    models::trip::Trip,
};

/// Key the whole collection is stored under.
pub const TRIPS_KEY: &str = "fleetTrips";

/// Read/write boundary to the persisted trip collection. Every save replaces
/// the previous value wholesale.
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Absent or unreadable data loads as an empty collection.
    async fn load(&self) -> Result<Vec<Trip>, AppError>;

    async fn save(&self, trips: &[Trip]) -> Result<(), AppError>;
}

pub async fn open_repository(
    backend: &StorageBackend,
) -> Result<Arc<dyn TripRepository>, AppError> {
    let repo: Arc<dyn TripRepository> = match backend {
        StorageBackend::JsonFile(path) => Arc::new(JsonFileStore::new(path.clone())),
        StorageBackend::Sqlite { database_url } => {
            Arc::new(SqliteStore::new(init_pool(database_url).await?))
        }
    };
    Ok(repo)
}

fn decode_trips(raw: &[u8], source: &str) -> Vec<Trip> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Vec::new();
    }
    serde_json::from_slice(raw).unwrap_or_else(|err| {
        warn!("stored trips in {source} could not be parsed, starting empty: {err}");
        Vec::new()
    })
}

#[derive(Clone)]
pub struct JsonFileStore {
    path: Arc<PathBuf>,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Arc::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TripRepository for JsonFileStore {
    async fn load(&self) -> Result<Vec<Trip>, AppError> {
        if !fs::try_exists(self.path()).await? {
            return Ok(Vec::new());
        }
        let raw = fs::read(self.path()).await?;
        Ok(decode_trips(&raw, &self.path().display().to_string()))
    }

    async fn save(&self, trips: &[Trip]) -> Result<(), AppError> {
        if let Some(dir) = self.path().parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }
        let data = serde_json::to_vec_pretty(trips)?;
        fs::write(self.path(), data).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TripRepository for SqliteStore {
    async fn load(&self) -> Result<Vec<Trip>, AppError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
                .bind(TRIPS_KEY)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value
            .map(|raw| decode_trips(raw.as_bytes(), "kv_store"))
            .unwrap_or_default())
    }

    async fn save(&self, trips: &[Trip]) -> Result<(), AppError> {
        let value = serde_json::to_string(trips)?;
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(TRIPS_KEY)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
