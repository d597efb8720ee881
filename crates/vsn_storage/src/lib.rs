use std::str::FromStr;
use std::sync::Arc;

use vsn_core::{ArticleStorage, Config, Error, Result};

pub mod backends;

pub use backends::*;

pub trait StorageBackend: Send + Sync {
    /// Operator-facing hints logged when the backend is unreachable.
    fn get_error_message() -> &'static [&'static str];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "supabase" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(Error::Config(format!(
                "Unknown storage backend: {} (expected postgres or memory)",
                other
            ))),
        }
    }
}

/// Builds the storage backend for `kind`. PostgreSQL needs the database
/// settings; without them ingestion stays disabled.
pub fn create_storage(kind: StorageKind, config: &Config) -> Result<Arc<dyn ArticleStorage>> {
    match kind {
        #[cfg(feature = "postgres")]
        StorageKind::Postgres => {
            let database = config.database.as_ref().ok_or_else(|| {
                Error::Config("SUPABASE_HOST and SUPABASE_PASSWORD are required".to_string())
            })?;
            Ok(Arc::new(PostgresStorage::new(database)))
        }
        #[cfg(not(feature = "postgres"))]
        StorageKind::Postgres => {
            let _ = config;
            Err(Error::Config("built without the postgres feature".to_string()))
        }
        StorageKind::Memory => Ok(Arc::new(MemoryStorage::new())),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend, StorageKind};
}
