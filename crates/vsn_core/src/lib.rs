pub mod config;
pub mod error;
pub mod models;
pub mod scraping;
pub mod storage;
pub mod types;

pub use config::{Config, DatabaseConfig};
pub use error::{Error, Result};
pub use models::SqlGenerator;
pub use scraping::{DetailExtractor, Discovery};
pub use storage::{ArticleStorage, StorageSession};
pub use types::{Article, ArticleDetail, ArticleReference, DetailOutcome, Source};
