use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

/// A store that hands out one session per ingestion run.
#[async_trait]
pub trait ArticleStorage: Send + Sync {
    fn name(&self) -> &str;

    /// Opens a fresh connection with a transaction already started.
    /// Failures are logged by the backend and reported as `None`.
    async fn connect(&self) -> Option<Box<dyn StorageSession>>;
}

/// A single connection owned by one run. Nothing is visible to other
/// sessions until `commit`.
#[async_trait]
pub trait StorageSession: Send {
    /// Create the `news_articles` table if it does not exist.
    async fn ensure_schema(&mut self) -> Result<()>;

    async fn exists(&mut self, url: &str) -> Result<bool>;

    async fn insert(&mut self, article: &Article) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;

    /// Releases the connection. Uncommitted work is discarded.
    async fn close(self: Box<Self>);
}
