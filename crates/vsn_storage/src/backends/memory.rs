use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use vsn_core::{Article, ArticleStorage, Error, Result, StorageSession};

/// Process-local store with the same visibility rules as the database:
/// inserts stay private to their session until commit.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    articles: Arc<RwLock<Vec<Article>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed articles, in insertion order.
    pub async fn articles(&self) -> Vec<Article> {
        self.articles.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.articles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.articles.read().await.is_empty()
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn connect(&self) -> Option<Box<dyn StorageSession>> {
        Some(Box::new(MemorySession {
            committed: self.articles.clone(),
            staged: Vec::new(),
            schema_ready: false,
        }))
    }
}

pub struct MemorySession {
    committed: Arc<RwLock<Vec<Article>>>,
    staged: Vec<Article>,
    schema_ready: bool,
}

impl MemorySession {
    fn check_schema(&self) -> Result<()> {
        if self.schema_ready {
            Ok(())
        } else {
            Err(Error::Database("relation \"news_articles\" does not exist".to_string()))
        }
    }
}

#[async_trait]
impl StorageSession for MemorySession {
    async fn ensure_schema(&mut self) -> Result<()> {
        self.schema_ready = true;
        Ok(())
    }

    async fn exists(&mut self, url: &str) -> Result<bool> {
        self.check_schema()?;
        if self.staged.iter().any(|a| a.url == url) {
            return Ok(true);
        }
        Ok(self.committed.read().await.iter().any(|a| a.url == url))
    }

    async fn insert(&mut self, article: &Article) -> Result<()> {
        if self.exists(&article.url).await? {
            return Err(Error::Database(format!(
                "duplicate key value violates unique constraint on url: {}",
                article.url
            )));
        }
        self.staged.push(article.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let mut committed = self.committed.write().await;
        committed.append(&mut self.staged);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.staged.clear();
        Ok(())
    }

    async fn close(self: Box<Self>) {
        if !self.staged.is_empty() {
            debug!(discarded = self.staged.len(), "Closing memory session with uncommitted articles");
        }
    }
}
