use async_trait::async_trait;
use crate::types::{ArticleReference, DetailOutcome, Source};

/// Finds candidate articles on one source's listing page.
#[async_trait]
pub trait Discovery: Send + Sync {
    fn source(&self) -> Source;

    /// Never fails: network and parse problems are logged and yield no
    /// references.
    async fn discover(&self) -> Vec<ArticleReference>;
}

/// Fetches an article page and extracts its fields.
#[async_trait]
pub trait DetailExtractor: Send + Sync {
    async fn fetch_detail(&self, reference: &ArticleReference) -> DetailOutcome;
}
