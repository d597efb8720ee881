use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use vsn_core::{
    Article, ArticleReference, ArticleStorage, DetailExtractor, DetailOutcome, Discovery, Result,
    StorageSession,
};

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub discovered: usize,
    pub already_stored: usize,
    /// References whose page was missing a title or body, or could not be fetched.
    pub incomplete: usize,
    pub new_articles: usize,
}

/// How one ingestion run ended. There is no crash variant: every failure is
/// contained and reported here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Committed(RunStats),
    NothingDiscovered,
    ConnectionUnavailable,
    SchemaFailed(String),
    RolledBack { reason: String, stats: RunStats },
    AlreadyRunning,
}

impl RunOutcome {
    /// Articles made visible by this run.
    pub fn new_articles(&self) -> usize {
        match self {
            RunOutcome::Committed(stats) => stats.new_articles,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceOutcome {
    Stored,
    AlreadyStored,
    Incomplete,
}

/// Runs discovery, extraction, dedup and persistence as one transaction.
pub struct IngestManager {
    storage: Arc<dyn ArticleStorage>,
    discoveries: Vec<Arc<dyn Discovery>>,
    extractor: Arc<dyn DetailExtractor>,
    run_lock: Mutex<()>,
}

impl IngestManager {
    pub fn new(
        storage: Arc<dyn ArticleStorage>,
        discoveries: Vec<Arc<dyn Discovery>>,
        extractor: Arc<dyn DetailExtractor>,
    ) -> Self {
        Self {
            storage,
            discoveries,
            extractor,
            run_lock: Mutex::new(()),
        }
    }

    pub fn storage_name(&self) -> &str {
        self.storage.name()
    }

    /// References from every source, in registration order.
    pub async fn discover_all(&self) -> Vec<ArticleReference> {
        let mut references = Vec::new();
        for discovery in &self.discoveries {
            let found = discovery.discover().await;
            debug!(source = %discovery.source(), count = found.len(), "Discovery finished");
            references.extend(found);
        }
        references
    }

    /// One full ingestion run. Overlapping calls return `AlreadyRunning`
    /// without touching storage.
    pub async fn run_once(&self) -> RunOutcome {
        let Ok(_guard) = self.run_lock.try_lock() else {
            warn!("⏳ Ingestion run already in progress, skipping");
            return RunOutcome::AlreadyRunning;
        };

        info!(storage = self.storage.name(), "🚀 Starting ingestion run");
        let Some(mut session) = self.storage.connect().await else {
            error!("❌ No database connection, ingestion run aborted");
            return RunOutcome::ConnectionUnavailable;
        };

        let mut stats = RunStats::default();
        let processed = AssertUnwindSafe(self.process(session.as_mut(), &mut stats))
            .catch_unwind()
            .await;

        let outcome = match processed {
            Ok(outcome) => outcome,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(%reason, "💥 Ingestion run panicked");
                rollback(session.as_mut()).await;
                RunOutcome::RolledBack { reason, stats }
            }
        };

        session.close().await;
        log_outcome(&outcome);
        outcome
    }

    async fn process(&self, session: &mut dyn StorageSession, stats: &mut RunStats) -> RunOutcome {
        if let Err(e) = session.ensure_schema().await {
            error!(error = %e, "❌ Could not create the news_articles table");
            rollback(session).await;
            return RunOutcome::SchemaFailed(e.to_string());
        }

        let references = self.discover_all().await;
        stats.discovered = references.len();
        if references.is_empty() {
            info!("📭 No articles found in any source");
            return RunOutcome::NothingDiscovered;
        }
        info!(count = references.len(), "🔎 Found {} candidate articles", references.len());

        for reference in &references {
            match self.process_reference(session, reference).await {
                Ok(ReferenceOutcome::Stored) => stats.new_articles += 1,
                Ok(ReferenceOutcome::AlreadyStored) => stats.already_stored += 1,
                Ok(ReferenceOutcome::Incomplete) => stats.incomplete += 1,
                Err(e) => {
                    error!(url = %reference.url, error = %e, "❌ Database error, rolling back");
                    rollback(session).await;
                    return RunOutcome::RolledBack {
                        reason: e.to_string(),
                        stats: *stats,
                    };
                }
            }
        }

        if let Err(e) = session.commit().await {
            error!(error = %e, "❌ Commit failed, rolling back");
            rollback(session).await;
            return RunOutcome::RolledBack {
                reason: e.to_string(),
                stats: *stats,
            };
        }

        RunOutcome::Committed(*stats)
    }

    /// Existence check first; the extractor only sees unknown URLs.
    pub async fn process_reference(
        &self,
        session: &mut dyn StorageSession,
        reference: &ArticleReference,
    ) -> Result<ReferenceOutcome> {
        if session.exists(&reference.url).await? {
            debug!(url = %reference.url, "Already stored");
            return Ok(ReferenceOutcome::AlreadyStored);
        }

        match self.extractor.fetch_detail(reference).await {
            DetailOutcome::Found(detail) => {
                let article = Article::new(reference, detail, Utc::now());
                session.insert(&article).await?;
                info!(url = %article.url, "✅ Stored: {}", article.title);
                Ok(ReferenceOutcome::Stored)
            }
            DetailOutcome::Incomplete => {
                warn!(url = %reference.url, "⚠️ Missing title or content, skipping");
                Ok(ReferenceOutcome::Incomplete)
            }
            DetailOutcome::Failed(reason) => {
                warn!(url = %reference.url, %reason, "⚠️ Could not fetch article, skipping");
                Ok(ReferenceOutcome::Incomplete)
            }
        }
    }
}

async fn rollback(session: &mut dyn StorageSession) {
    if let Err(e) = session.rollback().await {
        error!(error = %e, "❌ Rollback failed");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn log_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Committed(stats) => info!(
            new = stats.new_articles,
            existing = stats.already_stored,
            incomplete = stats.incomplete,
            "🎉 Ingestion finished: {} new articles saved",
            stats.new_articles
        ),
        RunOutcome::RolledBack { reason, stats } => error!(
            %reason,
            discarded = stats.new_articles,
            "↩️ Ingestion rolled back"
        ),
        RunOutcome::SchemaFailed(reason) => error!(%reason, "Ingestion aborted"),
        RunOutcome::NothingDiscovered
        | RunOutcome::ConnectionUnavailable
        | RunOutcome::AlreadyRunning => {}
    }
}
