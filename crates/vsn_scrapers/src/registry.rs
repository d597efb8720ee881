use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use scraper::Html;
use tracing::{error, info, warn};
use url::Url;
use vsn_core::{ArticleReference, DetailExtractor, DetailOutcome, Discovery, Result, Source};

use crate::fetch::PageFetcher;
use crate::scrapers::{get_scraper_factories, Scraper};

/// Rule sets keyed by source, plus the fetcher they share. Adding a source
/// means registering another `Scraper`; nothing else changes.
pub struct SourceRegistry {
    fetcher: Arc<dyn PageFetcher>,
    scrapers: HashMap<Source, Arc<dyn Scraper>>,
    order: Vec<Source>,
}

impl SourceRegistry {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            scrapers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registry with every built-in source, in discovery order.
    pub fn with_default_sources(fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        let mut registry = Self::new(fetcher);
        for factory in get_scraper_factories() {
            registry.register(factory()?);
        }
        Ok(registry)
    }

    /// Adds a rule set, replacing any previous one for the same source.
    pub fn register(&mut self, scraper: Box<dyn Scraper>) {
        let source = scraper.source_metadata().source;
        if self.scrapers.insert(source, Arc::from(scraper)).is_none() {
            self.order.push(source);
        }
    }

    pub fn get(&self, source: Source) -> Option<&Arc<dyn Scraper>> {
        self.scrapers.get(&source)
    }

    pub fn scrapers(&self) -> impl Iterator<Item = &Arc<dyn Scraper>> {
        self.order.iter().filter_map(|source| self.scrapers.get(source))
    }

    pub fn scraper_for_url(&self, url: &str) -> Option<&Arc<dyn Scraper>> {
        self.scrapers().find(|scraper| scraper.can_handle(url))
    }

    /// One discovery adapter per registered source, in registration order.
    pub fn discovery_adapters(&self) -> Vec<Arc<dyn Discovery>> {
        self.scrapers()
            .map(|scraper| {
                Arc::new(ListingDiscovery {
                    scraper: scraper.clone(),
                    fetcher: self.fetcher.clone(),
                }) as Arc<dyn Discovery>
            })
            .collect()
    }
}

#[async_trait]
impl DetailExtractor for SourceRegistry {
    async fn fetch_detail(&self, reference: &ArticleReference) -> DetailOutcome {
        let Some(scraper) = self.get(reference.source) else {
            warn!(source = %reference.source, "No rule set registered for source");
            return DetailOutcome::Failed(format!("no rule set for {}", reference.source));
        };

        info!(url = %reference.url, "📄 Processing article");
        let body = match self.fetcher.fetch(&reference.url).await {
            Ok(body) => body,
            Err(e) => {
                error!(url = %reference.url, error = %e, "❌ Failed to fetch article");
                return DetailOutcome::Failed(e.to_string());
            }
        };

        let document = Html::parse_document(&body);
        scraper.extract_detail(&document, &reference.url)
    }
}

/// Discovery for one source: fetch the listing page, apply the source rules.
pub struct ListingDiscovery {
    scraper: Arc<dyn Scraper>,
    fetcher: Arc<dyn PageFetcher>,
}

#[async_trait]
impl Discovery for ListingDiscovery {
    fn source(&self) -> Source {
        self.scraper.source_metadata().source
    }

    async fn discover(&self) -> Vec<ArticleReference> {
        let metadata = self.scraper.source_metadata();
        let base = match Url::parse(metadata.listing_url) {
            Ok(base) => base,
            Err(e) => {
                error!(url = metadata.listing_url, error = %e, "❌ Invalid listing URL");
                return Vec::new();
            }
        };

        info!(url = metadata.listing_url, "{} Fetching {}", metadata.emoji, metadata.source);
        let body = match self.fetcher.fetch(metadata.listing_url).await {
            Ok(body) => body,
            Err(e) => {
                error!(url = metadata.listing_url, error = %e, "❌ Failed to fetch listing page");
                return Vec::new();
            }
        };

        let document = Html::parse_document(&body);
        let references = self.scraper.parse_listing(&document, &base);
        info!(
            count = references.len(),
            "🗞️ Found {} candidate articles in {}",
            references.len(),
            metadata.source
        );
        references
    }
}
