use clap::{Args, Subcommand};
use vsn_core::{ArticleReference, DetailExtractor, DetailOutcome, Error, Result, Source};

use crate::manager::{IngestManager, RunOutcome};
use crate::registry::SourceRegistry;

#[derive(Args, Debug)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug)]
pub enum ScraperCommands {
    /// Run one ingestion pass and commit new articles
    Run,
    /// List available sources
    List,
    /// Print the articles found on the listing pages without storing them
    Discover {
        /// Only this source (diari or ajuntament)
        source: Option<String>,
    },
    /// Extract and print a single article
    Url {
        url: String,
    },
}

pub async fn handle_command(
    args: ScraperArgs,
    registry: &SourceRegistry,
    manager: &IngestManager,
) -> Result<()> {
    match args.command {
        ScraperCommands::Run => match manager.run_once().await {
            RunOutcome::Committed(stats) => {
                println!(
                    "🎉 {} new articles saved ({} found, {} already stored, {} incomplete)",
                    stats.new_articles, stats.discovered, stats.already_stored, stats.incomplete
                );
            }
            RunOutcome::NothingDiscovered => println!("📭 No articles found"),
            RunOutcome::ConnectionUnavailable => {
                return Err(Error::Database("no database connection".to_string()));
            }
            RunOutcome::SchemaFailed(reason) => return Err(Error::Database(reason)),
            RunOutcome::RolledBack { reason, .. } => {
                return Err(Error::Database(format!("run rolled back: {}", reason)));
            }
            RunOutcome::AlreadyRunning => println!("⏳ A run is already in progress"),
        },
        ScraperCommands::List => {
            println!("Available sources:");
            for scraper in registry.scrapers() {
                let meta = scraper.source_metadata();
                println!(
                    "  {} {:<11} {} ({})",
                    meta.emoji,
                    meta.source.cli_name(),
                    meta.source,
                    meta.listing_url
                );
            }
        }
        ScraperCommands::Discover { source } => {
            let wanted = source.as_deref().map(parse_source).transpose()?;
            for discovery in registry.discovery_adapters() {
                if wanted.is_some_and(|wanted| wanted != discovery.source()) {
                    continue;
                }
                let references = discovery.discover().await;
                println!("{}: {} articles", discovery.source(), references.len());
                for reference in references {
                    println!("  {}", reference.url);
                }
            }
        }
        ScraperCommands::Url { url } => {
            let scraper = registry
                .scraper_for_url(&url)
                .ok_or_else(|| Error::Scraping(format!("No scraper found for URL: {}", url)))?;
            let reference = ArticleReference::new(url, scraper.source_metadata().source);

            match registry.fetch_detail(&reference).await {
                DetailOutcome::Found(detail) => {
                    println!("📰 {}", detail.title);
                    println!("🔗 {}", reference.url);
                    if let Some(date) = &detail.date {
                        println!("📅 {}", date);
                    }
                    for image in &detail.images {
                        println!("🖼️ {}", image);
                    }
                    println!("\n{}", detail.content);
                }
                DetailOutcome::Incomplete => {
                    println!("⚠️ Missing title or content: {}", reference.url);
                }
                DetailOutcome::Failed(reason) => return Err(Error::Scraping(reason)),
            }
        }
    }
    Ok(())
}

/// Accepts a source's short CLI name, case-insensitive.
pub fn parse_source(source: &str) -> Result<Source> {
    Source::from_cli_name(source).ok_or_else(|| {
        let known: Vec<&str> = Source::ALL.iter().map(|s| s.cli_name()).collect();
        Error::Scraping(format!(
            "Unknown source: {}. Expected one of: {}",
            source,
            known.join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::FixtureFetcher;
    use std::sync::Arc;
    use vsn_storage::MemoryStorage;

    #[test]
    fn test_parse_source() {
        assert_eq!(parse_source("diari").unwrap(), Source::DiariDeTarragona);
        assert_eq!(parse_source("AJUNTAMENT").unwrap(), Source::AjuntamentVilaSeca);

        let err = parse_source("argentina/clarin").unwrap_err();
        assert!(err.to_string().contains("diari, ajuntament"));
    }

    #[tokio::test]
    async fn test_run_command_commits() {
        let listing = r#"<div class="article-list-text"><h4><a href="/es/noticia-1">Nota</a></h4></div>"#;
        let article = r#"<h1>Nota</h1><div itemprop="articleBody"><p>Texto.</p></div>"#;
        let fetcher = Arc::new(
            FixtureFetcher::default()
                .with_page("https://vila-seca.cat/es/actualidad-ayuntamiento/noticias-actualidad", listing)
                .with_page("https://vila-seca.cat/es/noticia-1", article),
        );
        let registry = Arc::new(SourceRegistry::with_default_sources(fetcher).unwrap());
        let storage = MemoryStorage::new();
        let manager = IngestManager::new(
            Arc::new(storage.clone()),
            registry.discovery_adapters(),
            registry.clone(),
        );

        let args = ScraperArgs {
            command: ScraperCommands::Run,
        };
        handle_command(args, &registry, &manager).await.unwrap();

        let articles = storage.articles().await;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].url, "https://vila-seca.cat/es/noticia-1");
        assert_eq!(articles[0].source, "Ayuntamiento Vila-seca");
    }

    #[tokio::test]
    async fn test_url_command_rejects_unknown_site() {
        let registry = Arc::new(
            SourceRegistry::with_default_sources(Arc::new(FixtureFetcher::default())).unwrap(),
        );
        let manager = IngestManager::new(
            Arc::new(MemoryStorage::new()),
            registry.discovery_adapters(),
            registry.clone(),
        );

        let args = ScraperArgs {
            command: ScraperCommands::Url {
                url: "https://www.clarin.com/politica/nota.html".to_string(),
            },
        };
        assert!(handle_command(args, &registry, &manager).await.is_err());
    }
}
