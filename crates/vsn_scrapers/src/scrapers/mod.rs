use scraper::Html;
use url::Url;
use vsn_core::{ArticleDetail, ArticleReference, DetailOutcome, Result, Source};

pub mod jsonld;
pub mod tarragona;

use tarragona::{AjuntamentVilaSecaScraper, DiariDeTarragonaScraper};

#[derive(Debug, Clone, Copy)]
pub struct SourceMetadata {
    pub source: Source,
    pub emoji: &'static str,
    pub listing_url: &'static str,
}

/// Site-specific parsing rules for one source. Implementations only parse;
/// fetching is done by the registry.
pub trait Scraper: Send + Sync {
    fn source_metadata(&self) -> SourceMetadata;

    /// Returns true if this scraper can handle the given URL
    fn can_handle(&self, url: &str) -> bool;

    /// Candidate references found on the listing page. Relative links are
    /// resolved against `base`.
    fn parse_listing(&self, document: &Html, base: &Url) -> Vec<ArticleReference>;

    fn extract_title(&self, document: &Html) -> Option<String>;

    /// Body paragraphs, trimmed and separated by a blank line.
    fn extract_content(&self, document: &Html) -> Option<String>;

    fn extract_images(&self, document: &Html, page_url: &str) -> Vec<String>;

    fn extract_date(&self, document: &Html) -> Option<String> {
        utils::extract_published_date(document)
    }

    fn extract_detail(&self, document: &Html, page_url: &str) -> DetailOutcome {
        let title = self.extract_title(document);
        let content = self.extract_content(document);

        match (title, content) {
            (Some(title), Some(content)) => DetailOutcome::Found(ArticleDetail {
                title,
                content,
                images: self.extract_images(document, page_url),
                date: self.extract_date(document),
            }),
            _ => DetailOutcome::Incomplete,
        }
    }
}

pub type ScraperFactory = fn() -> Result<Box<dyn Scraper>>;

/// Factories for every supported source, in discovery order.
pub fn get_scraper_factories() -> Vec<ScraperFactory> {
    vec![diari_de_tarragona, ajuntament_vila_seca]
}

fn diari_de_tarragona() -> Result<Box<dyn Scraper>> {
    Ok(Box::new(DiariDeTarragonaScraper::new()?))
}

fn ajuntament_vila_seca() -> Result<Box<dyn Scraper>> {
    Ok(Box::new(AjuntamentVilaSecaScraper::new()?))
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use scraper::{ElementRef, Html, Selector};
    use tracing::debug;
    use url::Url;
    use vsn_core::{Error, Result};

    use super::jsonld;

    pub fn selector(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| Error::Scraping(format!("Invalid selector {}: {}", css, e)))
    }

    pub fn element_text(element: ElementRef<'_>) -> String {
        element.text().collect::<String>().trim().to_string()
    }

    /// Text of the first match, or `None` when missing or blank.
    pub fn first_text(document: &Html, selector: &Selector) -> Option<String> {
        document
            .select(selector)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
    }

    /// Joins the trimmed text of every match with a blank line, blank
    /// paragraphs included. `None` only when the joined text is empty.
    pub fn joined_paragraphs(document: &Html, selector: &Selector) -> Option<String> {
        let joined = document
            .select(selector)
            .map(element_text)
            .collect::<Vec<_>>()
            .join("\n\n");

        Some(joined).filter(|text| !text.is_empty())
    }

    /// The page URL up to its last `/`, trailing slashes removed.
    /// `https://x/news/a1` becomes `https://x/news`.
    pub fn directory_base(url: &str) -> &str {
        match url.rfind('/') {
            Some(i) => {
                let head = &url[..=i];
                let trimmed = head.trim_end_matches('/');
                if trimmed.is_empty() {
                    head
                } else {
                    trimmed
                }
            }
            None => "",
        }
    }

    /// `src` of every matched image, resolved against the page directory.
    pub fn resolve_images(document: &Html, selector: &Selector, page_url: &str) -> Vec<String> {
        let base = Url::parse(directory_base(page_url)).ok();

        document
            .select(selector)
            .filter_map(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .filter_map(|src| {
                let resolved = match &base {
                    Some(base) => base.join(src),
                    None => Url::parse(src),
                };
                match resolved {
                    Ok(url) => Some(url.to_string()),
                    Err(e) => {
                        debug!(%src, %page_url, error = %e, "Skipping unresolvable image");
                        None
                    }
                }
            })
            .collect()
    }

    pub fn extract_published_date(document: &Html) -> Option<String> {
        let attr_rules = [
            ("meta[property='article:published_time']", "content"),
            ("meta[itemprop='datePublished']", "content"),
            ("time[datetime]", "datetime"),
        ];
        for (css, attr) in attr_rules {
            let Ok(selector) = Selector::parse(css) else {
                continue;
            };
            let found = document
                .select(&selector)
                .filter_map(|el| el.value().attr(attr))
                .map(str::trim)
                .find(|value| !value.is_empty());
            if let Some(value) = found {
                return Some(value.to_string());
            }
        }

        if let Ok(selector) = Selector::parse("[itemprop='datePublished']") {
            if let Some(text) = first_text(document, &selector) {
                return Some(text);
            }
        }

        jsonld::extract_date_published(document)
    }
}
