use scraper::{Html, Selector};
use tracing::debug;
use url::Url;
use vsn_core::{ArticleReference, Result, Source};

use crate::scrapers::utils;
use crate::scrapers::{Scraper, SourceMetadata};

/// The town hall news page. Everything it lists is about Vila-seca.
#[derive(Debug, Clone)]
pub struct AjuntamentVilaSecaScraper {
    listing_item: Selector,
    listing_link: Selector,
    title: Selector,
    paragraphs: Selector,
    images: Selector,
}

impl AjuntamentVilaSecaScraper {
    const LISTING_URL: &'static str =
        "https://vila-seca.cat/es/actualidad-ayuntamiento/noticias-actualidad";

    pub fn new() -> Result<Self> {
        Ok(Self {
            listing_item: utils::selector("div.article-list-text")?,
            listing_link: utils::selector("h4 a")?,
            title: utils::selector(".page-header h2, h1.item-title, h1")?,
            paragraphs: utils::selector(r#"div[itemprop="articleBody"] p"#)?,
            images: utils::selector(r#"div[itemprop="articleBody"] img"#)?,
        })
    }
}

impl Scraper for AjuntamentVilaSecaScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            source: Source::AjuntamentVilaSeca,
            emoji: "🏛️",
            listing_url: Self::LISTING_URL,
        }
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("vila-seca.cat")
    }

    fn parse_listing(&self, document: &Html, base: &Url) -> Vec<ArticleReference> {
        document
            .select(&self.listing_item)
            .filter_map(|item| item.select(&self.listing_link).next())
            .filter_map(|link| link.value().attr("href"))
            .filter_map(|href| match base.join(href) {
                Ok(url) => Some(ArticleReference::new(url, Source::AjuntamentVilaSeca)),
                Err(e) => {
                    debug!(%href, error = %e, "Skipping unresolvable link");
                    None
                }
            })
            .collect()
    }

    fn extract_title(&self, document: &Html) -> Option<String> {
        utils::first_text(document, &self.title)
    }

    fn extract_content(&self, document: &Html) -> Option<String> {
        utils::joined_paragraphs(document, &self.paragraphs)
    }

    fn extract_images(&self, document: &Html, page_url: &str) -> Vec<String> {
        utils::resolve_images(document, &self.images, page_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsn_core::DetailOutcome;

    const LISTING: &str = r#"
        <div class="article-list">
            <div class="article-list-text">
                <h4><a href="/es/actualidad-ayuntamiento/noticias-actualidad/nueva-biblioteca">Nueva biblioteca</a></h4>
            </div>
            <div class="article-list-text">
                <h4><a href="noticia-relativa">Fiesta mayor</a></h4>
            </div>
            <div class="article-list-text">
                <h4><a>Sin enlace</a></h4>
            </div>
            <div class="article-list-text">
                <h3><a href="/es/otra">Otro formato</a></h3>
            </div>
        </div>
    "#;

    const DETAIL: &str = r#"
        <html><body>
            <div class="page-header"><h2>Nueva biblioteca municipal</h2></div>
            <h1>Ayuntamiento de Vila-seca</h1>
            <div itemprop="articleBody">
                <p>El consistorio abre la biblioteca.</p>
                <p>  </p>
                <p>Horario de 9 a 21 h.</p>
                <img src="images/noticias/biblioteca.jpg">
            </div>
            <time datetime="2025-04-30">30/04/2025</time>
        </body></html>
    "#;

    #[test]
    fn test_can_handle() {
        let scraper = AjuntamentVilaSecaScraper::new().unwrap();
        assert!(scraper.can_handle("https://vila-seca.cat/es/noticia"));
        assert!(!scraper.can_handle("https://www.diaridetarragona.com/a.html"));
    }

    #[test]
    fn test_listing_resolves_relative_links() {
        let scraper = AjuntamentVilaSecaScraper::new().unwrap();
        let base = Url::parse(AjuntamentVilaSecaScraper::LISTING_URL).unwrap();
        let document = Html::parse_document(LISTING);

        let references = scraper.parse_listing(&document, &base);
        let urls: Vec<&str> = references.iter().map(|r| r.url.as_str()).collect();

        assert_eq!(
            urls,
            vec![
                "https://vila-seca.cat/es/actualidad-ayuntamiento/noticias-actualidad/nueva-biblioteca",
                "https://vila-seca.cat/es/actualidad-ayuntamiento/noticia-relativa",
            ]
        );
        assert!(references.iter().all(|r| r.source == Source::AjuntamentVilaSeca));
    }

    #[test]
    fn test_listing_percent_encodes_non_ascii_slugs() {
        let scraper = AjuntamentVilaSecaScraper::new().unwrap();
        let base = Url::parse(AjuntamentVilaSecaScraper::LISTING_URL).unwrap();
        let document = Html::parse_document(
            r#"<div class="article-list-text"><h4><a href="/es/notícia">Notícia</a></h4></div>"#,
        );

        let references = scraper.parse_listing(&document, &base);
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].url, "https://vila-seca.cat/es/not%C3%ADcia");
    }

    #[test]
    fn test_extract_detail() {
        let scraper = AjuntamentVilaSecaScraper::new().unwrap();
        let document = Html::parse_document(DETAIL);
        let url = "https://vila-seca.cat/es/actualidad-ayuntamiento/noticias-actualidad/nueva-biblioteca";

        let DetailOutcome::Found(detail) = scraper.extract_detail(&document, url) else {
            panic!("expected a complete article");
        };
        assert_eq!(detail.title, "Nueva biblioteca municipal");
        assert_eq!(detail.content, "El consistorio abre la biblioteca.\n\n\n\nHorario de 9 a 21 h.");
        assert_eq!(
            detail.images,
            vec!["https://vila-seca.cat/es/actualidad-ayuntamiento/images/noticias/biblioteca.jpg".to_string()]
        );
        assert_eq!(detail.date.as_deref(), Some("2025-04-30"));
    }

    #[test]
    fn test_blank_paragraphs_are_kept() {
        let scraper = AjuntamentVilaSecaScraper::new().unwrap();
        let url = "https://vila-seca.cat/es/x";
        let document = Html::parse_document(
            r#"<div class="page-header"><h2>Títol</h2></div>
               <div itemprop="articleBody"><p>A</p><p> </p><p>B</p></div>"#,
        );
        let DetailOutcome::Found(detail) = scraper.extract_detail(&document, url) else {
            panic!("expected a complete article");
        };
        assert_eq!(detail.content, "A\n\n\n\nB");

        let document = Html::parse_document(
            r#"<div class="page-header"><h2>Títol</h2></div>
               <div itemprop="articleBody"><p> </p><p> </p></div>"#,
        );
        let DetailOutcome::Found(detail) = scraper.extract_detail(&document, url) else {
            panic!("expected blank paragraphs to count as content");
        };
        assert_eq!(detail.content, "\n\n");
    }

    #[test]
    fn test_missing_body_is_incomplete() {
        let scraper = AjuntamentVilaSecaScraper::new().unwrap();
        let document = Html::parse_document("<h1>Solo título</h1>");
        assert_eq!(
            scraper.extract_detail(&document, "https://vila-seca.cat/es/x"),
            DetailOutcome::Incomplete
        );
    }
}
