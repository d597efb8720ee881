use scraper::{Html, Selector};
use tracing::debug;
use url::Url;
use vsn_core::{ArticleReference, Result, Source};

use super::mentions_municipality;
use crate::scrapers::utils::{self, element_text};
use crate::scrapers::{Scraper, SourceMetadata};

/// Regional newspaper. Its front page covers the whole province, so
/// listing entries are kept only when the headline names Vila-seca.
#[derive(Debug, Clone)]
pub struct DiariDeTarragonaScraper {
    listing_article: Selector,
    listing_title: Selector,
    link: Selector,
    title: Selector,
    paragraphs: Selector,
    images: Selector,
}

impl DiariDeTarragonaScraper {
    const LISTING_URL: &'static str = "https://www.diaridetarragona.com/";

    pub fn new() -> Result<Self> {
        Ok(Self {
            listing_article: utils::selector("article")?,
            listing_title: utils::selector("h2.c-article__title, h3.c-article__title")?,
            link: utils::selector("a")?,
            title: utils::selector("h1.c-detail__title")?,
            paragraphs: utils::selector("div.c-detail__body p.paragraph")?,
            images: utils::selector("figure.c-detail__media img, div.c-detail__body img")?,
        })
    }
}

impl Scraper for DiariDeTarragonaScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            source: Source::DiariDeTarragona,
            emoji: "📰",
            listing_url: Self::LISTING_URL,
        }
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("diaridetarragona.com")
    }

    fn parse_listing(&self, document: &Html, base: &Url) -> Vec<ArticleReference> {
        let mut references = Vec::new();

        for article in document.select(&self.listing_article) {
            let Some(heading) = article.select(&self.listing_title).next() else {
                continue;
            };
            let Some(href) = heading
                .select(&self.link)
                .next()
                .and_then(|a| a.value().attr("href"))
            else {
                continue;
            };

            let title = element_text(heading);
            if !mentions_municipality(&title) {
                continue;
            }

            match base.join(href) {
                Ok(url) => references.push(ArticleReference::new(url, Source::DiariDeTarragona)),
                Err(e) => debug!(%href, error = %e, "Skipping unresolvable link"),
            }
        }

        references
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
        <html><body>
            <article>
                <h2 class="c-article__title"><a href="/tarragona/vila-seca-obre-la-biblioteca-2025.html">Vila-seca obre la nova biblioteca</a></h2>
            </article>
            <article>
                <h3 class="c-article__title"><a href="https://www.diaridetarragona.com/costa/vilaseca-platja.html">La platja de Vilaseca, plena</a></h3>
            </article>
            <article>
                <h2 class="c-article__title"><a href="/reus/fira.html">Reus inaugura la fira</a></h2>
            </article>
            <article>
                <h2 class="c-article__title">Vila-seca sense enllaç</h2>
            </article>
            <article>
                <h2 class="other-title"><a href="/vila-seca/altre.html">Vila-seca en un altre format</a></h2>
            </article>
        </body></html>
    "#;

    const DETAIL: &str = r#"
        <html><head>
            <meta property="article:published_time" content="2025-05-06T08:00:00+02:00">
        </head><body>
            <h1 class="c-detail__title">  Vila-seca obre la nova biblioteca </h1>
            <figure class="c-detail__media"><img src="/uploads/biblioteca.jpg"></figure>
            <div class="c-detail__body">
                <p class="paragraph"> L'Ajuntament ha inaugurat l'equipament. </p>
                <p class="other">Publicitat</p>
                <p class="paragraph">Obrirà cada dia.</p>
                <img src="fotos/interior.jpg">
            </div>
        </body></html>
    "#;

    #[test]
    fn test_can_handle() {
        let scraper = DiariDeTarragonaScraper::new().unwrap();
        assert!(scraper.can_handle("https://www.diaridetarragona.com/tarragona/article.html"));
        assert!(!scraper.can_handle("https://vila-seca.cat/es/noticia"));
    }

    #[test]
    fn test_listing_keeps_only_vila_seca_titles() {
        let scraper = DiariDeTarragonaScraper::new().unwrap();
        let base = Url::parse(DiariDeTarragonaScraper::LISTING_URL).unwrap();
        let document = Html::parse_document(LISTING);

        let references = scraper.parse_listing(&document, &base);
        let urls: Vec<&str> = references.iter().map(|r| r.url.as_str()).collect();

        assert_eq!(
            urls,
            vec![
                "https://www.diaridetarragona.com/tarragona/vila-seca-obre-la-biblioteca-2025.html",
                "https://www.diaridetarragona.com/costa/vilaseca-platja.html",
            ]
        );
        assert!(references.iter().all(|r| r.source == Source::DiariDeTarragona));
    }

    #[test]
    fn test_extract_detail() {
        let scraper = DiariDeTarragonaScraper::new().unwrap();
        let document = Html::parse_document(DETAIL);
        let url = "https://www.diaridetarragona.com/tarragona/vila-seca-obre-la-biblioteca-2025.html";

        let DetailOutcome::Found(detail) = scraper.extract_detail(&document, url) else {
            panic!("expected a complete article");
        };
        assert_eq!(detail.title, "Vila-seca obre la nova biblioteca");
        assert_eq!(
            detail.content,
            "L'Ajuntament ha inaugurat l'equipament.\n\nObrirà cada dia."
        );
        assert_eq!(
            detail.images,
            vec![
                "https://www.diaridetarragona.com/uploads/biblioteca.jpg".to_string(),
                "https://www.diaridetarragona.com/fotos/interior.jpg".to_string(),
            ]
        );
        assert_eq!(detail.date.as_deref(), Some("2025-05-06T08:00:00+02:00"));
    }

    #[test]
    fn test_paywalled_article_is_incomplete() {
        let scraper = DiariDeTarragonaScraper::new().unwrap();
        let document = Html::parse_document(
            r#"<h1 class="c-detail__title">Exclusiva</h1><div class="paywall">Subscriu-te</div>"#,
        );
        assert_eq!(
            scraper.extract_detail(&document, "https://www.diaridetarragona.com/a.html"),
            DetailOutcome::Incomplete
        );
    }
}
