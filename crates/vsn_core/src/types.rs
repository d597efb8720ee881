use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The news sites articles are discovered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    DiariDeTarragona,
    AjuntamentVilaSeca,
}

impl Source {
    /// Discovery order used by every ingestion run.
    pub const ALL: [Source; 2] = [Source::DiariDeTarragona, Source::AjuntamentVilaSeca];

    /// Name stored in the `source` column.
    pub fn name(&self) -> &'static str {
        match self {
            Source::DiariDeTarragona => "Diari de Tarragona",
            Source::AjuntamentVilaSeca => "Ayuntamiento Vila-seca",
        }
    }

    /// Short name accepted on the command line.
    pub fn cli_name(&self) -> &'static str {
        match self {
            Source::DiariDeTarragona => "diari",
            Source::AjuntamentVilaSeca => "ajuntament",
        }
    }

    pub fn from_cli_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|source| source.cli_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A candidate article found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleReference {
    pub url: String,
    pub source: Source,
}

impl ArticleReference {
    pub fn new(url: impl Into<String>, source: Source) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }
}

/// Fields pulled out of an article page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDetail {
    pub title: String,
    pub content: String,
    pub images: Vec<String>,
    pub date: Option<String>,
}

/// Result of fetching and parsing one article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Found(ArticleDetail),
    /// The page was fetched but the title or the body was missing.
    Incomplete,
    Failed(String),
}

impl DetailOutcome {
    pub fn into_detail(self) -> Option<ArticleDetail> {
        match self {
            DetailOutcome::Found(detail) => Some(detail),
            DetailOutcome::Incomplete | DetailOutcome::Failed(_) => None,
        }
    }
}

/// An article as written to the `news_articles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub content: String,
    pub images: Vec<String>,
    pub source: String,
    pub date: String,
    pub scraped_at: DateTime<Utc>,
}

impl Article {
    pub fn new(reference: &ArticleReference, detail: ArticleDetail, scraped_at: DateTime<Utc>) -> Self {
        Self {
            url: reference.url.clone(),
            title: detail.title,
            content: detail.content,
            images: detail.images,
            source: reference.source.name().to_string(),
            date: detail.date.unwrap_or_default(),
            scraped_at,
        }
    }

    /// The `images` column holds the image list as a JSON array.
    pub fn images_column(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(&self.images)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_cli_names() {
        assert_eq!(Source::from_cli_name("diari"), Some(Source::DiariDeTarragona));
        assert_eq!(Source::from_cli_name("Ajuntament"), Some(Source::AjuntamentVilaSeca));
        assert_eq!(Source::from_cli_name("clarin"), None);
    }

    #[test]
    fn test_article_from_reference_and_detail() {
        let reference = ArticleReference::new("https://x/a1", Source::DiariDeTarragona);
        let detail = ArticleDetail {
            title: "T".to_string(),
            content: "C".to_string(),
            images: vec!["https://x/img.jpg".to_string()],
            date: None,
        };
        let now = Utc::now();
        let article = Article::new(&reference, detail, now);

        assert_eq!(article.url, "https://x/a1");
        assert_eq!(article.source, "Diari de Tarragona");
        assert_eq!(article.date, "");
        assert_eq!(article.scraped_at, now);
        assert_eq!(article.images_column().unwrap(), r#"["https://x/img.jpg"]"#);
    }

    #[test]
    fn test_detail_outcome_into_detail() {
        assert!(DetailOutcome::Incomplete.into_detail().is_none());
        assert!(DetailOutcome::Failed("timeout".to_string()).into_detail().is_none());
    }
}
