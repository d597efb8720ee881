use scraper::{Html, Selector};
use serde_json::Value;

/// Extracts `datePublished` from JSON-LD metadata in the HTML document.
/// Handles single objects, arrays and `@graph` containers.
pub fn extract_date_published(document: &Html) -> Option<String> {
    let script_selector = Selector::parse("script[type='application/ld+json']").ok()?;

    for script in document.select(&script_selector) {
        let Ok(json) = serde_json::from_str::<Value>(script.text().collect::<String>().trim()) else {
            continue;
        };
        if let Some(date) = find_date_published(&json) {
            return Some(date);
        }
    }

    None
}

fn find_date_published(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.iter().find_map(find_date_published),
        Value::Object(obj) => {
            if let Some(date) = obj.get("datePublished").and_then(|d| d.as_str()) {
                let date = date.trim();
                if !date.is_empty() {
                    return Some(date.to_string());
                }
            }
            obj.get("@graph").and_then(find_date_published)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_from_object() {
        let html = r#"<script type="application/ld+json">{"@type":"NewsArticle","datePublished":"2025-03-01T10:00:00+01:00"}</script>"#;
        let document = Html::parse_document(html);
        assert_eq!(
            extract_date_published(&document).as_deref(),
            Some("2025-03-01T10:00:00+01:00")
        );
    }

    #[test]
    fn test_date_from_graph() {
        let html = r#"<script type="application/ld+json">{"@graph":[{"@type":"WebPage"},{"@type":"NewsArticle","datePublished":"2025-03-02"}]}</script>"#;
        let document = Html::parse_document(html);
        assert_eq!(extract_date_published(&document).as_deref(), Some("2025-03-02"));
    }

    #[test]
    fn test_invalid_json_is_ignored() {
        let html = r#"<script type="application/ld+json">{not json</script>"#;
        let document = Html::parse_document(html);
        assert!(extract_date_published(&document).is_none());
    }
}
