use async_trait::async_trait;
use vsn_core::SqlGenerator;

use crate::guard::error_message;

/// Words that never name an entity.
const STOPWORDS: &[&str] = &[
    "a", "al", "con", "de", "del", "donde", "el", "en", "es", "hablar", "la", "las", "llamar",
    "los", "me", "mi", "numero", "número", "para", "por", "quiero", "comunicarme", "contactar",
    "cual", "cuál", "telefono", "teléfono", "tel", "un", "una", "y",
];

/// Words that stand for a different entity name.
const ALIASES: &[(&str, &str)] = &[("alcalde", "ayuntamiento"), ("alcaldesa", "ayuntamiento")];

/// Offline generator: picks the first meaningful word of the question and
/// builds the `ILIKE` lookup from it. Deterministic, no network.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordSqlGenerator;

impl KeywordSqlGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn keyword(user_query: &str) -> Option<String> {
        user_query
            .split_whitespace()
            .map(|word| {
                word.chars()
                    .filter(|c| c.is_alphanumeric() || *c == '-')
                    .collect::<String>()
                    .to_lowercase()
            })
            .filter(|word| !word.is_empty() && !STOPWORDS.contains(&word.as_str()))
            .map(|word| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == word)
                    .map(|(_, entity)| entity.to_string())
                    .unwrap_or(word)
            })
            .next()
    }
}

#[async_trait]
impl SqlGenerator for KeywordSqlGenerator {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate_sql(&self, user_query: &str) -> String {
        match Self::keyword(user_query) {
            Some(keyword) => format!(
                "SELECT telefono FROM telefonos_de_interes WHERE nombre_entidad ILIKE '%{}%';",
                keyword
            ),
            None => error_message("No se ha podido generar una consulta para la pregunta."),
        }
    }
}
