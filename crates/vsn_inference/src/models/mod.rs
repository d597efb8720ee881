use std::sync::Arc;

use vsn_core::{Config, Error, Result, SqlGenerator};

pub mod dummy;
pub mod openai;

pub use dummy::KeywordSqlGenerator;
pub use openai::OpenAiSqlGenerator;

/// Builds the generator selected on the command line.
pub fn create_generator(name: &str, config: &Config) -> Result<Arc<dyn SqlGenerator>> {
    match name.to_lowercase().as_str() {
        "openai" => Ok(Arc::new(OpenAiSqlGenerator::from_config(config)?)),
        "dummy" | "keyword" => Ok(Arc::new(KeywordSqlGenerator::new())),
        other => Err(Error::Config(format!(
            "Unknown model: {}. Expected openai or dummy",
            other
        ))),
    }
}
