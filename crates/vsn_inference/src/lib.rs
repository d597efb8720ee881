pub mod guard;
pub mod models;
pub mod prompt;

pub use guard::validate_select;
pub use models::{create_generator, KeywordSqlGenerator, OpenAiSqlGenerator};

pub mod prelude {
    pub use super::models::create_generator;
    pub use vsn_core::{Error, Result, SqlGenerator};
}
