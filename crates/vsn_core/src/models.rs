use async_trait::async_trait;

/// Prefix of every failed generation.
pub const SQL_ERROR_PREFIX: &str = "ERROR";

/// Turns a user question into a read-only SQL query.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Returns either a query starting with `SELECT` or a message starting
    /// with `ERROR`. Never fails.
    async fn generate_sql(&self, user_query: &str) -> String;
}

pub fn is_sql_error(output: &str) -> bool {
    output.starts_with(SQL_ERROR_PREFIX)
}
