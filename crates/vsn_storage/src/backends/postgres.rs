use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use sqlx::{Postgres, Transaction};
use tracing::{debug, error, info};
use vsn_core::{Article, ArticleStorage, DatabaseConfig, Error, Result, StorageSession};

use crate::StorageBackend;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS news_articles (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        url VARCHAR(2048) UNIQUE NOT NULL,
        content TEXT,
        images TEXT,
        source VARCHAR(255),
        date VARCHAR(255),
        scraped_at TIMESTAMP WITH TIME ZONE
    )
"#;

const CONNECTION_HINTS: &[&str] = &[
    "SUPABASE_HOST should look like db.xxxxxxxxxxxxx.supabase.co",
    "SUPABASE_PASSWORD must be the database password",
    "your IP must be allowed by the database network restrictions",
];

/// PostgreSQL over TLS. Each `connect` opens a single-connection pool that
/// lives for one run.
pub struct PostgresStorage {
    options: PgConnectOptions,
    host: String,
}

impl PostgresStorage {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.dbname)
            .ssl_mode(PgSslMode::Require);

        Self {
            options,
            host: config.host.clone(),
        }
    }
}

impl StorageBackend for PostgresStorage {
    fn get_error_message() -> &'static [&'static str] {
        CONNECTION_HINTS
    }
}

#[async_trait]
impl ArticleStorage for PostgresStorage {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn connect(&self) -> Option<Box<dyn StorageSession>> {
        let pool = match PgPoolOptions::new()
            .max_connections(1)
            .connect_with(self.options.clone())
            .await
        {
            Ok(pool) => pool,
            Err(e) => {
                error!(host = %self.host, error = %e, "❌ Failed to connect to PostgreSQL");
                error!("Check that:");
                for (i, hint) in Self::get_error_message().iter().enumerate() {
                    error!("{}. {}", i + 1, hint);
                }
                return None;
            }
        };

        let tx = match pool.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                error!(host = %self.host, error = %e, "❌ Failed to start transaction");
                pool.close().await;
                return None;
            }
        };

        info!(host = %self.host, "🔌 Connected to PostgreSQL");
        Some(Box::new(PostgresSession { pool, tx: Some(tx) }))
    }
}

/// One run's transaction. Dropping it without `commit` rolls back.
pub struct PostgresSession {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PostgresSession {
    fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>> {
        self.tx
            .as_mut()
            .ok_or_else(|| Error::Database("transaction already finished".to_string()))
    }
}

fn db_error(action: &str, e: sqlx::Error) -> Error {
    Error::Database(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl StorageSession for PostgresSession {
    async fn ensure_schema(&mut self) -> Result<()> {
        let tx = self.tx()?;
        sqlx::query(CREATE_TABLE)
            .execute(&mut **tx)
            .await
            .map_err(|e| db_error("create news_articles table", e))?;
        info!("🗄️ Table 'news_articles' ready");
        Ok(())
    }

    async fn exists(&mut self, url: &str) -> Result<bool> {
        let tx = self.tx()?;
        let row = sqlx::query("SELECT 1 FROM news_articles WHERE url = $1")
            .bind(url)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| db_error("check article existence", e))?;
        Ok(row.is_some())
    }

    async fn insert(&mut self, article: &Article) -> Result<()> {
        let images = article.images_column()?;
        let tx = self.tx()?;

        sqlx::query(
            r#"
            INSERT INTO news_articles (title, url, content, images, source, date, scraped_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&article.title)
        .bind(&article.url)
        .bind(&article.content)
        .bind(images)
        .bind(&article.source)
        .bind(&article.date)
        .bind(article.scraped_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| db_error("insert article", e))?;

        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| Error::Database("transaction already finished".to_string()))?;
        tx.commit().await.map_err(|e| db_error("commit", e))
    }

    /// A finished transaction has nothing left to undo.
    async fn rollback(&mut self) -> Result<()> {
        match self.tx.take() {
            Some(tx) => tx.rollback().await.map_err(|e| db_error("roll back", e)),
            None => Ok(()),
        }
    }

    async fn close(self: Box<Self>) {
        let PostgresSession { pool, tx } = *self;
        if let Some(tx) = tx {
            debug!("Closing session with an open transaction, rolling back");
            if let Err(e) = tx.rollback().await {
                error!(error = %e, "❌ Rollback on close failed");
            }
        }
        pool.close().await;
        info!("🔌 Database connection closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            password: "secret".to_string(),
            user: "postgres".to_string(),
            dbname: "postgres".to_string(),
            port: 1,
        }
    }

    #[test]
    fn test_schema_matches_table_contract() {
        assert!(CREATE_TABLE.contains("CREATE TABLE IF NOT EXISTS news_articles"));
        assert!(CREATE_TABLE.contains("url VARCHAR(2048) UNIQUE NOT NULL"));
        assert!(CREATE_TABLE.contains("scraped_at TIMESTAMP WITH TIME ZONE"));
    }

    #[test]
    fn test_error_message_lists_hints() {
        assert_eq!(PostgresStorage::get_error_message().len(), 3);
    }

    /// A session whose transaction has already ended, on a pool that never connects.
    fn finished_session() -> PostgresSession {
        let options = PgConnectOptions::new().host("127.0.0.1").port(1);
        PostgresSession {
            pool: PgPoolOptions::new().max_connections(1).connect_lazy_with(options),
            tx: None,
        }
    }

    #[tokio::test]
    async fn test_finished_transaction_rejects_work() {
        let mut session = finished_session();
        assert!(session.exists("https://vila-seca.cat/es/a1").await.is_err());
        assert!(session.ensure_schema().await.is_err());
        assert!(session.commit().await.is_err());
        // Rolling back after commit or rollback is a no-op.
        assert!(session.rollback().await.is_ok());
        Box::new(session).close().await;
    }

    #[tokio::test]
    async fn test_connect_failure_returns_none() {
        // Nothing listens on port 1.
        let storage = PostgresStorage::new(&config());
        assert!(storage.connect().await.is_none());
    }
}
