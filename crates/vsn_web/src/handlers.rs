use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use vsn_core::models::is_sql_error;

use crate::AppState;

pub const STATUS_MESSAGE: &str = "API y scraper en ejecución";

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub ingestion: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SqlResponse {
    pub sql_query: String,
    pub error: Option<String>,
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: STATUS_MESSAGE.to_string(),
        ingestion: state.ingestion_enabled,
    })
}

pub async fn generate_sql(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Json<SqlResponse> {
    info!(query = %request.query, generator = state.generator.name(), "Generating SQL");
    let sql = state.generator.generate_sql(&request.query).await;

    if is_sql_error(&sql) {
        warn!(error = %sql, "SQL generation failed");
        return Json(SqlResponse {
            sql_query: String::new(),
            error: Some(sql),
        });
    }

    info!(sql = %sql, "SQL generated");
    Json(SqlResponse {
        sql_query: sql,
        error: None,
    })
}
