use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

use crate::api::error::{ApiError, ApiResult};
use crate::config::BigQueryConfig;
use crate::ingest::token::AccessTokenSource;
use crate::ingest::{DataSink, UserRecord};

const BIGQUERY_API: &str = "https://bigquery.googleapis.com/bigquery/v2";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllResponse {
    #[serde(default)]
    insert_errors: Vec<Value>,
}

/// Streams rows into a BigQuery table through `tabledata.insertAll`
#[derive(Clone)]
pub struct BigQuerySink {
    client: reqwest::Client,
    insert_url: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl BigQuerySink {
    pub fn new(config: &BigQueryConfig, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            client: reqwest::Client::new(),
            insert_url: insert_all_url(config),
            tokens,
        }
    }

    /// Build the insert call with a token fetched for this upload, so a
    /// warm container never sends one that has since expired.
    async fn authorized_request(&self, record: &UserRecord) -> ApiResult<reqwest::Request> {
        let token = self.tokens.access_token().await?;
        Ok(self
            .client
            .post(&self.insert_url)
            .bearer_auth(token)
            .json(&insert_request(record))
            .build()?)
    }
}

fn insert_all_url(config: &BigQueryConfig) -> String {
    format!(
        "{}/projects/{}/datasets/{}/tables/{}/insertAll",
        BIGQUERY_API, config.project_id, config.dataset_id, config.table_id
    )
}

fn insert_request(record: &UserRecord) -> Value {
    // insertId lets BigQuery drop duplicate deliveries of the same record
    json!({
        "rows": [{"insertId": record.id, "json": record}]
    })
}

fn check_insert_response(response: InsertAllResponse) -> ApiResult<()> {
    if response.insert_errors.is_empty() {
        return Ok(());
    }
    Err(ApiError::Unexpected(format!(
        "BigQuery rejected rows: {}",
        Value::Array(response.insert_errors)
    )))
}

#[async_trait]
impl DataSink for BigQuerySink {
    #[tracing::instrument(skip(self, record), fields(user_id = %record.id))]
    async fn upload(&self, record: &UserRecord) -> ApiResult<()> {
        let request = self.authorized_request(record).await?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, "BigQuery insert failed");
            return Err(ApiError::Unexpected(format!(
                "BigQuery insert failed with status {}: {}",
                status, body
            )));
        }

        check_insert_response(response.json::<InsertAllResponse>().await?)?;
        debug!("Record uploaded");
        Ok(())
    }
}
