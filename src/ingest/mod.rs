pub mod bigquery;
pub mod handler;
pub mod token;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;

pub use bigquery::BigQuerySink;
pub use handler::{handle_messages, handle_sns_event};
pub use token::{AccessTokenSource, ServiceAccountTokenSource};

/// User profile row forwarded to the data warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
}

/// Warehouse upload. Each call completes before the next record is sent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataSink: Send + Sync {
    async fn upload(&self, record: &UserRecord) -> ApiResult<()>;
}
