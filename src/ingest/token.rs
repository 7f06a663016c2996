use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::error::{ApiError, ApiResult};
use crate::config::{BigQueryConfig, ConfigError};

const BIGQUERY_INSERT_SCOPE: &str = "https://www.googleapis.com/auth/bigquery.insertdata";

/// OAuth access token for the warehouse API, asked for once per upload.
/// Implementations must hand back a token that has not expired.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> ApiResult<String>;
}

/// Google service account credentials. The provider caches the current
/// token and fetches a new one shortly before it expires.
#[derive(Clone)]
pub struct ServiceAccountTokenSource {
    provider: Arc<dyn TokenProvider>,
}

impl ServiceAccountTokenSource {
    /// Use the configured service account key, or fall back to the
    /// application default credentials of the environment.
    pub async fn from_config(config: &BigQueryConfig) -> Result<Self, ConfigError> {
        match config.service_account_key.as_deref() {
            Some(key) => Self::from_key(key),
            None => {
                info!("No BigQuery service account key, using application default credentials");
                let provider = gcp_auth::provider()
                    .await
                    .map_err(|e| ConfigError::Credentials(e.to_string()))?;
                Ok(Self { provider })
            }
        }
    }

    pub fn from_key(key: &str) -> Result<Self, ConfigError> {
        let account = CustomServiceAccount::from_json(key)
            .map_err(|e| ConfigError::Credentials(e.to_string()))?;
        Ok(Self {
            provider: Arc::new(account),
        })
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> ApiResult<String> {
        let token = self
            .provider
            .token(&[BIGQUERY_INSERT_SCOPE])
            .await
            .map_err(|e| {
                error!("Failed to obtain BigQuery access token: {}", e);
                ApiError::Unexpected(format!("Failed to obtain BigQuery access token: {}", e))
            })?;
        Ok(token.as_str().to_string())
    }
}
