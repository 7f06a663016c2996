use std::collections::HashMap;
use std::env;
use thiserror::Error;

const DEFAULT_MEDIA_ACCOUNT_TABLE: &str = "media-applications";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("Failed to load secrets: {0}")]
    Secrets(String),

    #[error("Failed to load BigQuery credentials: {0}")]
    Credentials(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigQueryConfig {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
    /// Service account key JSON. Application default credentials are used
    /// when absent.
    pub service_account_key: Option<String>,
}

/// Settings shared by the function entry points, resolved once at cold start.
#[derive(Debug, Clone, Default)]
pub struct HandlerConfig {
    jwt_secret: Option<String>,
    media_account_table: Option<String>,
    slack_webhook_url: Option<String>,
    bigquery_project_id: Option<String>,
    bigquery_dataset_id: Option<String>,
    bigquery_table_id: Option<String>,
    bigquery_service_account_key: Option<String>,
}

impl HandlerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Environment overlaid with values loaded from the secrets manager.
    /// Secrets win over plain environment variables.
    pub fn from_env_with(secrets: &HashMap<String, String>) -> Self {
        Self::from_lookup(|key| secrets.get(key).cloned().or_else(|| env::var(key).ok()))
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            // SECRET_KEY is the signing key name used by the token issuer
            jwt_secret: get("JWT_SECRET")
                .or_else(|| get("SECRET_KEY"))
                .map(|s| s.trim_matches('"').to_string()),
            media_account_table: get("MEDIA_ACCOUNT_TABLE"),
            slack_webhook_url: get("SLACK_WEBHOOK_URL"),
            bigquery_project_id: get("BIGQUERY_PROJECT_ID"),
            bigquery_dataset_id: get("BIGQUERY_DATASET_ID"),
            bigquery_table_id: get("BIGQUERY_TABLE_ID"),
            bigquery_service_account_key: get("BIGQUERY_SERVICE_ACCOUNT_KEY"),
        }
    }

    pub fn jwt_secret(&self) -> Result<&str, ConfigError> {
        self.jwt_secret
            .as_deref()
            .ok_or(ConfigError::Missing("JWT_SECRET or SECRET_KEY"))
    }

    pub fn media_account_table(&self) -> &str {
        self.media_account_table
            .as_deref()
            .unwrap_or(DEFAULT_MEDIA_ACCOUNT_TABLE)
    }

    /// Notifications are disabled when no webhook is configured
    pub fn slack_webhook_url(&self) -> Option<&str> {
        self.slack_webhook_url.as_deref()
    }

    pub fn bigquery(&self) -> Result<BigQueryConfig, ConfigError> {
        let required = |value: &Option<String>, key: &'static str| {
            value.clone().ok_or(ConfigError::Missing(key))
        };

        Ok(BigQueryConfig {
            project_id: required(&self.bigquery_project_id, "BIGQUERY_PROJECT_ID")?,
            dataset_id: required(&self.bigquery_dataset_id, "BIGQUERY_DATASET_ID")?,
            table_id: required(&self.bigquery_table_id, "BIGQUERY_TABLE_ID")?,
            service_account_key: self.bigquery_service_account_key.clone(),
        })
    }
}
