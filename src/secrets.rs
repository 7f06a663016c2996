use aws_config::SdkConfig;
use std::collections::HashMap;
use std::env;
use tracing::info;

use crate::config::ConfigError;

/// Load the handler secrets from AWS Secrets Manager.
///
/// If HANDLER_SECRETS_ARN is set, the secret it names must hold a JSON object
/// of string values. The returned map overlays the environment in
/// [`HandlerConfig::from_env_with`](crate::config::HandlerConfig::from_env_with).
///
/// Called once during cold start, before the first invocation.
pub async fn load_secrets_from_manager(
    sdk_config: &SdkConfig,
) -> Result<HashMap<String, String>, ConfigError> {
    let secret_arn = match env::var("HANDLER_SECRETS_ARN") {
        Ok(arn) => arn,
        Err(_) => {
            info!("HANDLER_SECRETS_ARN not set, skipping secrets loading");
            return Ok(HashMap::new());
        }
    };

    info!("Loading secrets from AWS Secrets Manager: {}", secret_arn);

    let client = aws_sdk_secretsmanager::Client::new(sdk_config);

    let response = client
        .get_secret_value()
        .secret_id(&secret_arn)
        .send()
        .await
        .map_err(|e| {
            ConfigError::Secrets(format!(
                "Failed to fetch secret from Secrets Manager: {}",
                aws_sdk_secretsmanager::error::DisplayErrorContext(&e)
            ))
        })?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| ConfigError::Secrets("Secret does not contain a string value".to_string()))?;

    let secrets = parse_secret_string(secret_string)?;
    info!("Loaded {} secrets from Secrets Manager", secrets.len());

    Ok(secrets)
}

fn parse_secret_string(secret_string: &str) -> Result<HashMap<String, String>, ConfigError> {
    serde_json::from_str(secret_string)
        .map_err(|e| ConfigError::Secrets(format!("Failed to parse secret JSON: {}", e)))
}
