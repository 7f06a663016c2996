use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::media_account::models::{ApplicationStatus, MediaApplication};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaAccountRepository: Send + Sync {
    async fn find_by_address(&self, address: &str) -> ApiResult<Option<MediaApplication>>;

    /// Store a new application. Fails with `ClientError` if the address
    /// already has one.
    async fn insert(&self, application: &MediaApplication) -> ApiResult<()>;
}

/// Applications stored in a DynamoDB table keyed by `address`
#[derive(Debug, Clone)]
pub struct DynamoDbMediaAccountRepository {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoDbMediaAccountRepository {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl MediaAccountRepository for DynamoDbMediaAccountRepository {
    #[tracing::instrument(skip(self), fields(table = %self.table_name))]
    async fn find_by_address(&self, address: &str) -> ApiResult<Option<MediaApplication>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("address", AttributeValue::S(address.to_string()))
            .send()
            .await
            .map_err(|e| {
                ApiError::Unexpected(format!(
                    "Failed to load media application: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        match output.item() {
            Some(item) => {
                debug!("Found existing media application");
                from_item(item).map(Some)
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self, application), fields(table = %self.table_name, address = %application.address))]
    async fn insert(&self, application: &MediaApplication) -> ApiResult<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(application)))
            .condition_expression("attribute_not_exists(address)")
            .send()
            .await
            .map_err(|e| put_error(e.into_service_error(), &application.address))?;

        info!(id = %application.id, "Media application stored");
        Ok(())
    }
}

/// A failed `attribute_not_exists` condition means the address already applied
fn put_error(err: PutItemError, address: &str) -> ApiError {
    if err.is_conditional_check_failed_exception() {
        ApiError::ClientError(format!("media application already exists for {}", address))
    } else {
        ApiError::Unexpected(format!(
            "Failed to store media application: {}",
            DisplayErrorContext(&err)
        ))
    }
}

fn to_item(application: &MediaApplication) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("address".to_string(), AttributeValue::S(application.address.clone())),
        ("id".to_string(), AttributeValue::S(application.id.to_string())),
        ("name".to_string(), AttributeValue::S(application.name.clone())),
        (
            "mailAddress".to_string(),
            AttributeValue::S(application.mail_address.clone()),
        ),
        ("url".to_string(), AttributeValue::S(application.url.clone())),
        (
            "status".to_string(),
            AttributeValue::S(application.status.as_str().to_string()),
        ),
        (
            "appliedAt".to_string(),
            AttributeValue::S(application.applied_at.to_rfc3339()),
        ),
    ])
}

fn from_item(item: &HashMap<String, AttributeValue>) -> ApiResult<MediaApplication> {
    let string = |key: &str| -> ApiResult<String> {
        item.get(key)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .ok_or_else(|| ApiError::Unexpected(format!("Stored media application is missing '{}'", key)))
    };

    let id = Uuid::parse_str(&string("id")?)
        .map_err(|e| ApiError::Unexpected(format!("Stored media application has an invalid id: {}", e)))?;
    let status = ApplicationStatus::parse(&string("status")?)
        .ok_or_else(|| ApiError::Unexpected("Stored media application has an unknown status".to_string()))?;
    let applied_at = DateTime::parse_from_rfc3339(&string("appliedAt")?)
        .map_err(|e| ApiError::Unexpected(format!("Stored media application has an invalid appliedAt: {}", e)))?
        .with_timezone(&Utc);

    Ok(MediaApplication {
        id,
        address: string("address")?,
        name: string("name")?,
        mail_address: string("mailAddress")?,
        url: string("url")?,
        status,
        applied_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_account::models::ApplyForMediaInput;
    use aws_sdk_dynamodb::types::error::{ConditionalCheckFailedException, ResourceNotFoundException};
    use pretty_assertions::assert_eq;

    fn application() -> MediaApplication {
        MediaApplication::pending(
            "0xabc0000000000000000000000000000000000001".to_string(),
            ApplyForMediaInput {
                name: "Acme".to_string(),
                mail_address: "a@b.com".to_string(),
                url: "http://x".to_string(),
            },
        )
    }

    #[test]
    fn test_item_round_trip() {
        let application = application();
        let item = to_item(&application);

        assert_eq!(item["address"].as_s().unwrap(), &application.address);
        assert_eq!(item["status"].as_s().unwrap(), "pending");
        assert_eq!(from_item(&item).unwrap(), application);
    }

    #[test]
    fn test_from_item_missing_attribute() {
        let mut item = to_item(&application());
        item.remove("mailAddress");

        let err = from_item(&item).unwrap_err();
        assert_eq!(err.to_string(), "Stored media application is missing 'mailAddress'");
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_from_item_unknown_status() {
        let mut item = to_item(&application());
        item.insert("status".to_string(), AttributeValue::S("approved".to_string()));

        let err = from_item(&item).unwrap_err();
        assert_eq!(err.to_string(), "Stored media application has an unknown status");
    }

    #[test]
    fn test_failed_condition_is_duplicate_client_error() {
        let err = PutItemError::ConditionalCheckFailedException(
            ConditionalCheckFailedException::builder()
                .message("The conditional request failed")
                .build(),
        );

        let err = put_error(err, "0xabc0000000000000000000000000000000000001");
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.to_string(),
            "media application already exists for 0xabc0000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_other_put_failures_are_unexpected() {
        let err = PutItemError::ResourceNotFoundException(
            ResourceNotFoundException::builder()
                .message("Requested resource not found")
                .build(),
        );

        let err = put_error(err, "0xabc0000000000000000000000000000000000001");
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().starts_with("Failed to store media application: "));
        assert!(err.to_string().contains("Requested resource not found"));
    }
}
