use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::pipeline::BusinessService;
use crate::auth::Identity;
use crate::media_account::models::{ApplyForMediaInput, MediaApplication};
use crate::media_account::repository::MediaAccountRepository;
use crate::notify::NotificationSender;

/// Accepts media account applications: one pending application per account.
pub struct MediaAccountService {
    repository: Arc<dyn MediaAccountRepository>,
    notifier: Option<Arc<dyn NotificationSender>>,
}

impl MediaAccountService {
    pub fn new(
        repository: Arc<dyn MediaAccountRepository>,
        notifier: Option<Arc<dyn NotificationSender>>,
    ) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    pub async fn new_application(
        &self,
        identity: &Identity,
        input: ApplyForMediaInput,
    ) -> ApiResult<MediaApplication> {
        validate(&input)?;

        let address = identity.to_string();
        if self.repository.find_by_address(&address).await?.is_some() {
            return Err(ApiError::ClientError(format!(
                "media application already exists for {}",
                address
            )));
        }

        let application = MediaApplication::pending(address, input);
        self.repository.insert(&application).await?;
        info!(id = %application.id, "Media application accepted");

        self.notify(&application).await;
        Ok(application)
    }

    async fn notify(&self, application: &MediaApplication) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        let message = format!(
            "New media account application: {} <{}> {} from {}",
            application.name, application.mail_address, application.url, application.address
        );
        if let Err(e) = notifier.send(&message).await {
            warn!("Failed to send application notification: {}", e);
        }
    }
}

#[async_trait]
impl BusinessService for MediaAccountService {
    type Input = ApplyForMediaInput;
    type Output = MediaApplication;

    #[tracing::instrument(skip(self, input), fields(address = %identity))]
    async fn execute(&self, identity: &Identity, input: ApplyForMediaInput) -> ApiResult<MediaApplication> {
        self.new_application(identity, input).await
    }
}

fn validate(input: &ApplyForMediaInput) -> ApiResult<()> {
    let required = [
        ("name", &input.name),
        ("mailAddress", &input.mail_address),
        ("url", &input.url),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ApiError::ClientError(format!("{} is required", field)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::parse_address;
    use crate::media_account::repository::MockMediaAccountRepository;
    use crate::notify::MockNotificationSender;

    const ADDRESS: &str = "0xabc0000000000000000000000000000000000001";

    fn identity() -> Identity {
        Identity::verified(parse_address(ADDRESS).unwrap())
    }

    fn input() -> ApplyForMediaInput {
        ApplyForMediaInput {
            name: "Acme".to_string(),
            mail_address: "a@b.com".to_string(),
            url: "http://x".to_string(),
        }
    }

    #[tokio::test]
    async fn test_new_application_is_stored_and_notified() {
        let mut repository = MockMediaAccountRepository::new();
        repository
            .expect_find_by_address()
            .withf(|address| address == ADDRESS)
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_insert()
            .withf(|application| application.address == ADDRESS && application.name == "Acme")
            .times(1)
            .returning(|_| Ok(()));

        let mut notifier = MockNotificationSender::new();
        notifier
            .expect_send()
            .withf(|message| message.contains("Acme") && message.contains(ADDRESS))
            .times(1)
            .returning(|_| Ok(()));

        let service = MediaAccountService::new(Arc::new(repository), Some(Arc::new(notifier)));
        let application = service.execute(&identity(), input()).await.unwrap();

        assert_eq!(application.address, ADDRESS);
        assert_eq!(application.mail_address, "a@b.com");
    }

    #[tokio::test]
    async fn test_empty_field_is_client_error() {
        let mut repository = MockMediaAccountRepository::new();
        repository.expect_find_by_address().never();
        repository.expect_insert().never();

        let service = MediaAccountService::new(Arc::new(repository), None);
        let mut missing_mail = input();
        missing_mail.mail_address = String::new();

        let err = service.execute(&identity(), missing_mail).await.unwrap_err();
        assert_eq!(err, ApiError::ClientError("mailAddress is required".to_string()));
    }

    #[tokio::test]
    async fn test_duplicate_application_is_client_error() {
        let mut repository = MockMediaAccountRepository::new();
        repository
            .expect_find_by_address()
            .returning(|address| Ok(Some(MediaApplication::pending(address.to_string(), input()))));
        repository.expect_insert().never();

        let service = MediaAccountService::new(Arc::new(repository), None);
        let err = service.execute(&identity(), input()).await.unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_application() {
        let mut repository = MockMediaAccountRepository::new();
        repository.expect_find_by_address().returning(|_| Ok(None));
        repository.expect_insert().returning(|_| Ok(()));

        let mut notifier = MockNotificationSender::new();
        notifier
            .expect_send()
            .times(1)
            .returning(|_| Err(ApiError::Unexpected("webhook down".to_string())));

        let service = MediaAccountService::new(Arc::new(repository), Some(Arc::new(notifier)));
        assert!(service.execute(&identity(), input()).await.is_ok());
    }

    #[tokio::test]
    async fn test_repository_failure_is_unexpected() {
        let mut repository = MockMediaAccountRepository::new();
        repository
            .expect_find_by_address()
            .returning(|_| Err(ApiError::Unexpected("ProvisionedThroughputExceededException".to_string())));

        let service = MediaAccountService::new(Arc::new(repository), None);
        let err = service.execute(&identity(), input()).await.unwrap_err();

        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "ProvisionedThroughputExceededException");
    }
}
