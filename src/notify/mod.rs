pub mod slack;

use async_trait::async_trait;

use crate::api::error::ApiResult;

pub use slack::SlackNotifier;

/// Outbound notification channel. Callers treat delivery as best effort:
/// a failed send is logged and never fails the invocation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, message: &str) -> ApiResult<()>;
}
