use aws_lambda_events::sns::SnsEvent;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::ingest::{DataSink, UserRecord};

/// Upload every user record carried by an SNS event, in order.
#[tracing::instrument(skip(sink, event), fields(records = event.records.len()))]
pub async fn handle_sns_event(sink: &dyn DataSink, event: &SnsEvent) -> ApiResult<usize> {
    let messages = event
        .records
        .iter()
        .map(|record| (record.sns.message_id.as_str(), record.sns.message.as_str()));
    handle_messages(sink, messages).await
}

/// Parse and upload `(message id, body)` pairs one at a time. The first
/// failure stops the batch.
pub async fn handle_messages<'a, I>(sink: &dyn DataSink, messages: I) -> ApiResult<usize>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut uploaded = 0;
    for (message_id, body) in messages {
        let record: UserRecord = serde_json::from_str(body).map_err(|e| {
            ApiError::ClientError(format!(
                "Invalid user record in message {}: {}",
                message_id, e
            ))
        })?;

        sink.upload(&record).await?;
        uploaded += 1;
    }

    info!(uploaded, "User records uploaded");
    Ok(uploaded)
}
