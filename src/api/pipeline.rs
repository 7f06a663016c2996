use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::api::envelope::Envelope;
use crate::api::error::ApiResult;
use crate::api::response::{failure, success, NormalizedResponse};
use crate::auth::{Authorizer, Identity};

/// Per-invocation metadata handed down from the function runtime
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    pub request_id: String,
}

impl InvocationContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

impl From<&lambda_runtime::Context> for InvocationContext {
    fn from(ctx: &lambda_runtime::Context) -> Self {
        Self::new(ctx.request_id.clone())
    }
}

/// Business input built from envelope arguments. Absent arguments arrive as
/// empty strings; rejecting them is the service's job.
pub trait FromArguments {
    fn from_arguments(envelope: &Envelope) -> Self;
}

#[async_trait]
pub trait BusinessService: Send + Sync {
    type Input: FromArguments + Send;
    type Output: Serialize + Send;

    async fn execute(&self, identity: &Identity, input: Self::Input) -> ApiResult<Self::Output>;
}

/// Decode -> Authorize -> Dispatch -> Respond.
///
/// Collaborator handles are injected once and shared by every invocation.
pub struct Pipeline<S> {
    authorizer: Authorizer,
    service: S,
}

impl<S: BusinessService> Pipeline<S> {
    pub fn new(authorizer: Authorizer, service: S) -> Self {
        Self { authorizer, service }
    }

    /// Resolver-style outcome: the typed value or the propagated error
    #[tracing::instrument(skip(self, envelope), fields(request_id = %ctx.request_id))]
    pub async fn handle(&self, ctx: &InvocationContext, envelope: &Envelope) -> ApiResult<S::Output> {
        let token = envelope.authorization();
        let identity = self.authorizer.verify(ctx, &token).await?;

        let input = S::Input::from_arguments(envelope);
        info!(address = %identity, "Dispatching to business service");
        self.service.execute(&identity, input).await
    }

    /// Gateway-style outcome: always a normalized response
    pub async fn respond(&self, ctx: &InvocationContext, envelope: &Envelope) -> NormalizedResponse {
        match self.handle(ctx, envelope).await {
            Ok(output) => success(&output),
            Err(e) => {
                error!(status = e.status_code(), "Invocation failed: {}", e);
                failure(&e)
            }
        }
    }

    /// Decode the raw event once and answer in the shape its variant expects.
    pub async fn invoke(&self, ctx: &InvocationContext, event: &Value) -> ApiResult<Value> {
        let envelope = Envelope::decode(event);
        if envelope.is_gateway() {
            let response = self.respond(ctx, &envelope).await;
            Ok(serde_json::to_value(response)?)
        } else {
            let output = self.handle(ctx, &envelope).await.map_err(|e| {
                error!(status = e.status_code(), "Invocation failed: {}", e);
                e
            })?;
            Ok(serde_json::to_value(output)?)
        }
    }
}
