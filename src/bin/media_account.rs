use aws_config::BehaviorVersion;
use kaleido_handlers::media_account::{DynamoDbMediaAccountRepository, MediaAccountService};
use kaleido_handlers::notify::{NotificationSender, SlackNotifier};
use kaleido_handlers::{
    secrets, telemetry, Authorizer, HandlerConfig, InvocationContext, JwtDidVerifier, Pipeline,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    telemetry::init_tracing("media-account");

    // Collaborator handles are built once per cold start and shared by every
    // invocation
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let secrets = secrets::load_secrets_from_manager(&sdk_config).await?;
    let config = HandlerConfig::from_env_with(&secrets);

    let verifier = Arc::new(JwtDidVerifier::new(config.jwt_secret()?));
    let repository = Arc::new(DynamoDbMediaAccountRepository::new(
        aws_sdk_dynamodb::Client::new(&sdk_config),
        config.media_account_table(),
    ));
    let notifier = config
        .slack_webhook_url()
        .map(|url| Arc::new(SlackNotifier::new(url)) as Arc<dyn NotificationSender>);
    if notifier.is_none() {
        info!("SLACK_WEBHOOK_URL not set, application notifications disabled");
    }

    let pipeline = Pipeline::new(
        Authorizer::new(verifier),
        MediaAccountService::new(repository, notifier),
    );
    let pipeline = &pipeline;

    run(service_fn(|event: LambdaEvent<Value>| async move {
        let ctx = InvocationContext::from(&event.context);
        pipeline
            .invoke(&ctx, &event.payload)
            .await
            .map_err(Error::from)
    }))
    .await
}
