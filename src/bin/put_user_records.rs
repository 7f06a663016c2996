use aws_lambda_events::sns::SnsEvent;
use kaleido_handlers::ingest::{handle_sns_event, BigQuerySink, ServiceAccountTokenSource};
use kaleido_handlers::{secrets, telemetry, HandlerConfig};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    telemetry::init_tracing("put-user-records");

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let secrets = secrets::load_secrets_from_manager(&sdk_config).await?;
    let config = HandlerConfig::from_env_with(&secrets);

    let bigquery = config.bigquery()?;
    info!(
        project = %bigquery.project_id,
        dataset = %bigquery.dataset_id,
        table = %bigquery.table_id,
        "Uploading user records to BigQuery"
    );
    let tokens = ServiceAccountTokenSource::from_config(&bigquery).await?;
    let sink = BigQuerySink::new(&bigquery, Arc::new(tokens));
    let sink = &sink;

    run(service_fn(|event: LambdaEvent<SnsEvent>| async move {
        info!(request_id = %event.context.request_id, "Received SNS event");
        handle_sns_event(sink, &event.payload)
            .await
            .map(|_| ())
            .map_err(Error::from)
    }))
    .await
}
