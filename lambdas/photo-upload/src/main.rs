//! OpenTix Photo Upload Lambda
//!
//! Triggered by SQS. Each message is an SNS notification wrapping an S3 event;
//! for every new object in the photo bucket the record named by the object key
//! gets the object's public URL as its photo.

use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use opentix_core::{deadline, notifications, telemetry, AppContext, PgCatalog};
use tracing::{error, info, warn};

async fn handler(ctx: &AppContext, bucket: &str, event: LambdaEvent<SqsEvent>) -> Result<(), LambdaError> {
    let deadline = Some(deadline::from_epoch_millis(event.context.deadline));
    let records = event.payload.records;
    info!(count = records.len(), "Processing photo upload notifications");

    let mut catalog =
        deadline::within(deadline, "database connect", PgCatalog::connect(ctx.database_url())).await?;
    for record in &records {
        let message_id = record.message_id.as_deref().unwrap_or_default();
        let Some(body) = record.body.as_deref() else {
            warn!(message_id, "Skipping message without body");
            continue;
        };
        let work = notifications::record_photo_uploads(&mut catalog, body, bucket);
        match deadline::within(deadline, "photo upload message", work).await {
            Ok(updated) => info!(message_id, updated, "Processed photo upload message"),
            Err(e) => error!(message_id, error = %e, "Failed to process photo upload message"),
        }
    }
    catalog.release().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    telemetry::init();

    let ctx = AppContext::load().await?;
    let bucket = ctx.config.require_photo_bucket()?.to_string();

    let (ctx, bucket) = (&ctx, bucket.as_str());
    run(service_fn(move |event: LambdaEvent<SqsEvent>| async move {
        handler(ctx, bucket, event).await
    }))
    .await
}
