//! OpenTix Ticket Creation Lambda
//!
//! Triggered by SQS. Each message is an SNS notification carrying a ticket
//! batch; one ticket row is written per id in the batch's inclusive range.
//! Ids that already exist are skipped, so replayed messages are harmless.

use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use opentix_core::{deadline, notifications, telemetry, AppContext, PgCatalog};
use tracing::{error, info, warn};

async fn handler(ctx: &AppContext, event: LambdaEvent<SqsEvent>) -> Result<(), LambdaError> {
    let deadline = Some(deadline::from_epoch_millis(event.context.deadline));
    let records = event.payload.records;
    info!(count = records.len(), "Processing ticket batch messages");

    let mut catalog =
        deadline::within(deadline, "database connect", PgCatalog::connect(ctx.database_url())).await?;
    for record in &records {
        let message_id = record.message_id.as_deref().unwrap_or_default();
        let Some(body) = record.body.as_deref() else {
            warn!(message_id, "Skipping message without body");
            continue;
        };
        let work = notifications::create_tickets(&mut catalog, body);
        match deadline::within(deadline, "ticket batch", work).await {
            Ok(outcome) => info!(
                message_id,
                inserted = outcome.inserted,
                skipped = outcome.skipped,
                "Processed ticket batch"
            ),
            Err(e) => error!(message_id, error = %e, "Failed to process ticket batch"),
        }
    }
    catalog.release().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    telemetry::init();

    let ctx = AppContext::load().await?;
    let ctx = &ctx;
    run(service_fn(move |event: LambdaEvent<SqsEvent>| async move { handler(ctx, event).await })).await
}
