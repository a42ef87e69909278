//! OpenTix Vendor Tickets Lambda
//!
//! Handles /vendor/tickets:
//! - GET lists the tickets of an owned event
//! - POST queues a ticket batch on the creation topic (202)
//! - PATCH checks a ticket in

use lambda_http::http::Method;
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, Response};
use opentix_core::service::{require_vendor, tickets};
use opentix_core::{
    deadline, request, telemetry, AppContext, CallerIdentity, Catalog, CheckInRequest, Error, PgCatalog, QueryParams,
    Responder, TicketBatch,
};
use tracing::info;

/// Topic the ticket-creation consumer listens on
struct TicketTopic {
    sns: aws_sdk_sns::Client,
    arn: String,
}

impl TicketTopic {
    async fn publish(&self, batch: &TicketBatch) -> Result<(), Error> {
        let message = serde_json::to_string(batch)?;
        let output = self
            .sns
            .publish()
            .topic_arn(&self.arn)
            .message(message)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("failed to publish ticket batch: {e}")))?;
        info!(message_id = ?output.message_id(), event = %batch.event, "Queued ticket batch");
        Ok(())
    }
}

enum Action {
    List(QueryParams),
    Request(TicketBatch),
    CheckIn(CheckInRequest),
}

fn parse(event: &Request) -> Result<(CallerIdentity, Action), Error> {
    let caller = || request::caller_identity(event);
    match *event.method() {
        Method::GET => Ok((caller()?, Action::List(request::query_params(event)))),
        Method::POST => Ok((caller()?, Action::Request(request::json_body(event)?))),
        Method::PATCH => Ok((caller()?, Action::CheckIn(request::json_body(event)?))),
        _ => Err(Error::MethodNotAllowed),
    }
}

async fn perform(
    catalog: &mut dyn Catalog,
    topic: &TicketTopic,
    responder: &Responder,
    caller: &CallerIdentity,
    action: Action,
) -> Result<Response<Body>, Error> {
    let vendor = require_vendor(catalog, caller).await?;
    match action {
        Action::List(params) => responder.json(200, &tickets::list(catalog, &vendor, &params).await?),
        Action::Request(body) => {
            let batch = tickets::request_batch(catalog, &vendor, &body).await?;
            topic.publish(&batch).await?;
            responder.json(202, &batch)
        }
        Action::CheckIn(body) => responder.json(200, &tickets::check_in(catalog, &vendor, &body).await?),
    }
}

async fn serve(
    ctx: &AppContext,
    topic: &TicketTopic,
    responder: &Responder,
    event: &Request,
) -> Result<Response<Body>, Error> {
    let (caller, action) = parse(event)?;
    info!(wallet = %caller.wallet, method = %event.method(), "Processing ticket request");

    let deadline = request::deadline(event);
    let mut catalog =
        deadline::within(deadline, "database connect", PgCatalog::connect(ctx.database_url())).await?;
    let work = perform(&mut catalog, topic, responder, &caller, action);
    let outcome = deadline::within(deadline, "request processing", work).await;
    catalog.release().await;
    outcome
}

async fn handler(ctx: &AppContext, topic: &TicketTopic, event: Request) -> Result<Response<Body>, LambdaError> {
    let responder = Responder::new(&ctx.origins, &event);
    let outcome = serve(ctx, topic, &responder, &event).await;
    Ok(responder.finish(outcome)?)
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    telemetry::init();

    let ctx = AppContext::load().await?;
    let topic = TicketTopic {
        sns: aws_sdk_sns::Client::new(&ctx.sdk),
        arn: ctx.config.require_ticket_topic()?.to_string(),
    };

    let (ctx, topic) = (&ctx, &topic);
    run(service_fn(move |event: Request| async move { handler(ctx, topic, event).await })).await
}
