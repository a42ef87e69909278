//! OpenTix Public Events Lambda
//!
//! Handles GET /user/events. No token is required.

use lambda_http::http::Method;
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, Response};
use opentix_core::service::events;
use opentix_core::{deadline, request, telemetry, AppContext, Error, EventSearch, PgCatalog, Responder};
use tracing::info;

async fn serve(ctx: &AppContext, responder: &Responder, event: &Request) -> Result<Response<Body>, Error> {
    if *event.method() != Method::GET {
        return Err(Error::MethodNotAllowed);
    }
    let search = EventSearch::from_query(&request::query_params(event));
    info!(
        page = search.filter.page.number(),
        zip = %search.zip,
        event_type = %search.event_type,
        "Searching events"
    );

    let deadline = request::deadline(event);
    let mut catalog =
        deadline::within(deadline, "database connect", PgCatalog::connect(ctx.database_url())).await?;
    let work = events::search(&mut catalog, &search);
    let outcome = deadline::within(deadline, "database request", work).await;
    catalog.release().await;
    responder.json(200, &outcome?)
}

async fn handler(ctx: &AppContext, event: Request) -> Result<Response<Body>, LambdaError> {
    let responder = Responder::new(&ctx.origins, &event);
    let outcome = serve(ctx, &responder, &event).await;
    Ok(responder.finish(outcome)?)
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    telemetry::init();

    let ctx = AppContext::load().await?;
    let ctx = &ctx;
    run(service_fn(move |event: Request| async move { handler(ctx, event).await })).await
}
