//! OpenTix Vendor Venues Lambda
//!
//! Handles GET, POST and PATCH /vendor/venues

use lambda_http::http::Method;
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, Response};
use opentix_core::service::venues::{self, VenueQuery};
use opentix_core::service::require_vendor;
use opentix_core::{
    deadline, request, telemetry, AppContext, CallerIdentity, Catalog, CreateVenueRequest, Error, PatchVenueRequest,
    PgCatalog, Responder,
};
use tracing::info;

enum Action {
    Get(VenueQuery),
    Create(CreateVenueRequest),
    Patch(PatchVenueRequest),
}

fn parse(event: &Request) -> Result<(CallerIdentity, Action), Error> {
    let caller = || request::caller_identity(event);
    match *event.method() {
        Method::GET => Ok((caller()?, Action::Get(VenueQuery::from_query(&request::query_params(event))?))),
        Method::POST => Ok((caller()?, Action::Create(request::json_body(event)?))),
        Method::PATCH => Ok((caller()?, Action::Patch(request::json_body(event)?))),
        _ => Err(Error::MethodNotAllowed),
    }
}

async fn perform(
    catalog: &mut dyn Catalog,
    responder: &Responder,
    caller: &CallerIdentity,
    action: Action,
) -> Result<Response<Body>, Error> {
    let vendor = require_vendor(catalog, caller).await?;
    match action {
        Action::Get(query) => responder.json(200, &venues::get(catalog, &vendor, &query).await?),
        Action::Create(body) => responder.json(201, &venues::create(catalog, &vendor, &body).await?),
        Action::Patch(body) => responder.json(200, &venues::patch(catalog, &vendor, &body).await?),
    }
}

async fn serve(ctx: &AppContext, responder: &Responder, event: &Request) -> Result<Response<Body>, Error> {
    let (caller, action) = parse(event)?;
    info!(wallet = %caller.wallet, method = %event.method(), "Processing venue request");

    let deadline = request::deadline(event);
    let mut catalog =
        deadline::within(deadline, "database connect", PgCatalog::connect(ctx.database_url())).await?;
    let work = perform(&mut catalog, responder, &caller, action);
    let outcome = deadline::within(deadline, "database request", work).await;
    catalog.release().await;
    outcome
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
