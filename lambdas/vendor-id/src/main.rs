//! OpenTix Vendor Identity Lambda
//!
//! Handles GET, POST and PATCH /vendor/id

use lambda_http::http::Method;
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, Response};
use opentix_core::service::vendors::{self, VendorLookup};
use opentix_core::{deadline, request, telemetry, AppContext, CallerIdentity, Catalog, Error, PgCatalog, Responder, VendorNameRequest};
use tracing::info;

enum Action {
    /// Public lookup, no token required
    Lookup(VendorLookup),
    Register(CallerIdentity, VendorNameRequest),
    Rename(CallerIdentity, VendorNameRequest),
}

fn parse(event: &Request) -> Result<Action, Error> {
    match *event.method() {
        Method::GET => Ok(Action::Lookup(VendorLookup::from_query(&request::query_params(event))?)),
        Method::POST => Ok(Action::Register(
            request::caller_identity(event)?,
            request::json_body(event)?,
        )),
        Method::PATCH => Ok(Action::Rename(
            request::caller_identity(event)?,
            request::json_body(event)?,
        )),
        _ => Err(Error::MethodNotAllowed),
    }
}

async fn perform(catalog: &mut dyn Catalog, responder: &Responder, action: Action) -> Result<Response<Body>, Error> {
    match action {
        Action::Lookup(lookup) => responder.json(200, &vendors::lookup(catalog, &lookup).await?),
        Action::Register(caller, body) => responder.json(201, &vendors::register(catalog, &caller, &body).await?),
        Action::Rename(caller, body) => responder.json(200, &vendors::rename(catalog, &caller, &body).await?),
    }
}

async fn serve(ctx: &AppContext, responder: &Responder, event: &Request) -> Result<Response<Body>, Error> {
    let action = parse(event)?;
    let deadline = request::deadline(event);
    let mut catalog =
        deadline::within(deadline, "database connect", PgCatalog::connect(ctx.database_url())).await?;
    let work = perform(&mut catalog, responder, action);
    let outcome = deadline::within(deadline, "database request", work).await;
    catalog.release().await;
    outcome
}

async fn handler(ctx: &AppContext, event: Request) -> Result<Response<Body>, LambdaError> {
    info!(method = %event.method(), "Processing vendor identity request");
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
