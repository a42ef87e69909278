//! OpenTix Options Lambda
//!
//! Answers CORS preflight for every resource. Preflight never fails here; the
//! browser enforces the returned origin.

use lambda_http::http::Method;
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, Response};
use opentix_core::config::origin_policy_from_env;
use opentix_core::{telemetry, Error, OriginPolicy, Responder};

fn preflight(policy: &OriginPolicy, event: &Request) -> Result<Response<Body>, Error> {
    let responder = Responder::new(policy, event);
    let outcome = if *event.method() == Method::OPTIONS {
        responder.empty(200)
    } else {
        Err(Error::MethodNotAllowed)
    };
    responder.finish(outcome)
}

async fn handler(policy: &OriginPolicy, event: Request) -> Result<Response<Body>, LambdaError> {
    Ok(preflight(policy, &event)?)
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    telemetry::init();

    let policy = origin_policy_from_env();
    let policy = &policy;
    run(service_fn(move |event: Request| async move { handler(policy, event).await })).await
}
