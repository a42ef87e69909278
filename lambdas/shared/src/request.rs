//! Helpers for reading API Gateway requests

use lambda_http::{Request, RequestExt};
use serde::de::DeserializeOwned;
use tokio::time::Instant;

use crate::catalog::PhotoTarget;
use crate::claims::{identity_from_header, CallerIdentity};
use crate::deadline;
use crate::errors::{Error, Result};
use crate::params::QueryParams;

pub fn query_params(request: &Request) -> QueryParams {
    let query = request.query_string_parameters();
    QueryParams::from_pairs(query.iter())
}

/// Identity asserted by the `Authorization` bearer token
pub fn caller_identity(request: &Request) -> Result<CallerIdentity> {
    let header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());
    Ok(identity_from_header(header)?)
}

/// Decodes a JSON body; an absent body is a validation error
pub fn json_body<T: DeserializeOwned>(request: &Request) -> Result<T> {
    let body: &[u8] = request.body().as_ref();
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::Validation("Request body is required".to_string()));
    }
    Ok(serde_json::from_slice(body)?)
}

/// Instant by which work for this request must finish, when the runtime supplied one
pub fn deadline(request: &Request) -> Option<Instant> {
    request
        .lambda_context_ref()
        .map(|ctx| deadline::from_epoch_millis(ctx.deadline))
}

/// Record kind named by the request path (`/vendor/events/photos` or `/vendor/venues/photos`)
pub fn photo_target(request: &Request) -> Result<PhotoTarget> {
    request
        .uri()
        .path()
        .split('/')
        .find_map(PhotoTarget::from_path_segment)
        .ok_or_else(|| Error::NotFound("Unknown photo resource".to_string()))
}
