//! Response envelope: JSON bodies, error bodies and CORS headers
//!
//! Every response carries the same CORS header set. The allowed origin is
//! echoed back only when it matches the allow-list; anything else gets the
//! production origin, so preflight never fails here and the browser decides.

use lambda_http::{Body, Request, Response};
use serde::Serialize;
use tracing::{error, info};
use url::Url;

use crate::errors::Error;
use crate::models::ErrorResponse;

/// Canonical production domain
pub const PRODUCTION_DOMAIN: &str = "opentix.co";

pub const ALLOW_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token,X-Amz-User-Agent";
pub const ALLOW_METHODS: &str = "OPTIONS,GET,PUT,POST,PATCH,DELETE";

/// Allow-list of request origins
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    domain: String,
}

impl Default for OriginPolicy {
    fn default() -> Self {
        Self::new(PRODUCTION_DOMAIN)
    }
}

impl OriginPolicy {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    /// Origin returned when the request origin is not allowed
    pub fn fallback(&self) -> String {
        format!("https://{}", self.domain)
    }

    /// Whether `origin` is the production domain, one of its subdomains, or a
    /// local development server (`localhost` / `127.0.0.1`, any port)
    pub fn allows(&self, origin: &str) -> bool {
        let Ok(url) = Url::parse(origin) else {
            return false;
        };
        if url.path() != "/"
            || url.query().is_some()
            || url.fragment().is_some()
            || !url.username().is_empty()
            || url.password().is_some()
        {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };

        match url.scheme() {
            "https" => {
                let subdomain = host
                    .strip_suffix(self.domain.as_str())
                    .and_then(|rest| rest.strip_suffix('.'));
                url.port().is_none()
                    && (host == self.domain || subdomain.is_some_and(|s| !s.is_empty()))
            }
            "http" => host == "localhost" || host == "127.0.0.1",
            _ => false,
        }
    }

    /// Value for `Access-Control-Allow-Origin`
    pub fn allowed_origin(&self, origin: Option<&str>) -> String {
        match origin {
            Some(o) if self.allows(o) => o.to_string(),
            _ => self.fallback(),
        }
    }

    /// Full response header set for a request with the given `Origin`
    pub fn headers(&self, origin: Option<&str>) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", "application/json".to_string()),
            ("Access-Control-Allow-Headers", ALLOW_HEADERS.to_string()),
            ("Access-Control-Allow-Credentials", "true".to_string()),
            ("Access-Control-Allow-Methods", ALLOW_METHODS.to_string()),
            ("Access-Control-Allow-Origin", self.allowed_origin(origin)),
        ]
    }
}

/// `Origin` header of a request, if present and valid UTF-8
pub fn request_origin(request: &Request) -> Option<&str> {
    request
        .headers()
        .get("origin")
        .and_then(|v| v.to_str().ok())
}

/// Builds responses for one request, carrying its CORS headers
#[derive(Debug, Clone)]
pub struct Responder {
    headers: Vec<(&'static str, String)>,
}

impl Responder {
    pub fn new(policy: &OriginPolicy, request: &Request) -> Self {
        Self {
            headers: policy.headers(request_origin(request)),
        }
    }

    fn builder(&self, status: u16) -> lambda_http::http::response::Builder {
        self.headers
            .iter()
            .fold(Response::builder().status(status), |b, (name, value)| {
                b.header(*name, value.as_str())
            })
    }

    /// JSON success body
    pub fn json<T: Serialize>(&self, status: u16, body: &T) -> Result<Response<Body>, Error> {
        let body = serde_json::to_string(body)
            .map_err(|e| Error::Internal(format!("failed to encode response body: {e}")))?;
        self.builder(status)
            .body(Body::from(body))
            .map_err(|e| Error::Internal(e.to_string()))
    }

    /// Response with no body
    pub fn empty(&self, status: u16) -> Result<Response<Body>, Error> {
        self.builder(status)
            .body(Body::Empty)
            .map_err(|e| Error::Internal(e.to_string()))
    }

    /// `{"message": ...}` error body; the underlying cause is logged, never returned
    pub fn error(&self, err: &Error) -> Result<Response<Body>, Error> {
        if err.is_server_error() {
            error!(error = %err, status = err.status_code(), "Request failed");
        } else {
            info!(error = %err, status = err.status_code(), "Request rejected");
        }
        self.json(err.status_code(), &ErrorResponse::new(err.message()))
    }

    /// Turns a handler outcome into a response
    pub fn finish(&self, outcome: Result<Response<Body>, Error>) -> Result<Response<Body>, Error> {
        match outcome {
            Ok(response) => Ok(response),
            Err(err) => self.error(&err),
        }
    }
}
