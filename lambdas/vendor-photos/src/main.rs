//! OpenTix Vendor Photos Lambda
//!
//! Handles POST and DELETE /vendor/events/photos and /vendor/venues/photos.
//! POST checks the record and returns a pre-signed S3 PUT request; the upload
//! itself is picked up later by the photo-upload consumer.

use std::collections::BTreeMap;
use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use lambda_http::http::Method;
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, Response};
use opentix_core::service::{photos, require_vendor};
use opentix_core::{
    deadline, request, telemetry, AppContext, CallerIdentity, Catalog, Error, PgCatalog, PhotoRequest, PhotoTarget,
    PhotoUploadResponse, PresignedUpload, Responder,
};
use tracing::info;

const UPLOAD_EXPIRY: Duration = Duration::from_secs(15 * 60);
const UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// Bucket and client used to sign uploads
struct PhotoStore {
    s3: aws_sdk_s3::Client,
    bucket: String,
}

impl PhotoStore {
    async fn presign_put(&self, key: &str) -> Result<PresignedUpload, Error> {
        let config = PresigningConfig::expires_in(UPLOAD_EXPIRY).map_err(|e| Error::Internal(e.to_string()))?;
        let presigned = self
            .s3
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(UPLOAD_CONTENT_TYPE)
            .presigned(config)
            .await
            .map_err(|e| Error::Upstream(format!("failed to presign upload: {e}")))?;

        let mut signed_header: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in presigned.headers() {
            signed_header
                .entry(name.to_string())
                .or_default()
                .push(value.to_string());
        }
        Ok(PresignedUpload {
            url: presigned.uri().to_string(),
            method: presigned.method().to_string(),
            signed_header,
        })
    }
}

enum Action {
    Upload(PhotoRequest),
    Remove(PhotoRequest),
}

fn parse(event: &Request) -> Result<(CallerIdentity, PhotoTarget, Action), Error> {
    let caller = || request::caller_identity(event);
    let target = || request::photo_target(event);
    match *event.method() {
        Method::POST => Ok((caller()?, target()?, Action::Upload(request::json_body(event)?))),
        Method::DELETE => Ok((caller()?, target()?, Action::Remove(request::json_body(event)?))),
        _ => Err(Error::MethodNotAllowed),
    }
}

async fn perform(
    catalog: &mut dyn Catalog,
    store: &PhotoStore,
    responder: &Responder,
    caller: &CallerIdentity,
    target: PhotoTarget,
    action: Action,
) -> Result<Response<Body>, Error> {
    let vendor = require_vendor(catalog, caller).await?;
    match action {
        Action::Upload(body) => {
            let object_key = photos::request_upload(catalog, &vendor, target, &body).await?;
            let request = store.presign_put(&object_key).await?;
            responder.json(200, &PhotoUploadResponse { request, object_key })
        }
        Action::Remove(body) => responder.json(202, &photos::remove(catalog, &vendor, target, &body).await?),
    }
}

async fn serve(
    ctx: &AppContext,
    store: &PhotoStore,
    responder: &Responder,
    event: &Request,
) -> Result<Response<Body>, Error> {
    let (caller, target, action) = parse(event)?;
    info!(wallet = %caller.wallet, kind = %target, method = %event.method(), "Processing photo request");

    let deadline = request::deadline(event);
    let mut catalog =
        deadline::within(deadline, "database connect", PgCatalog::connect(ctx.database_url())).await?;
    let work = perform(&mut catalog, store, responder, &caller, target, action);
    let outcome = deadline::within(deadline, "request processing", work).await;
    catalog.release().await;
    outcome
}

async fn handler(ctx: &AppContext, store: &PhotoStore, event: Request) -> Result<Response<Body>, LambdaError> {
    let responder = Responder::new(&ctx.origins, &event);
    let outcome = serve(ctx, store, &responder, &event).await;
    Ok(responder.finish(outcome)?)
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    telemetry::init();

    let ctx = AppContext::load().await?;
    let store = PhotoStore {
        s3: aws_sdk_s3::Client::new(&ctx.sdk),
        bucket: ctx.config.require_photo_bucket()?.to_string(),
    };

    let (ctx, store) = (&ctx, &store);
    run(service_fn(move |event: Request| async move { handler(ctx, store, event).await })).await
}
