//! Queue message decoding for the event-driven consumers
//!
//! Both consumers read SQS messages whose body is an SNS notification; the SNS
//! `Message` field carries either an S3 event (photo uploads) or a
//! [`TicketBatch`]. Records that do not apply are skipped with a log line.

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::{Catalog, PhotoTarget};
use crate::errors::{Error, Result};
use crate::models::TicketBatch;
use crate::service::photos::{parse_object_key, public_url};
use crate::service::tickets::{self, BatchOutcome};

const OBJECT_CREATED_PREFIX: &str = "ObjectCreated:";

#[derive(Debug, Deserialize)]
struct SnsEnvelope {
    #[serde(rename = "Message")]
    message: String,
}

#[derive(Debug, Deserialize)]
struct S3Notification {
    #[serde(rename = "Records", default)]
    records: Vec<S3Record>,
}

#[derive(Debug, Deserialize)]
struct S3Record {
    #[serde(rename = "eventName")]
    event_name: String,
    s3: S3Entity,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: S3Bucket,
    object: S3Object,
}

#[derive(Debug, Deserialize)]
struct S3Bucket {
    name: String,
}

#[derive(Debug, Deserialize)]
struct S3Object {
    key: String,
}

/// A completed photo upload that maps onto a record
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoUpload {
    pub target: PhotoTarget,
    pub id: Uuid,
    pub url: String,
}

/// Inner message of an SNS notification delivered through SQS
pub fn sns_message(body: &str) -> Result<String> {
    let envelope: SnsEnvelope = serde_json::from_str(body)?;
    Ok(envelope.message)
}

/// S3 keys arrive form-encoded (`+` for space, `%XX` escapes)
fn decode_key(raw: &str) -> String {
    url::form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(name, value)| {
            if value.is_empty() {
                name.into_owned()
            } else {
                format!("{name}={value}")
            }
        })
        .unwrap_or_default()
}

/// Photo uploads in one SQS message body, keeping only object-created records in `bucket`
pub fn photo_uploads(body: &str, bucket: &str) -> Result<Vec<PhotoUpload>> {
    let notification: S3Notification = serde_json::from_str(&sns_message(body)?)?;

    let mut uploads = Vec::new();
    for record in notification.records {
        if !record.event_name.starts_with(OBJECT_CREATED_PREFIX) {
            info!(event_name = %record.event_name, "Skipping non-create storage event");
            continue;
        }
        if record.s3.bucket.name != bucket {
            warn!(bucket = %record.s3.bucket.name, "Skipping event from unexpected bucket");
            continue;
        }
        let key = decode_key(&record.s3.object.key);
        let Some((target, id)) = parse_object_key(&key) else {
            warn!(object_key = %key, "Skipping object with unrecognized key");
            continue;
        };
        uploads.push(PhotoUpload {
            target,
            id,
            url: public_url(bucket, &record.s3.object.key),
        });
    }
    Ok(uploads)
}

/// Writes each upload's public URL onto its record; returns how many records changed
pub async fn record_photo_uploads(catalog: &mut dyn Catalog, body: &str, bucket: &str) -> Result<usize> {
    let mut updated = 0;
    for upload in photo_uploads(body, bucket)? {
        match catalog.set_photo(upload.target, upload.id, Some(&upload.url)).await? {
            Some(_) => {
                info!(kind = %upload.target, id = %upload.id, "Stored photo URL");
                updated += 1;
            }
            None => warn!(kind = %upload.target, id = %upload.id, "Photo uploaded for missing record"),
        }
    }
    Ok(updated)
}

/// Ticket batch carried by one SQS message body
pub fn ticket_batch(body: &str) -> Result<TicketBatch> {
    let message = sns_message(body)?;
    serde_json::from_str(&message).map_err(|e| Error::Validation(format!("Invalid ticket batch: {e}")))
}

pub async fn create_tickets(catalog: &mut dyn Catalog, body: &str) -> Result<BatchOutcome> {
    let batch = ticket_batch(body)?;
    tickets::create_batch(catalog, &batch).await
}
