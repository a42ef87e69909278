//! Photo keys and ownership checks for event and venue photos
//!
//! Object keys are `<filename>-<event|venue>-<record uuid>`. Filenames may
//! themselves contain `-`, so keys are always parsed from the right.

use tracing::info;
use uuid::Uuid;

use super::{events, parse_uuid, required_text, venues};
use crate::catalog::{Catalog, PhotoOwner, PhotoTarget};
use crate::errors::{Error, Result};
use crate::models::{PhotoRequest, Vendor};

const UUID_TEXT_LEN: usize = 36;

pub fn object_key(filename: &str, target: PhotoTarget, id: Uuid) -> String {
    format!("{filename}-{}-{id}", target.key_tag())
}

/// Splits an object key into its record kind and id
pub fn parse_object_key(key: &str) -> Option<(PhotoTarget, Uuid)> {
    let split = key.len().checked_sub(UUID_TEXT_LEN)?;
    let id = Uuid::parse_str(key.get(split..)?).ok()?;
    let rest = key.get(..split)?.strip_suffix('-')?;
    let (filename, tag) = rest.rsplit_once('-')?;
    if filename.is_empty() {
        return None;
    }
    Some((PhotoTarget::from_key_tag(tag)?, id))
}

/// Public URL of an object in the photo bucket
pub fn public_url(bucket: &str, key: &str) -> String {
    format!("https://{bucket}.s3.amazonaws.com/{key}")
}

async fn owned_record(
    catalog: &mut dyn Catalog,
    vendor: &Vendor,
    target: PhotoTarget,
    id: Uuid,
) -> Result<PhotoOwner> {
    Ok(match target {
        PhotoTarget::Event => PhotoOwner::Event(events::owned_by_uuid(catalog, vendor, id).await?),
        PhotoTarget::Venue => PhotoOwner::Venue(venues::owned_by_uuid(catalog, vendor, id).await?),
    })
}

/// Checks the record can take a photo and returns the object key to upload to
pub async fn request_upload(
    catalog: &mut dyn Catalog,
    vendor: &Vendor,
    target: PhotoTarget,
    body: &PhotoRequest,
) -> Result<String> {
    let id = parse_uuid(&required_text(&body.record_id, "ID")?, "ID")?;
    let filename = required_text(&body.filename, "Filename")?;
    if filename.contains('/') {
        return Err(Error::Validation("Filename must not contain '/'".to_string()));
    }

    let record = owned_record(catalog, vendor, target, id).await?;
    if record.photo().is_some() {
        return Err(Error::Validation(format!(
            "{} already has a photo",
            capitalized(target)
        )));
    }

    let key = object_key(&filename, target, id);
    info!(vendor_pk = vendor.pk, object_key = %key, "Issuing photo upload");
    Ok(key)
}

/// Clears the photo of an owned record
pub async fn remove(
    catalog: &mut dyn Catalog,
    vendor: &Vendor,
    target: PhotoTarget,
    body: &PhotoRequest,
) -> Result<PhotoOwner> {
    let id = parse_uuid(&required_text(&body.record_id, "ID")?, "ID")?;
    owned_record(catalog, vendor, target, id).await?;
    catalog
        .set_photo(target, id, None)
        .await?
        .ok_or_else(|| Error::NotFound(format!("{} not found", capitalized(target))))
}

fn capitalized(target: PhotoTarget) -> &'static str {
    match target {
        PhotoTarget::Event => "Event",
        PhotoTarget::Venue => "Venue",
    }
}
