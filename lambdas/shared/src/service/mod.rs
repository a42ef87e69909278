//! Request logic shared by the HTTP handlers
//!
//! Each function takes an open [`Catalog`] plus already-decoded inputs and
//! returns a domain value or an [`Error`] carrying its HTTP status. Ownership
//! is always checked in two steps: a missing row is `NotFound`, a row owned by
//! another vendor is `Forbidden`.

use uuid::Uuid;

use crate::catalog::Catalog;
use crate::claims::CallerIdentity;
use crate::errors::{Error, Result};
use crate::models::Vendor;

pub mod events;
pub mod photos;
pub mod tickets;
pub mod vendors;
pub mod venues;

/// Vendor row for the authenticated caller
pub async fn require_vendor(catalog: &mut dyn Catalog, caller: &CallerIdentity) -> Result<Vendor> {
    catalog
        .vendor_by_wallet(&caller.wallet)
        .await?
        .ok_or_else(|| Error::NotFound("Vendor does not exist".to_string()))
}

pub(crate) fn ensure_owner(vendor: &Vendor, owner: i32, what: &str) -> Result<()> {
    if vendor.pk != owner {
        return Err(Error::Forbidden(format!("{what} does not belong to this vendor")));
    }
    Ok(())
}

pub(crate) fn parse_uuid(raw: &str, field: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::Validation(format!("{field} must be a valid UUID")))
}

/// Trimmed value of a required text field
pub(crate) fn required_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn non_negative(value: i32, field: &str) -> Result<i32> {
    if value < 0 {
        return Err(Error::Validation(format!("{field} must not be negative")));
    }
    Ok(value)
}
