//! Vendor registration and lookup

use tracing::info;
use uuid::Uuid;

use super::{parse_uuid, require_vendor, required_text};
use crate::catalog::Catalog;
use crate::claims::CallerIdentity;
use crate::errors::{Error, Result};
use crate::models::{Vendor, VendorNameRequest};
use crate::params::QueryParams;

const UUID_KEY: &str = "uuid";
const WALLET_KEY: &str = "wallet";
const WALLET_HEX_LEN: usize = 40;

/// How a public vendor lookup identifies the vendor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorLookup {
    Uuid(Uuid),
    Wallet(String),
}

impl VendorLookup {
    /// Prefers a valid `uuid`, then a valid `wallet` (40 hex chars, optional `0x`)
    pub fn from_query(params: &QueryParams) -> Result<Self> {
        if let Some(id) = params.get(UUID_KEY).and_then(|raw| Uuid::parse_str(raw.trim()).ok()) {
            return Ok(VendorLookup::Uuid(id));
        }
        if let Some(wallet) = params.get(WALLET_KEY).and_then(normalize_wallet) {
            return Ok(VendorLookup::Wallet(wallet));
        }
        Err(Error::Validation(
            "A valid uuid or wallet query parameter is required".to_string(),
        ))
    }
}

/// Wallet without `0x`, when it is exactly 40 hex digits
pub fn normalize_wallet(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    (hex.len() == WALLET_HEX_LEN && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| hex.to_string())
}

pub async fn lookup(catalog: &mut dyn Catalog, lookup: &VendorLookup) -> Result<Vendor> {
    let vendor = match lookup {
        VendorLookup::Uuid(id) => catalog.vendor_by_uuid(*id).await?,
        VendorLookup::Wallet(wallet) => catalog.vendor_by_wallet(wallet).await?,
    };
    vendor.ok_or_else(|| Error::NotFound("Vendor not found".to_string()))
}

/// Registers the caller as a vendor under their token identity
pub async fn register(
    catalog: &mut dyn Catalog,
    caller: &CallerIdentity,
    body: &VendorNameRequest,
) -> Result<Vendor> {
    let name = required_text(&body.name, "Name")?;
    let id = parse_uuid(&caller.uuid, "Token credential id")
        .map_err(|_| Error::Unauthorized("Token credential id is not a UUID".to_string()))?;

    if catalog.vendor_by_wallet(&caller.wallet).await?.is_some() {
        return Err(Error::Conflict("Vendor already exists".to_string()));
    }
    let vendor = catalog.create_vendor(id, &caller.wallet, &name).await?;
    info!(vendor_pk = vendor.pk, wallet = %vendor.wallet, "Registered vendor");
    Ok(vendor)
}

pub async fn rename(
    catalog: &mut dyn Catalog,
    caller: &CallerIdentity,
    body: &VendorNameRequest,
) -> Result<Vendor> {
    let name = required_text(&body.name, "Name")?;
    let vendor = require_vendor(catalog, caller).await?;
    catalog.rename_vendor(vendor.pk, &name).await
}
