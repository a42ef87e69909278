//! Domain models for OpenTix
//!
//! These types represent the core entities in the system:
//! - Vendors: Event producers identified by a wallet address
//! - Venues: Locations with a fixed ticket capacity, owned by a vendor
//! - Events: Scheduled occurrences at a venue
//! - Tickets: Units of admission, numbered per event
//!
//! Rows and request bodies use PascalCase JSON names, matching what the web
//! and mobile clients send and expect.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Vendor account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Vendor {
    pub pk: i32,
    /// Stable external identifier (the holder id from the identity provider)
    #[serde(rename = "ID")]
    pub id: Uuid,
    /// Wallet address without `0x`
    pub wallet: String,
    pub name: String,
}

/// Venue owned by a vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Venue {
    pub pk: i32,
    #[serde(rename = "ID")]
    pub id: Uuid,
    /// Owning vendor pk
    pub vendor: i32,
    pub name: String,
    pub street_address: String,
    pub zip: String,
    pub city: String,
    pub state_code: String,
    pub state_name: String,
    pub country_code: String,
    pub country_name: String,
    /// Unique-seat capacity (immutable)
    pub num_unique: i32,
    /// General-admission capacity (immutable)
    pub num_ga: i32,
    pub photo: Option<String>,
}

/// Scheduled event at a venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    pub pk: i32,
    #[serde(rename = "ID")]
    pub id: Uuid,
    pub vendor: i32,
    pub venue: i32,
    pub name: String,
    #[serde(rename = "Type")]
    #[sqlx(rename = "type")]
    pub event_type: String,
    pub event_datetime: NaiveDateTime,
    pub description: String,
    pub disclaimer: Option<String>,
    pub basecost: f64,
    pub num_unique: i32,
    pub num_ga: i32,
    pub photo: Option<String>,
    pub transaction_hash: Option<String>,
}

/// Single ticket for an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Ticket {
    pub pk: i32,
    /// Event pk
    pub event: i32,
    /// Ticket number, unique within the event
    #[serde(rename = "TicketID")]
    pub ticket_id: i32,
    pub contract: String,
    pub checked_in: bool,
}

// =========================================================================
// Request bodies
// =========================================================================

/// Body for registering or renaming a vendor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VendorNameRequest {
    #[serde(default)]
    pub name: String,
}

/// Body for creating a venue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateVenueRequest {
    pub name: String,
    pub street_address: String,
    pub zip: String,
    pub city: String,
    pub state_code: String,
    pub state_name: String,
    pub country_code: String,
    pub country_name: String,
    pub num_unique: Option<i32>,
    pub num_ga: Option<i32>,
}

/// Body for patching a venue; absent or empty fields stay unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PatchVenueRequest {
    pub pk: Option<i32>,
    pub name: Option<String>,
    pub street_address: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub state_name: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    /// Rejected when present
    pub num_unique: Option<i32>,
    /// Rejected when present
    pub num_ga: Option<i32>,
}

/// Body for creating an event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateEventRequest {
    pub venue: Option<i32>,
    pub name: String,
    #[serde(rename = "Type")]
    pub event_type: String,
    pub event_datetime: String,
    pub description: String,
    pub disclaimer: String,
    pub basecost: Option<f64>,
    pub num_unique: Option<i32>,
    pub num_ga: Option<i32>,
    pub photo: Option<String>,
}

/// Body for patching an event; absent or empty fields stay unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PatchEventRequest {
    pub pk: Option<i32>,
    pub name: Option<String>,
    #[serde(rename = "Type")]
    pub event_type: Option<String>,
    pub event_datetime: Option<String>,
    pub description: Option<String>,
    pub disclaimer: Option<String>,
    pub photo: Option<String>,
    pub transaction_hash: Option<String>,
    /// Rejected when present
    pub venue: Option<i32>,
    /// Rejected when present
    pub num_unique: Option<i32>,
    /// Rejected when present
    pub num_ga: Option<i32>,
}

/// Body for requesting or deleting a record photo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PhotoRequest {
    #[serde(rename = "ID")]
    pub record_id: String,
    pub filename: String,
}

/// Ticket batch, both the POST body and the queued message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TicketBatch {
    /// Event uuid
    pub event: String,
    pub contract: String,
    pub ticket_min: i32,
    pub ticket_max: i32,
}

/// Body for checking a ticket in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CheckInRequest {
    /// Event uuid
    pub event: String,
    #[serde(rename = "TicketID")]
    pub ticket_id: Option<i32>,
}

// =========================================================================
// Validated inputs handed to the catalog
// =========================================================================

/// Validated venue ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewVenue {
    pub vendor: i32,
    pub name: String,
    pub street_address: String,
    pub zip: String,
    pub city: String,
    pub state_code: String,
    pub state_name: String,
    pub country_code: String,
    pub country_name: String,
    pub num_unique: i32,
    pub num_ga: i32,
}

/// Mutable venue fields; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenueChanges {
    pub name: Option<String>,
    pub street_address: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub state_name: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
}

/// Validated event ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub vendor: i32,
    pub venue: i32,
    pub name: String,
    pub event_type: String,
    pub event_datetime: NaiveDateTime,
    pub description: String,
    pub disclaimer: Option<String>,
    pub basecost: f64,
    pub num_unique: i32,
    pub num_ga: i32,
    pub photo: Option<String>,
}

/// Mutable event fields; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub name: Option<String>,
    pub event_type: Option<String>,
    pub event_datetime: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub disclaimer: Option<String>,
    pub photo: Option<String>,
    pub transaction_hash: Option<String>,
}

// =========================================================================
// Responses
// =========================================================================

/// Pre-signed upload request returned to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PresignedUpload {
    #[serde(rename = "URL")]
    pub url: String,
    pub method: String,
    pub signed_header: std::collections::BTreeMap<String, Vec<String>>,
}

/// Response to a photo upload request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PhotoUploadResponse {
    pub request: PresignedUpload,
    pub object_key: String,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Treats an empty or whitespace-only string as absent
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
