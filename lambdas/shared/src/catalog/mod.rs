//! Storage seam over the ticketing catalog
//!
//! Handlers and consumers talk to the store only through [`Catalog`]. The
//! production implementation is [`PgCatalog`]; tests use an in-memory one.
//!
//! Lookups return `Ok(None)` for a missing row so callers can tell "absent"
//! apart from "not yours". Every listing is paged with the fixed sizes from
//! [`crate::pagination`] and ordered by primary key unless noted.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::*;
use crate::pagination::Page;
use crate::params::{EventSearch, ListingFilter};

mod postgres;

#[cfg(test)]
pub(crate) mod memory;

pub use postgres::PgCatalog;

/// Record kinds that carry a photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhotoTarget {
    Event,
    Venue,
}

impl PhotoTarget {
    /// Resource path segment: `events` or `venues`
    pub fn path_segment(&self) -> &'static str {
        match self {
            PhotoTarget::Event => "events",
            PhotoTarget::Venue => "venues",
        }
    }

    /// Tag embedded in photo object keys: `event` or `venue`
    pub fn key_tag(&self) -> &'static str {
        match self {
            PhotoTarget::Event => "event",
            PhotoTarget::Venue => "venue",
        }
    }

    pub fn from_path_segment(raw: &str) -> Option<Self> {
        [PhotoTarget::Event, PhotoTarget::Venue]
            .into_iter()
            .find(|t| t.path_segment() == raw)
    }

    pub fn from_key_tag(raw: &str) -> Option<Self> {
        [PhotoTarget::Event, PhotoTarget::Venue]
            .into_iter()
            .find(|t| t.key_tag() == raw)
    }
}

impl std::fmt::Display for PhotoTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key_tag())
    }
}

#[async_trait]
pub trait Catalog: Send {
    // Vendors

    async fn vendor_by_wallet(&mut self, wallet: &str) -> Result<Option<Vendor>>;

    async fn vendor_by_uuid(&mut self, id: Uuid) -> Result<Option<Vendor>>;

    /// Fails with `Conflict` when the wallet or id is already registered
    async fn create_vendor(&mut self, id: Uuid, wallet: &str, name: &str) -> Result<Vendor>;

    async fn rename_vendor(&mut self, pk: i32, name: &str) -> Result<Vendor>;

    // Venues

    async fn venue_by_pk(&mut self, pk: i32) -> Result<Option<Venue>>;

    async fn venue_by_uuid(&mut self, id: Uuid) -> Result<Option<Venue>>;

    async fn venues_for_vendor(&mut self, vendor: i32, page: Page) -> Result<Vec<Venue>>;

    async fn all_venues_for_vendor(&mut self, vendor: i32) -> Result<Vec<Venue>>;

    async fn create_venue(&mut self, venue: &NewVenue) -> Result<Venue>;

    async fn update_venue(&mut self, pk: i32, changes: &VenueChanges) -> Result<Venue>;

    // Events

    async fn event_by_pk(&mut self, pk: i32) -> Result<Option<Event>>;

    async fn event_by_uuid(&mut self, id: Uuid) -> Result<Option<Event>>;

    /// Vendor's events ordered by start time, filtered by venue, start time and text
    async fn events_for_vendor(&mut self, vendor: i32, filter: &ListingFilter)
        -> Result<Vec<Event>>;

    /// Public listing ordered by start time
    async fn search_events(&mut self, search: &EventSearch) -> Result<Vec<Event>>;

    async fn create_event(&mut self, event: &NewEvent) -> Result<Event>;

    async fn update_event(&mut self, pk: i32, changes: &EventChanges) -> Result<Event>;

    // Photos

    /// Sets or clears the photo of the record with this uuid; `None` when it does not exist
    async fn set_photo(
        &mut self,
        target: PhotoTarget,
        id: Uuid,
        photo: Option<&str>,
    ) -> Result<Option<PhotoOwner>>;

    // Tickets

    async fn ticket(&mut self, event: i32, ticket_id: i32) -> Result<Option<Ticket>>;

    /// Inserts the ticket unless `(event, ticket_id)` exists; true when a row was written
    async fn insert_ticket_if_absent(
        &mut self,
        event: i32,
        ticket_id: i32,
        contract: &str,
    ) -> Result<bool>;

    async fn tickets_for_event(&mut self, event: i32, page: Page) -> Result<Vec<Ticket>>;

    async fn check_in_ticket(&mut self, event: i32, ticket_id: i32) -> Result<Ticket>;
}

/// Record whose photo changed, as returned to the client
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum PhotoOwner {
    Event(Event),
    Venue(Venue),
}

impl PhotoOwner {
    pub fn vendor(&self) -> i32 {
        match self {
            PhotoOwner::Event(e) => e.vendor,
            PhotoOwner::Venue(v) => v.vendor,
        }
    }

    pub fn photo(&self) -> Option<&str> {
        match self {
            PhotoOwner::Event(e) => e.photo.as_deref(),
            PhotoOwner::Venue(v) => v.photo.as_deref(),
        }
    }
}
