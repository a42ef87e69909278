//! In-memory catalog for service tests

use async_trait::async_trait;
use uuid::Uuid;

use super::{Catalog, PhotoOwner, PhotoTarget};
use crate::errors::{Error, Result};
use crate::models::*;
use crate::pagination::{Page, EVENTS_PAGE_SIZE, TICKETS_PAGE_SIZE, VENUES_PAGE_SIZE};
use crate::params::{EventSearch, ListingFilter, NO_FILTER};

#[derive(Debug, Default)]
pub(crate) struct MemoryCatalog {
    pub vendors: Vec<Vendor>,
    pub venues: Vec<Venue>,
    pub events: Vec<Event>,
    pub tickets: Vec<Ticket>,
    next_pk: i32,
}

fn page_of<T: Clone>(rows: Vec<T>, page: Page, size: i64) -> Vec<T> {
    let (limit, offset) = page.bounds(size);
    rows.into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}

fn missing() -> Error {
    Error::Database(sqlx::Error::RowNotFound)
}

impl MemoryCatalog {
    fn pk(&mut self) -> i32 {
        self.next_pk += 1;
        self.next_pk
    }

    pub fn add_vendor(&mut self, wallet: &str) -> Vendor {
        let vendor = Vendor {
            pk: self.pk(),
            id: Uuid::new_v4(),
            wallet: wallet.to_string(),
            name: format!("Vendor {wallet}"),
        };
        self.vendors.push(vendor.clone());
        vendor
    }

    pub fn add_venue(&mut self, vendor: i32, num_unique: i32, num_ga: i32) -> Venue {
        let venue = Venue {
            pk: self.pk(),
            id: Uuid::new_v4(),
            vendor,
            name: "Hall".into(),
            street_address: "1 Main St".into(),
            zip: "02139".into(),
            city: "Cambridge".into(),
            state_code: "MA".into(),
            state_name: "Massachusetts".into(),
            country_code: "US".into(),
            country_name: "United States".into(),
            num_unique,
            num_ga,
            photo: None,
        };
        self.venues.push(venue.clone());
        venue
    }

    pub fn add_event(&mut self, vendor: i32, venue: i32) -> Event {
        let event = Event {
            pk: self.pk(),
            id: Uuid::new_v4(),
            vendor,
            venue,
            name: "Show".into(),
            event_type: "concert".into(),
            event_datetime: crate::params::parse_timestamp("2030-01-01T20:00:00Z")
                .unwrap_or_default(),
            description: "Live music".into(),
            disclaimer: None,
            basecost: 20.0,
            num_unique: 0,
            num_ga: 10,
            photo: None,
            transaction_hash: None,
        };
        self.events.push(event.clone());
        event
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn vendor_by_wallet(&mut self, wallet: &str) -> Result<Option<Vendor>> {
        Ok(self.vendors.iter().find(|v| v.wallet == wallet).cloned())
    }

    async fn vendor_by_uuid(&mut self, id: Uuid) -> Result<Option<Vendor>> {
        Ok(self.vendors.iter().find(|v| v.id == id).cloned())
    }

    async fn create_vendor(&mut self, id: Uuid, wallet: &str, name: &str) -> Result<Vendor> {
        if self.vendors.iter().any(|v| v.wallet == wallet || v.id == id) {
            return Err(Error::Conflict("Vendor already exists".into()));
        }
        let vendor = Vendor {
            pk: self.pk(),
            id,
            wallet: wallet.to_string(),
            name: name.to_string(),
        };
        self.vendors.push(vendor.clone());
        Ok(vendor)
    }

    async fn rename_vendor(&mut self, pk: i32, name: &str) -> Result<Vendor> {
        let vendor = self
            .vendors
            .iter_mut()
            .find(|v| v.pk == pk)
            .ok_or_else(missing)?;
        vendor.name = name.to_string();
        Ok(vendor.clone())
    }

    async fn venue_by_pk(&mut self, pk: i32) -> Result<Option<Venue>> {
        Ok(self.venues.iter().find(|v| v.pk == pk).cloned())
    }

    async fn venue_by_uuid(&mut self, id: Uuid) -> Result<Option<Venue>> {
        Ok(self.venues.iter().find(|v| v.id == id).cloned())
    }

    async fn venues_for_vendor(&mut self, vendor: i32, page: Page) -> Result<Vec<Venue>> {
        let rows = self.all_venues_for_vendor(vendor).await?;
        Ok(page_of(rows, page, VENUES_PAGE_SIZE))
    }

    async fn all_venues_for_vendor(&mut self, vendor: i32) -> Result<Vec<Venue>> {
        Ok(self
            .venues
            .iter()
            .filter(|v| v.vendor == vendor)
            .cloned()
            .collect())
    }

    async fn create_venue(&mut self, venue: &NewVenue) -> Result<Venue> {
        let row = Venue {
            pk: self.pk(),
            id: Uuid::new_v4(),
            vendor: venue.vendor,
            name: venue.name.clone(),
            street_address: venue.street_address.clone(),
            zip: venue.zip.clone(),
            city: venue.city.clone(),
            state_code: venue.state_code.clone(),
            state_name: venue.state_name.clone(),
            country_code: venue.country_code.clone(),
            country_name: venue.country_name.clone(),
            num_unique: venue.num_unique,
            num_ga: venue.num_ga,
            photo: None,
        };
        self.venues.push(row.clone());
        Ok(row)
    }

    async fn update_venue(&mut self, pk: i32, changes: &VenueChanges) -> Result<Venue> {
        let venue = self
            .venues
            .iter_mut()
            .find(|v| v.pk == pk)
            .ok_or_else(missing)?;
        let fields = [
            (&mut venue.name, &changes.name),
            (&mut venue.street_address, &changes.street_address),
            (&mut venue.zip, &changes.zip),
            (&mut venue.city, &changes.city),
            (&mut venue.state_code, &changes.state_code),
            (&mut venue.state_name, &changes.state_name),
            (&mut venue.country_code, &changes.country_code),
            (&mut venue.country_name, &changes.country_name),
        ];
        for (field, change) in fields {
            if let Some(value) = change {
                *field = value.clone();
            }
        }
        Ok(venue.clone())
    }

    async fn event_by_pk(&mut self, pk: i32) -> Result<Option<Event>> {
        Ok(self.events.iter().find(|e| e.pk == pk).cloned())
    }

    async fn event_by_uuid(&mut self, id: Uuid) -> Result<Option<Event>> {
        Ok(self.events.iter().find(|e| e.id == id).cloned())
    }

    async fn events_for_vendor(
        &mut self,
        vendor: i32,
        filter: &ListingFilter,
    ) -> Result<Vec<Event>> {
        let mut rows: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.vendor == vendor)
            .filter(|e| filter.venue == NO_FILTER || e.venue == filter.venue)
            .filter(|e| e.event_datetime >= filter.since)
            .filter(|e| {
                filter.text.is_empty()
                    || e.name.to_lowercase().contains(&filter.text)
                    || e.description.to_lowercase().contains(&filter.text)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|e| (e.event_datetime, e.pk));
        Ok(page_of(rows, filter.page, EVENTS_PAGE_SIZE))
    }

    async fn search_events(&mut self, search: &EventSearch) -> Result<Vec<Event>> {
        let venues = &self.venues;
        let mut rows: Vec<Event> = self
            .events
            .iter()
            .filter(|e| {
                search.zip.is_empty()
                    || venues
                        .iter()
                        .any(|v| v.pk == e.venue && v.zip.to_lowercase() == search.zip)
            })
            .filter(|e| search.name.is_empty() || e.name.to_lowercase().contains(&search.name))
            .filter(|e| search.event_type.is_empty() || e.event_type.to_lowercase() == search.event_type)
            .filter(|e| search.filter.admits(e.basecost, e.event_datetime))
            .cloned()
            .collect();
        rows.sort_by_key(|e| (e.event_datetime, e.pk));
        Ok(page_of(rows, search.filter.page, EVENTS_PAGE_SIZE))
    }

    async fn create_event(&mut self, event: &NewEvent) -> Result<Event> {
        let row = Event {
            pk: self.pk(),
            id: Uuid::new_v4(),
            vendor: event.vendor,
            venue: event.venue,
            name: event.name.clone(),
            event_type: event.event_type.clone(),
            event_datetime: event.event_datetime,
            description: event.description.clone(),
            disclaimer: event.disclaimer.clone(),
            basecost: event.basecost,
            num_unique: event.num_unique,
            num_ga: event.num_ga,
            photo: event.photo.clone(),
            transaction_hash: None,
        };
        self.events.push(row.clone());
        Ok(row)
    }

    async fn update_event(&mut self, pk: i32, changes: &EventChanges) -> Result<Event> {
        let event = self
            .events
            .iter_mut()
            .find(|e| e.pk == pk)
            .ok_or_else(missing)?;
        if let Some(name) = &changes.name {
            event.name = name.clone();
        }
        if let Some(event_type) = &changes.event_type {
            event.event_type = event_type.clone();
        }
        if let Some(at) = changes.event_datetime {
            event.event_datetime = at;
        }
        if let Some(description) = &changes.description {
            event.description = description.clone();
        }
        if changes.disclaimer.is_some() {
            event.disclaimer = changes.disclaimer.clone();
        }
        if changes.photo.is_some() {
            event.photo = changes.photo.clone();
        }
        if changes.transaction_hash.is_some() {
            event.transaction_hash = changes.transaction_hash.clone();
        }
        Ok(event.clone())
    }

    async fn set_photo(
        &mut self,
        target: PhotoTarget,
        id: Uuid,
        photo: Option<&str>,
    ) -> Result<Option<PhotoOwner>> {
        let photo = photo.map(str::to_string);
        Ok(match target {
            PhotoTarget::Event => self.events.iter_mut().find(|e| e.id == id).map(|e| {
                e.photo = photo;
                PhotoOwner::Event(e.clone())
            }),
            PhotoTarget::Venue => self.venues.iter_mut().find(|v| v.id == id).map(|v| {
                v.photo = photo;
                PhotoOwner::Venue(v.clone())
            }),
        })
    }

    async fn ticket(&mut self, event: i32, ticket_id: i32) -> Result<Option<Ticket>> {
        Ok(self
            .tickets
            .iter()
            .find(|t| t.event == event && t.ticket_id == ticket_id)
            .cloned())
    }

    async fn insert_ticket_if_absent(
        &mut self,
        event: i32,
        ticket_id: i32,
        contract: &str,
    ) -> Result<bool> {
        if self.ticket(event, ticket_id).await?.is_some() {
            return Ok(false);
        }
        let ticket = Ticket {
            pk: self.pk(),
            event,
            ticket_id,
            contract: contract.to_string(),
            checked_in: false,
        };
        self.tickets.push(ticket);
        Ok(true)
    }

    async fn tickets_for_event(&mut self, event: i32, page: Page) -> Result<Vec<Ticket>> {
        let mut rows: Vec<Ticket> = self
            .tickets
            .iter()
            .filter(|t| t.event == event)
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.ticket_id);
        Ok(page_of(rows, page, TICKETS_PAGE_SIZE))
    }

    async fn check_in_ticket(&mut self, event: i32, ticket_id: i32) -> Result<Ticket> {
        let ticket = self
            .tickets
            .iter_mut()
            .find(|t| t.event == event && t.ticket_id == ticket_id)
            .ok_or_else(missing)?;
        ticket.checked_in = true;
        Ok(ticket.clone())
    }
}
