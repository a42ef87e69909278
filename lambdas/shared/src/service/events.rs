//! Event management for the owning vendor, plus the public listing

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{ensure_owner, non_negative, parse_uuid, required_text, venues};
use crate::catalog::Catalog;
use crate::errors::{Error, Result};
use crate::models::{non_empty, CreateEventRequest, Event, EventChanges, NewEvent, PatchEventRequest, Vendor};
use crate::params::{parse_timestamp, EventSearch, ListingFilter, QueryParams};

const PK_KEY: &str = "Pk";
const ID_KEY: &str = "ID";

/// Which events a vendor GET asks for
#[derive(Debug, Clone, PartialEq)]
pub enum EventQuery {
    ByPk(i32),
    ById(Uuid),
    Listing(ListingFilter),
}

impl EventQuery {
    pub fn from_query(params: &QueryParams) -> Result<Self> {
        if let Some(raw) = params.get(PK_KEY) {
            let pk = raw
                .trim()
                .parse()
                .map_err(|_| Error::Validation("Pk must be an integer".to_string()))?;
            return Ok(EventQuery::ByPk(pk));
        }
        if let Some(raw) = params.get(ID_KEY) {
            return Ok(EventQuery::ById(parse_uuid(raw, "ID")?));
        }
        Ok(EventQuery::Listing(ListingFilter::from_query(params)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventListing {
    One(Box<Event>),
    Many(Vec<Event>),
}

pub async fn owned_by_pk(catalog: &mut dyn Catalog, vendor: &Vendor, pk: i32) -> Result<Event> {
    let event = catalog
        .event_by_pk(pk)
        .await?
        .ok_or_else(|| Error::NotFound("Event not found".to_string()))?;
    ensure_owner(vendor, event.vendor, "Event")?;
    Ok(event)
}

pub async fn owned_by_uuid(catalog: &mut dyn Catalog, vendor: &Vendor, id: Uuid) -> Result<Event> {
    let event = catalog
        .event_by_uuid(id)
        .await?
        .ok_or_else(|| Error::NotFound("Event not found".to_string()))?;
    ensure_owner(vendor, event.vendor, "Event")?;
    Ok(event)
}

pub async fn get(catalog: &mut dyn Catalog, vendor: &Vendor, query: &EventQuery) -> Result<EventListing> {
    Ok(match query {
        EventQuery::ByPk(pk) => EventListing::One(Box::new(owned_by_pk(catalog, vendor, *pk).await?)),
        EventQuery::ById(id) => EventListing::One(Box::new(owned_by_uuid(catalog, vendor, *id).await?)),
        EventQuery::Listing(filter) => EventListing::Many(catalog.events_for_vendor(vendor.pk, filter).await?),
    })
}

/// Public listing, no caller identity needed
pub async fn search(catalog: &mut dyn Catalog, search: &EventSearch) -> Result<Vec<Event>> {
    catalog.search_events(search).await
}

fn required_timestamp(raw: &str) -> Result<chrono::NaiveDateTime> {
    parse_timestamp(raw).ok_or_else(|| {
        Error::Validation("EventDatetime must look like 2006-01-02T15:04:05.000Z".to_string())
    })
}

fn validate_new(vendor: &Vendor, body: &CreateEventRequest) -> Result<NewEvent> {
    let venue = body
        .venue
        .ok_or_else(|| Error::Validation("Venue is required".to_string()))?;
    let basecost = body
        .basecost
        .ok_or_else(|| Error::Validation("Basecost is required".to_string()))?;
    if !basecost.is_finite() || basecost < 0.0 {
        return Err(Error::Validation("Basecost must not be negative".to_string()));
    }

    Ok(NewEvent {
        vendor: vendor.pk,
        venue,
        name: required_text(&body.name, "Name")?,
        event_type: required_text(&body.event_type, "Type")?,
        event_datetime: required_timestamp(&required_text(&body.event_datetime, "EventDatetime")?)?,
        description: required_text(&body.description, "Description")?,
        disclaimer: non_empty(Some(body.disclaimer.clone())),
        basecost,
        num_unique: non_negative(body.num_unique.unwrap_or(0), "NumUnique")?,
        num_ga: non_negative(body.num_ga.unwrap_or(0), "NumGa")?,
        photo: non_empty(body.photo.clone()),
    })
}

/// Creates an event at one of the vendor's venues, within the venue's capacity
pub async fn create(catalog: &mut dyn Catalog, vendor: &Vendor, body: &CreateEventRequest) -> Result<Event> {
    let new = validate_new(vendor, body)?;
    let venue = venues::owned_by_pk(catalog, vendor, new.venue).await?;

    if new.num_ga > venue.num_ga {
        return Err(Error::Validation(format!(
            "NumGa {} exceeds venue capacity {}",
            new.num_ga, venue.num_ga
        )));
    }
    if new.num_unique > venue.num_unique {
        return Err(Error::Validation(format!(
            "NumUnique {} exceeds venue capacity {}",
            new.num_unique, venue.num_unique
        )));
    }

    let event = catalog.create_event(&new).await?;
    info!(vendor_pk = vendor.pk, event_pk = event.pk, venue_pk = venue.pk, "Created event");
    Ok(event)
}

pub async fn patch(catalog: &mut dyn Catalog, vendor: &Vendor, body: &PatchEventRequest) -> Result<Event> {
    let pk = body
        .pk
        .ok_or_else(|| Error::Validation("Pk is required".to_string()))?;
    if body.venue.is_some() || body.num_unique.is_some() || body.num_ga.is_some() {
        return Err(Error::Validation(
            "Venue and ticket counts cannot be changed".to_string(),
        ));
    }

    let changes = EventChanges {
        name: non_empty(body.name.clone()),
        event_type: non_empty(body.event_type.clone()),
        event_datetime: non_empty(body.event_datetime.clone())
            .map(|raw| required_timestamp(&raw))
            .transpose()?,
        description: non_empty(body.description.clone()),
        disclaimer: non_empty(body.disclaimer.clone()),
        photo: non_empty(body.photo.clone()),
        transaction_hash: non_empty(body.transaction_hash.clone()),
    };

    owned_by_pk(catalog, vendor, pk).await?;
    catalog.update_event(pk, &changes).await
}
