//! Ticket batches, listing and check-in

use tracing::{info, warn};
use uuid::Uuid;

use super::{events, parse_uuid, required_text};
use crate::catalog::Catalog;
use crate::errors::{Error, Result};
use crate::models::{CheckInRequest, Event, Ticket, TicketBatch, Vendor};
use crate::params::{QueryParams, EVENT_KEY, NO_FILTER};

/// Checks a batch request and returns it with its fields trimmed
pub fn validate_batch(body: &TicketBatch) -> Result<(Uuid, TicketBatch)> {
    let event = parse_uuid(&required_text(&body.event, "Event")?, "Event")?;
    let contract = required_text(&body.contract, "Contract")?;
    if body.ticket_min < 0 || body.ticket_min > body.ticket_max {
        return Err(Error::Validation(
            "TicketMin and TicketMax must satisfy 0 <= TicketMin <= TicketMax".to_string(),
        ));
    }
    Ok((
        event,
        TicketBatch {
            event: event.to_string(),
            contract,
            ticket_min: body.ticket_min,
            ticket_max: body.ticket_max,
        },
    ))
}

/// A batch may not create more tickets than the event admits (`NumUnique + NumGa`)
fn ensure_fits(batch: &TicketBatch, event: &Event) -> Result<()> {
    let size = i64::from(batch.ticket_max) - i64::from(batch.ticket_min) + 1;
    let capacity = i64::from(event.num_unique) + i64::from(event.num_ga);
    if size > capacity {
        return Err(Error::Validation(format!(
            "Batch of {size} tickets exceeds the event capacity of {capacity}"
        )));
    }
    Ok(())
}

/// Validates a vendor's batch request for one of their events; the caller queues it
pub async fn request_batch(
    catalog: &mut dyn Catalog,
    vendor: &Vendor,
    body: &TicketBatch,
) -> Result<TicketBatch> {
    let (event_id, batch) = validate_batch(body)?;
    let event = events::owned_by_uuid(catalog, vendor, event_id).await?;
    ensure_fits(&batch, &event)?;
    info!(
        vendor_pk = vendor.pk,
        event_pk = event.pk,
        ticket_min = batch.ticket_min,
        ticket_max = batch.ticket_max,
        "Accepted ticket batch"
    );
    Ok(batch)
}

/// Rows written and skipped by one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub inserted: u32,
    pub skipped: u32,
}

/// Inserts every ticket id of the inclusive range, skipping ids already present
pub async fn create_batch(catalog: &mut dyn Catalog, batch: &TicketBatch) -> Result<BatchOutcome> {
    let (event_id, batch) = validate_batch(batch)?;
    let event = catalog
        .event_by_uuid(event_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Event {event_id} not found")))?;
    ensure_fits(&batch, &event)?;

    let mut outcome = BatchOutcome::default();
    for ticket_id in batch.ticket_min..=batch.ticket_max {
        if catalog
            .insert_ticket_if_absent(event.pk, ticket_id, &batch.contract)
            .await?
        {
            outcome.inserted += 1;
        } else {
            outcome.skipped += 1;
        }
    }
    if outcome.skipped > 0 {
        warn!(event_pk = event.pk, skipped = outcome.skipped, "Ticket ids already existed");
    }
    info!(event_pk = event.pk, inserted = outcome.inserted, "Created tickets");
    Ok(outcome)
}

/// Event pk whose tickets a GET asks for
pub fn listing_event(params: &QueryParams) -> Result<i32> {
    match params.id_filter(EVENT_KEY) {
        NO_FILTER => Err(Error::Validation("Event query parameter is required".to_string())),
        pk => Ok(pk),
    }
}

pub async fn list(catalog: &mut dyn Catalog, vendor: &Vendor, params: &QueryParams) -> Result<Vec<Ticket>> {
    let event = events::owned_by_pk(catalog, vendor, listing_event(params)?).await?;
    catalog.tickets_for_event(event.pk, params.page()).await
}

/// Marks a ticket of an owned event as checked in; a second check-in is rejected
pub async fn check_in(catalog: &mut dyn Catalog, vendor: &Vendor, body: &CheckInRequest) -> Result<Ticket> {
    let event_id = parse_uuid(&required_text(&body.event, "Event")?, "Event")?;
    let ticket_id = body
        .ticket_id
        .ok_or_else(|| Error::Validation("TicketID is required".to_string()))?;

    let event = events::owned_by_uuid(catalog, vendor, event_id).await?;
    let ticket = catalog
        .ticket(event.pk, ticket_id)
        .await?
        .ok_or_else(|| Error::NotFound("Ticket not found".to_string()))?;
    if ticket.checked_in {
        return Err(Error::Validation("Ticket already checked in".to_string()));
    }

    let ticket = catalog.check_in_ticket(event.pk, ticket_id).await?;
    info!(event_pk = event.pk, ticket_id, "Checked in ticket");
    Ok(ticket)
}
