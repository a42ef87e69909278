//! Postgres catalog
//!
//! One connection per invocation: open it with [`PgCatalog::connect`] and hand
//! it back with [`PgCatalog::close`] on every exit path. All tables live in the
//! `app` schema (see `migrations/`).

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Connection, PgConnection};
use tracing::warn;
use uuid::Uuid;

use super::{Catalog, PhotoOwner, PhotoTarget};
use crate::errors::{Error, Result};
use crate::models::*;
use crate::pagination::{Page, EVENTS_PAGE_SIZE, TICKETS_PAGE_SIZE, VENUES_PAGE_SIZE};
use crate::params::{EventSearch, ListingFilter};

const VENDOR_COLUMNS: &str = "pk, id, wallet, name";

const VENUE_COLUMNS: &str = "pk, id, vendor, name, street_address, zip, city, state_code, \
     state_name, country_code, country_name, num_unique, num_ga, photo";

const EVENT_COLUMNS: &str = "pk, id, vendor, venue, name, \"type\", event_datetime, \
     description, disclaimer, basecost, num_unique, num_ga, photo, transaction_hash";

const TICKET_COLUMNS: &str = "pk, event, ticket_id, contract, checked_in";

/// Bound on the close handshake; a connection abandoned mid-query may never answer
const CLOSE_TIMEOUT: Duration = Duration::from_millis(250);

/// Catalog backed by a single Postgres connection
pub struct PgCatalog {
    conn: PgConnection,
}

impl PgCatalog {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let conn = PgConnection::connect(database_url).await?;
        Ok(Self { conn })
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }

    /// Closes the connection, logging rather than returning a failure.
    /// A close that stalls drops the socket instead.
    pub async fn release(self) {
        match tokio::time::timeout(CLOSE_TIMEOUT, self.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Failed to close database connection"),
            Err(_) => warn!("Timed out closing database connection"),
        }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn vendor_by_wallet(&mut self, wallet: &str) -> Result<Option<Vendor>> {
        let sql = format!("SELECT {VENDOR_COLUMNS} FROM app.vendor WHERE wallet = $1");
        Ok(sqlx::query_as(&sql)
            .bind(wallet)
            .fetch_optional(&mut self.conn)
            .await?)
    }

    async fn vendor_by_uuid(&mut self, id: Uuid) -> Result<Option<Vendor>> {
        let sql = format!("SELECT {VENDOR_COLUMNS} FROM app.vendor WHERE id = $1");
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut self.conn)
            .await?)
    }

    async fn create_vendor(&mut self, id: Uuid, wallet: &str, name: &str) -> Result<Vendor> {
        let sql = format!(
            "INSERT INTO app.vendor (id, wallet, name) VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING RETURNING {VENDOR_COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(id)
            .bind(wallet)
            .bind(name)
            .fetch_optional(&mut self.conn)
            .await?
            .ok_or_else(|| Error::Conflict("Vendor already exists".to_string()))
    }

    async fn rename_vendor(&mut self, pk: i32, name: &str) -> Result<Vendor> {
        let sql = format!("UPDATE app.vendor SET name = $2 WHERE pk = $1 RETURNING {VENDOR_COLUMNS}");
        Ok(sqlx::query_as(&sql)
            .bind(pk)
            .bind(name)
            .fetch_one(&mut self.conn)
            .await?)
    }

    async fn venue_by_pk(&mut self, pk: i32) -> Result<Option<Venue>> {
        let sql = format!("SELECT {VENUE_COLUMNS} FROM app.venue WHERE pk = $1");
        Ok(sqlx::query_as(&sql)
            .bind(pk)
            .fetch_optional(&mut self.conn)
            .await?)
    }

    async fn venue_by_uuid(&mut self, id: Uuid) -> Result<Option<Venue>> {
        let sql = format!("SELECT {VENUE_COLUMNS} FROM app.venue WHERE id = $1");
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut self.conn)
            .await?)
    }

    async fn venues_for_vendor(&mut self, vendor: i32, page: Page) -> Result<Vec<Venue>> {
        let (limit, offset) = page.bounds(VENUES_PAGE_SIZE);
        let sql = format!(
            "SELECT {VENUE_COLUMNS} FROM app.venue WHERE vendor = $1 \
             ORDER BY pk LIMIT $2 OFFSET $3"
        );
        Ok(sqlx::query_as(&sql)
            .bind(vendor)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut self.conn)
            .await?)
    }

    async fn all_venues_for_vendor(&mut self, vendor: i32) -> Result<Vec<Venue>> {
        let sql = format!("SELECT {VENUE_COLUMNS} FROM app.venue WHERE vendor = $1 ORDER BY pk");
        Ok(sqlx::query_as(&sql)
            .bind(vendor)
            .fetch_all(&mut self.conn)
            .await?)
    }

    async fn create_venue(&mut self, venue: &NewVenue) -> Result<Venue> {
        let sql = format!(
            "INSERT INTO app.venue (id, vendor, name, street_address, zip, city, state_code, \
             state_name, country_code, country_name, num_unique, num_ga) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {VENUE_COLUMNS}"
        );
        Ok(sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(venue.vendor)
            .bind(&venue.name)
            .bind(&venue.street_address)
            .bind(&venue.zip)
            .bind(&venue.city)
            .bind(&venue.state_code)
            .bind(&venue.state_name)
            .bind(&venue.country_code)
            .bind(&venue.country_name)
            .bind(venue.num_unique)
            .bind(venue.num_ga)
            .fetch_one(&mut self.conn)
            .await?)
    }

    async fn update_venue(&mut self, pk: i32, changes: &VenueChanges) -> Result<Venue> {
        let sql = format!(
            "UPDATE app.venue SET \
             name = COALESCE($2, name), \
             street_address = COALESCE($3, street_address), \
             zip = COALESCE($4, zip), \
             city = COALESCE($5, city), \
             state_code = COALESCE($6, state_code), \
             state_name = COALESCE($7, state_name), \
             country_code = COALESCE($8, country_code), \
             country_name = COALESCE($9, country_name) \
             WHERE pk = $1 RETURNING {VENUE_COLUMNS}"
        );
        Ok(sqlx::query_as(&sql)
            .bind(pk)
            .bind(&changes.name)
            .bind(&changes.street_address)
            .bind(&changes.zip)
            .bind(&changes.city)
            .bind(&changes.state_code)
            .bind(&changes.state_name)
            .bind(&changes.country_code)
            .bind(&changes.country_name)
            .fetch_one(&mut self.conn)
            .await?)
    }

    async fn event_by_pk(&mut self, pk: i32) -> Result<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM app.event WHERE pk = $1");
        Ok(sqlx::query_as(&sql)
            .bind(pk)
            .fetch_optional(&mut self.conn)
            .await?)
    }

    async fn event_by_uuid(&mut self, id: Uuid) -> Result<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM app.event WHERE id = $1");
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut self.conn)
            .await?)
    }

    async fn events_for_vendor(
        &mut self,
        vendor: i32,
        filter: &ListingFilter,
    ) -> Result<Vec<Event>> {
        let (limit, offset) = filter.page.bounds(EVENTS_PAGE_SIZE);
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM app.event \
             WHERE vendor = $1 \
             AND ($2 = -1 OR venue = $2) \
             AND event_datetime >= $3 \
             AND ($4 = '' OR strpos(lower(name), $4) > 0 OR strpos(lower(description), $4) > 0) \
             ORDER BY event_datetime, pk LIMIT $5 OFFSET $6"
        );
        Ok(sqlx::query_as(&sql)
            .bind(vendor)
            .bind(filter.venue)
            .bind(filter.since)
            .bind(&filter.text)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut self.conn)
            .await?)
    }

    async fn search_events(&mut self, search: &EventSearch) -> Result<Vec<Event>> {
        let (limit, offset) = search.filter.page.bounds(EVENTS_PAGE_SIZE);
        let columns = EVENT_COLUMNS
            .split(", ")
            .map(|c| format!("e.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {columns} FROM app.event e JOIN app.venue v ON v.pk = e.venue \
             WHERE ($1 = '' OR lower(v.zip) = $1) \
             AND ($2 = '' OR strpos(lower(e.name), $2) > 0) \
             AND ($3 = '' OR lower(e.\"type\") = $3) \
             AND e.basecost <= $4 \
             AND e.event_datetime >= $5 \
             ORDER BY e.event_datetime, e.pk LIMIT $6 OFFSET $7"
        );
        Ok(sqlx::query_as(&sql)
            .bind(&search.zip)
            .bind(&search.name)
            .bind(&search.event_type)
            .bind(search.filter.cost_ceiling)
            .bind(search.filter.since)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut self.conn)
            .await?)
    }

    async fn create_event(&mut self, event: &NewEvent) -> Result<Event> {
        let sql = format!(
            "INSERT INTO app.event (id, vendor, venue, name, \"type\", event_datetime, description, \
             disclaimer, basecost, num_unique, num_ga, photo) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {EVENT_COLUMNS}"
        );
        Ok(sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(event.vendor)
            .bind(event.venue)
            .bind(&event.name)
            .bind(&event.event_type)
            .bind(event.event_datetime)
            .bind(&event.description)
            .bind(&event.disclaimer)
            .bind(event.basecost)
            .bind(event.num_unique)
            .bind(event.num_ga)
            .bind(&event.photo)
            .fetch_one(&mut self.conn)
            .await?)
    }

    async fn update_event(&mut self, pk: i32, changes: &EventChanges) -> Result<Event> {
        let sql = format!(
            "UPDATE app.event SET \
             name = COALESCE($2, name), \
             \"type\" = COALESCE($3, \"type\"), \
             event_datetime = COALESCE($4, event_datetime), \
             description = COALESCE($5, description), \
             disclaimer = COALESCE($6, disclaimer), \
             photo = COALESCE($7, photo), \
             transaction_hash = COALESCE($8, transaction_hash) \
             WHERE pk = $1 RETURNING {EVENT_COLUMNS}"
        );
        Ok(sqlx::query_as(&sql)
            .bind(pk)
            .bind(&changes.name)
            .bind(&changes.event_type)
            .bind(changes.event_datetime)
            .bind(&changes.description)
            .bind(&changes.disclaimer)
            .bind(&changes.photo)
            .bind(&changes.transaction_hash)
            .fetch_one(&mut self.conn)
            .await?)
    }

    async fn set_photo(
        &mut self,
        target: PhotoTarget,
        id: Uuid,
        photo: Option<&str>,
    ) -> Result<Option<PhotoOwner>> {
        let owner = match target {
            PhotoTarget::Event => {
                let sql =
                    format!("UPDATE app.event SET photo = $2 WHERE id = $1 RETURNING {EVENT_COLUMNS}");
                sqlx::query_as(&sql)
                    .bind(id)
                    .bind(photo)
                    .fetch_optional(&mut self.conn)
                    .await?
                    .map(PhotoOwner::Event)
            }
            PhotoTarget::Venue => {
                let sql =
                    format!("UPDATE app.venue SET photo = $2 WHERE id = $1 RETURNING {VENUE_COLUMNS}");
                sqlx::query_as(&sql)
                    .bind(id)
                    .bind(photo)
                    .fetch_optional(&mut self.conn)
                    .await?
                    .map(PhotoOwner::Venue)
            }
        };
        Ok(owner)
    }

    async fn ticket(&mut self, event: i32, ticket_id: i32) -> Result<Option<Ticket>> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM app.ticket WHERE event = $1 AND ticket_id = $2");
        Ok(sqlx::query_as(&sql)
            .bind(event)
            .bind(ticket_id)
            .fetch_optional(&mut self.conn)
            .await?)
    }

    async fn insert_ticket_if_absent(
        &mut self,
        event: i32,
        ticket_id: i32,
        contract: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO app.ticket (event, ticket_id, contract) VALUES ($1, $2, $3) \
             ON CONFLICT (event, ticket_id) DO NOTHING",
        )
        .bind(event)
        .bind(ticket_id)
        .bind(contract)
        .execute(&mut self.conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn tickets_for_event(&mut self, event: i32, page: Page) -> Result<Vec<Ticket>> {
        let (limit, offset) = page.bounds(TICKETS_PAGE_SIZE);
        let sql = format!(
            "SELECT {TICKET_COLUMNS} FROM app.ticket WHERE event = $1 \
             ORDER BY ticket_id LIMIT $2 OFFSET $3"
        );
        Ok(sqlx::query_as(&sql)
            .bind(event)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut self.conn)
            .await?)
    }

    async fn check_in_ticket(&mut self, event: i32, ticket_id: i32) -> Result<Ticket> {
        let sql = format!(
            "UPDATE app.ticket SET checked_in = TRUE WHERE event = $1 AND ticket_id = $2 \
             RETURNING {TICKET_COLUMNS}"
        );
        Ok(sqlx::query_as(&sql)
            .bind(event)
            .bind(ticket_id)
            .fetch_one(&mut self.conn)
            .await?)
    }
}
