//! Venue management for the owning vendor

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{ensure_owner, non_negative, parse_uuid, required_text};
use crate::catalog::Catalog;
use crate::errors::{Error, Result};
use crate::models::{non_empty, CreateVenueRequest, NewVenue, PatchVenueRequest, Vendor, Venue, VenueChanges};
use crate::pagination::Page;
use crate::params::QueryParams;

const ALL_KEY: &str = "all";
const PK_KEY: &str = "Pk";
const ID_KEY: &str = "ID";

/// Which venues a GET asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenueQuery {
    All,
    ByPk(i32),
    ById(Uuid),
    Paged(Page),
}

impl VenueQuery {
    /// `all=true` wins, then `Pk`, then `ID`, otherwise a page
    pub fn from_query(params: &QueryParams) -> Result<Self> {
        if params
            .get(ALL_KEY)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
        {
            return Ok(VenueQuery::All);
        }
        if let Some(raw) = params.get(PK_KEY) {
            let pk = raw
                .trim()
                .parse()
                .map_err(|_| Error::Validation("Pk must be an integer".to_string()))?;
            return Ok(VenueQuery::ByPk(pk));
        }
        if let Some(raw) = params.get(ID_KEY) {
            return Ok(VenueQuery::ById(parse_uuid(raw, "ID")?));
        }
        Ok(VenueQuery::Paged(params.page()))
    }
}

/// A single venue or a list, serialized without a wrapper
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VenueListing {
    One(Box<Venue>),
    Many(Vec<Venue>),
}

pub async fn owned_by_pk(catalog: &mut dyn Catalog, vendor: &Vendor, pk: i32) -> Result<Venue> {
    let venue = catalog
        .venue_by_pk(pk)
        .await?
        .ok_or_else(|| Error::NotFound("Venue not found".to_string()))?;
    ensure_owner(vendor, venue.vendor, "Venue")?;
    Ok(venue)
}

pub async fn owned_by_uuid(catalog: &mut dyn Catalog, vendor: &Vendor, id: Uuid) -> Result<Venue> {
    let venue = catalog
        .venue_by_uuid(id)
        .await?
        .ok_or_else(|| Error::NotFound("Venue not found".to_string()))?;
    ensure_owner(vendor, venue.vendor, "Venue")?;
    Ok(venue)
}

pub async fn get(catalog: &mut dyn Catalog, vendor: &Vendor, query: &VenueQuery) -> Result<VenueListing> {
    Ok(match query {
        VenueQuery::All => VenueListing::Many(catalog.all_venues_for_vendor(vendor.pk).await?),
        VenueQuery::Paged(page) => VenueListing::Many(catalog.venues_for_vendor(vendor.pk, *page).await?),
        VenueQuery::ByPk(pk) => VenueListing::One(Box::new(owned_by_pk(catalog, vendor, *pk).await?)),
        VenueQuery::ById(id) => VenueListing::One(Box::new(owned_by_uuid(catalog, vendor, *id).await?)),
    })
}

fn validate_new(vendor: &Vendor, body: &CreateVenueRequest) -> Result<NewVenue> {
    Ok(NewVenue {
        vendor: vendor.pk,
        name: required_text(&body.name, "Name")?,
        street_address: required_text(&body.street_address, "StreetAddress")?,
        zip: required_text(&body.zip, "Zip")?,
        city: required_text(&body.city, "City")?,
        state_code: required_text(&body.state_code, "StateCode")?,
        state_name: required_text(&body.state_name, "StateName")?,
        country_code: required_text(&body.country_code, "CountryCode")?,
        country_name: required_text(&body.country_name, "CountryName")?,
        num_unique: non_negative(body.num_unique.unwrap_or(0), "NumUnique")?,
        num_ga: non_negative(body.num_ga.unwrap_or(0), "NumGa")?,
    })
}

pub async fn create(catalog: &mut dyn Catalog, vendor: &Vendor, body: &CreateVenueRequest) -> Result<Venue> {
    let new = validate_new(vendor, body)?;
    let venue = catalog.create_venue(&new).await?;
    info!(vendor_pk = vendor.pk, venue_pk = venue.pk, "Created venue");
    Ok(venue)
}

/// Applies the mutable fields of a patch; capacity fields are rejected
pub async fn patch(catalog: &mut dyn Catalog, vendor: &Vendor, body: &PatchVenueRequest) -> Result<Venue> {
    let pk = body
        .pk
        .ok_or_else(|| Error::Validation("Pk is required".to_string()))?;
    if body.num_unique.is_some() || body.num_ga.is_some() {
        return Err(Error::Validation(
            "Venue capacity cannot be changed".to_string(),
        ));
    }

    let changes = VenueChanges {
        name: non_empty(body.name.clone()),
        street_address: non_empty(body.street_address.clone()),
        zip: non_empty(body.zip.clone()),
        city: non_empty(body.city.clone()),
        state_code: non_empty(body.state_code.clone()),
        state_name: non_empty(body.state_name.clone()),
        country_code: non_empty(body.country_code.clone()),
        country_name: non_empty(body.country_name.clone()),
    };

    owned_by_pk(catalog, vendor, pk).await?;
    catalog.update_venue(pk, &changes).await
}
