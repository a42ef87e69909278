//! OpenTix Core Library
//!
//! Shared functionality for the OpenTix Lambda functions including:
//! - Domain models and request bodies
//! - Query normalization and pagination
//! - Token claims and the response envelope
//! - The catalog store and the services built on it
//! - Configuration and logging

pub mod catalog;
pub mod claims;
pub mod config;
pub mod deadline;
pub mod envelope;
pub mod errors;
pub mod models;
pub mod notifications;
pub mod pagination;
pub mod params;
pub mod request;
pub mod service;
pub mod telemetry;

pub use catalog::{Catalog, PgCatalog, PhotoOwner, PhotoTarget};
pub use claims::{CallerIdentity, ClaimsError};
pub use config::{AppContext, Config};
pub use envelope::{OriginPolicy, Responder};
pub use errors::{Error, Result};
pub use models::*;
pub use pagination::Page;
pub use params::{EventSearch, ListingFilter, QueryParams};
