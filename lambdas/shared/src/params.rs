//! Query parameter normalization
//!
//! Converts loosely typed query-string values into typed, defaulted filters.
//! Nothing here fails a request: a missing or unparsable value falls back to
//! the "unfiltered" default for its field.
//!
//! | Field            | Key             | Default when absent or invalid |
//! |------------------|-----------------|--------------------------------|
//! | page             | `Page`          | 1 (also for zero / negative)   |
//! | venue, event id  | `Venue`,`Event` | `-1` (no filter)               |
//! | cost ceiling     | `Basecost`      | [`NO_COST_CEILING`]            |
//! | since timestamp  | `EventDatetime` | [`zero_time`] (no lower bound) |
//! | text filter      | `Filter`        | `""` (no filter)               |
//!
//! Keys are matched case-insensitively.

use chrono::NaiveDateTime;

use crate::pagination::Page;

/// Canonical timestamp layout, e.g. `2025-06-01T19:30:00.000Z`
pub const TIMESTAMP_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Integer id filter meaning "no filter"
pub const NO_FILTER: i32 = -1;

/// Cost ceiling meaning "no ceiling"; `basecost <= NO_COST_CEILING` admits every event
pub const NO_COST_CEILING: f64 = 10_000_000_000.0;

pub const PAGE_KEY: &str = "Page";
pub const VENUE_KEY: &str = "Venue";
pub const EVENT_KEY: &str = "Event";
pub const COST_KEY: &str = "Basecost";
pub const SINCE_KEY: &str = "EventDatetime";
pub const FILTER_KEY: &str = "Filter";
pub const ZIP_KEY: &str = "Zip";
pub const NAME_KEY: &str = "Name";
pub const TYPE_KEY: &str = "Type";

/// Lower bound that admits every timestamp (the Unix epoch)
pub fn zero_time() -> NaiveDateTime {
    NaiveDateTime::default()
}

/// Parses a timestamp in the canonical layout.
///
/// Trailing carriage returns and newlines are ignored; fractional seconds are optional.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim_matches(|c| c == '\r' || c == '\n');
    NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_LAYOUT).ok()
}

/// Raw query-string values of one request
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// First value for `key`, ignoring ASCII case
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn page(&self) -> Page {
        self.get(PAGE_KEY)
            .and_then(|v| v.trim().parse::<i32>().ok())
            .map(Page::new)
            .unwrap_or_default()
    }

    /// Integer id filter under `key`, [`NO_FILTER`] when absent or invalid
    pub fn id_filter(&self, key: &str) -> i32 {
        self.get(key)
            .and_then(|v| v.trim().parse::<i32>().ok())
            .unwrap_or(NO_FILTER)
    }

    pub fn cost_ceiling(&self) -> f64 {
        self.get(COST_KEY)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|c| c.is_finite())
            .unwrap_or(NO_COST_CEILING)
    }

    pub fn since(&self) -> NaiveDateTime {
        self.get(SINCE_KEY)
            .filter(|v| !v.is_empty())
            .and_then(parse_timestamp)
            .unwrap_or_else(zero_time)
    }

    /// Lower-cased free text under `key`, empty when absent. Whitespace is kept.
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(str::to_lowercase).unwrap_or_default()
    }
}

/// Normalized filter for the listing endpoints
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFilter {
    pub page: Page,
    pub venue: i32,
    pub event: i32,
    pub cost_ceiling: f64,
    pub since: NaiveDateTime,
    pub text: String,
}

impl ListingFilter {
    pub fn from_query(params: &QueryParams) -> Self {
        Self {
            page: params.page(),
            venue: params.id_filter(VENUE_KEY),
            event: params.id_filter(EVENT_KEY),
            cost_ceiling: params.cost_ceiling(),
            since: params.since(),
            text: params.text(FILTER_KEY),
        }
    }

    pub fn has_venue(&self) -> bool {
        self.venue != NO_FILTER
    }

    pub fn has_event(&self) -> bool {
        self.event != NO_FILTER
    }

    /// Whether an event with this cost and start time passes the filter
    pub fn admits(&self, basecost: f64, starts_at: NaiveDateTime) -> bool {
        basecost <= self.cost_ceiling && starts_at >= self.since
    }
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self::from_query(&QueryParams::default())
    }
}

/// Public event search: the listing filter plus location, name and type
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventSearch {
    pub filter: ListingFilter,
    pub zip: String,
    pub name: String,
    pub event_type: String,
}

impl EventSearch {
    pub fn from_query(params: &QueryParams) -> Self {
        Self {
            filter: ListingFilter::from_query(params),
            zip: params.text(ZIP_KEY),
            name: params.text(NAME_KEY),
            event_type: params.text(TYPE_KEY),
        }
    }
}
