//! OpenTix API client for testing

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// API client for OpenTix
pub struct OpentixClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

// Request/Response types

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vendor {
    pub pk: i32,
    #[serde(rename = "ID")]
    pub id: String,
    pub wallet: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateVenueRequest {
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

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Venue {
    pub pk: i32,
    #[serde(rename = "ID")]
    pub id: String,
    pub vendor: i32,
    pub name: String,
    pub num_unique: i32,
    pub num_ga: i32,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateEventRequest {
    pub venue: i32,
    pub name: String,
    #[serde(rename = "Type")]
    pub event_type: String,
    pub event_datetime: String,
    pub description: String,
    pub disclaimer: String,
    pub basecost: f64,
    pub num_unique: i32,
    pub num_ga: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    pub pk: i32,
    #[serde(rename = "ID")]
    pub id: String,
    pub vendor: i32,
    pub venue: i32,
    pub name: String,
    #[serde(rename = "Type")]
    pub event_type: String,
    pub event_datetime: String,
    pub basecost: f64,
    pub num_unique: i32,
    pub num_ga: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TicketBatch {
    pub event: String,
    pub contract: String,
    pub ticket_min: i32,
    pub ticket_max: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ticket {
    pub event: i32,
    #[serde(rename = "TicketID")]
    pub ticket_id: i32,
    pub contract: String,
    pub checked_in: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Status, headers and body of a response, undecoded
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Result type for API responses
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// HTTP error with status code and body
    Http { status: StatusCode, body: String },
    /// Network or serialization error
    Request(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(status.as_u16()),
            ApiError::Request(_) => None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            ApiError::Request(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl OpentixClient {
    /// Create a new client with the given base URL and optional bearer token
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Same endpoint, no token
    pub fn anonymous(&self) -> Self {
        Self::new(&self.base_url, None)
    }

    // =========================================================================
    // Vendor Operations
    // =========================================================================

    pub async fn register_vendor(&self, name: &str) -> ApiResult<Vendor> {
        self.send(Method::POST, "/vendor/id", Some(&serde_json::json!({ "Name": name })))
            .await
    }

    pub async fn rename_vendor(&self, name: &str) -> ApiResult<Vendor> {
        self.send(Method::PATCH, "/vendor/id", Some(&serde_json::json!({ "Name": name })))
            .await
    }

    pub async fn vendor_by_wallet(&self, wallet: &str) -> ApiResult<Vendor> {
        self.get(&format!("/vendor/id?wallet={wallet}")).await
    }

    pub async fn vendor_by_uuid(&self, uuid: &str) -> ApiResult<Vendor> {
        self.get(&format!("/vendor/id?uuid={uuid}")).await
    }

    // =========================================================================
    // Venue Operations
    // =========================================================================

    pub async fn create_venue(&self, req: &CreateVenueRequest) -> ApiResult<Venue> {
        self.send(Method::POST, "/vendor/venues", Some(req)).await
    }

    pub async fn patch_venue(&self, patch: &serde_json::Value) -> ApiResult<Venue> {
        self.send(Method::PATCH, "/vendor/venues", Some(patch)).await
    }

    pub async fn venue(&self, pk: i32) -> ApiResult<Venue> {
        self.get(&format!("/vendor/venues?Pk={pk}")).await
    }

    pub async fn all_venues(&self) -> ApiResult<Vec<Venue>> {
        self.get("/vendor/venues?all=true").await
    }

    // =========================================================================
    // Event Operations
    // =========================================================================

    pub async fn create_event(&self, req: &CreateEventRequest) -> ApiResult<Event> {
        self.send(Method::POST, "/vendor/events", Some(req)).await
    }

    pub async fn event(&self, pk: i32) -> ApiResult<Event> {
        self.get(&format!("/vendor/events?Pk={pk}")).await
    }

    pub async fn vendor_events(&self, query: &str) -> ApiResult<Vec<Event>> {
        self.get(&format!("/vendor/events?{query}")).await
    }

    pub async fn public_events(&self, query: &str) -> ApiResult<Vec<Event>> {
        self.get(&format!("/user/events?{query}")).await
    }

    // =========================================================================
    // Ticket Operations
    // =========================================================================

    pub async fn request_tickets(&self, batch: &TicketBatch) -> ApiResult<TicketBatch> {
        self.send(Method::POST, "/vendor/tickets", Some(batch)).await
    }

    pub async fn tickets(&self, event_pk: i32, page: i32) -> ApiResult<Vec<Ticket>> {
        self.get(&format!("/vendor/tickets?Event={event_pk}&Page={page}"))
            .await
    }

    // =========================================================================
    // HTTP Helpers
    // =========================================================================

    /// Sends a request and returns the response without interpreting it
    pub async fn raw(
        &self,
        method: Method,
        path: &str,
        origin: Option<&str>,
    ) -> ApiResult<RawResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(origin) = origin {
            request = request.header("Origin", origin);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Ok(RawResponse { status, headers, body })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ApiResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| ApiError::Request(e.to_string()))
        } else {
            Err(ApiError::Http { status, body })
        }
    }
}
