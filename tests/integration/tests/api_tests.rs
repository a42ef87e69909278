//! Integration tests for the OpenTix API
//!
//! Run with: OPENTIX_API_URL=https://your-api.execute-api.us-east-1.amazonaws.com/prod \
//!           OPENTIX_TOKEN=<bearer token> cargo test
//!
//! These tests require a deployed OpenTix stage.

use opentix_integration_tests::{
    client::{ErrorResponse, TicketBatch},
    fixtures::{ensure_vendor, event_request, public_client, vendor_client, venue_request},
};
use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::json;

// ============================================================================
// Envelope Tests
// ============================================================================

#[tokio::test]
async fn test_preflight_echoes_allowed_origin() {
    let Some(client) = public_client() else { return };

    for origin in ["https://app.opentix.co", "http://localhost:5173", "http://127.0.0.1:9000"] {
        let response = client
            .raw(Method::OPTIONS, "/vendor/events", Some(origin))
            .await
            .expect("Preflight failed");
        assert_eq!(response.status.as_u16(), 200);
        assert_eq!(response.headers["access-control-allow-origin"], origin);
        assert_eq!(response.headers["access-control-allow-credentials"], "true");
    }
}

#[tokio::test]
async fn test_untrusted_origin_gets_production_origin() {
    let Some(client) = public_client() else { return };

    let response = client
        .raw(Method::GET, "/user/events", Some("https://evil.com"))
        .await
        .expect("Request failed");
    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.headers["access-control-allow-origin"], "https://opentix.co");
}

#[tokio::test]
async fn test_unsupported_method() {
    let Some(client) = public_client() else { return };

    let response = client
        .raw(Method::DELETE, "/user/events", None)
        .await
        .expect("Request failed");
    assert_eq!(response.status.as_u16(), 405);
    let body: ErrorResponse = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body.message, "Method Not Allowed");
}

// ============================================================================
// Public Listing Tests
// ============================================================================

#[tokio::test]
async fn test_public_events_page_size() {
    let Some(client) = public_client() else { return };

    let events = client.public_events("Page=1").await.expect("Listing failed");
    assert!(events.len() <= 10);
}

#[tokio::test]
async fn test_invalid_page_is_first_page() {
    let Some(client) = public_client() else { return };

    let first = client.public_events("Page=1").await.expect("Listing failed");
    for page in ["Page=0", "Page=-3", "Page=abc", ""] {
        let events = client.public_events(page).await.expect("Listing failed");
        let pks: Vec<i32> = events.iter().map(|e| e.pk).collect();
        assert_eq!(pks, first.iter().map(|e| e.pk).collect::<Vec<_>>(), "query {page:?}");
    }
}

#[tokio::test]
async fn test_bad_filters_do_not_fail() {
    let Some(client) = public_client() else { return };

    let unfiltered = client.public_events("").await.expect("Listing failed");
    let lenient = client
        .public_events("Basecost=cheap&EventDatetime=yesterday")
        .await
        .expect("Listing failed");
    assert_eq!(lenient.len(), unfiltered.len());
}

// ============================================================================
// Vendor Tests
// ============================================================================

#[tokio::test]
async fn test_vendor_lookup_requires_valid_key() {
    let Some(client) = public_client() else { return };

    let err = client.vendor_by_wallet("0x1234").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_vendor_routes_require_token() {
    let Some(client) = public_client() else { return };

    let err = client.all_venues().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_vendor_registration_is_unique() {
    let Some(client) = vendor_client() else { return };
    ensure_vendor(&client).await;

    let err = client.register_vendor("Second Try").await.unwrap_err();
    assert_eq!(err.status(), Some(409));

    let vendor = client.rename_vendor("Integration Vendor").await.expect("Rename failed");
    let found = client.vendor_by_uuid(&vendor.id).await.expect("Lookup failed");
    assert_eq!(found.pk, vendor.pk);
    assert_eq!(found.wallet, vendor.wallet);
}

// ============================================================================
// Venue & Event Tests
// ============================================================================

#[tokio::test]
async fn test_venue_capacity_is_immutable() {
    let Some(client) = vendor_client() else { return };
    ensure_vendor(&client).await;

    let venue = client.create_venue(&venue_request(0, 50)).await.expect("Create venue failed");
    let err = client
        .patch_venue(&json!({ "Pk": venue.pk, "NumGa": 500 }))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));

    let renamed = client
        .patch_venue(&json!({ "Pk": venue.pk, "Name": "Renamed Hall" }))
        .await
        .expect("Patch failed");
    assert_eq!(renamed.name, "Renamed Hall");
    assert_eq!(renamed.num_ga, 50);
}

#[tokio::test]
async fn test_event_over_capacity_is_rejected() {
    let Some(client) = vendor_client() else { return };
    ensure_vendor(&client).await;

    let venue = client.create_venue(&venue_request(0, 100)).await.expect("Create venue failed");

    let err = client.create_event(&event_request(venue.pk, 101)).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    let listed = client
        .vendor_events(&format!("Venue={}", venue.pk))
        .await
        .expect("Listing failed");
    assert!(listed.is_empty());

    let event = client.create_event(&event_request(venue.pk, 100)).await.expect("Create event failed");
    assert_eq!(event.num_ga, 100);
    let fetched = client.event(event.pk).await.expect("Get event failed");
    assert_eq!(fetched.id, event.id);
}

// ============================================================================
// Ticket Tests
// ============================================================================

#[tokio::test]
async fn test_ticket_batch_is_queued() {
    let Some(client) = vendor_client() else { return };
    ensure_vendor(&client).await;

    let venue = client.create_venue(&venue_request(0, 10)).await.expect("Create venue failed");
    let event = client.create_event(&event_request(venue.pk, 10)).await.expect("Create event failed");

    let batch = TicketBatch {
        event: event.id.clone(),
        contract: "0x0000000000000000000000000000000000000001".into(),
        ticket_min: 1,
        ticket_max: 10,
    };
    let accepted = client.request_tickets(&batch).await.expect("Batch request failed");
    assert_eq!(accepted, batch);

    let oversized = TicketBatch {
        ticket_max: 11,
        ..batch.clone()
    };
    let err = client.request_tickets(&oversized).await.unwrap_err();
    assert_eq!(err.status(), Some(400));

    let invalid = TicketBatch {
        ticket_min: 5,
        ticket_max: 1,
        ..batch
    };
    let err = client.request_tickets(&invalid).await.unwrap_err();
    assert_eq!(err.status(), Some(400));

    let tickets = client.tickets(event.pk, 1).await.expect("Ticket listing failed");
    assert!(tickets.len() <= 50);
}
