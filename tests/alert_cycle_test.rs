//! End-to-end alert cycle tests against mocked feed and gateway

use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use quakewatch::alert::AlertCycle;
use quakewatch::feed::{RegionFilter, UsgsClient, UsgsConfig};
use quakewatch::push::{ExpoConfig, ExpoPushClient, NotificationDispatcher};
use quakewatch::registry::{InMemoryRegistry, RegistrationRequest, SubscriberRegistry};
use std::sync::Arc;
use std::time::Duration;

fn registration(token: &str) -> RegistrationRequest {
    RegistrationRequest {
        push_token: token.to_string(),
        country: Some("Bangladesh".to_string()),
        region: Some(RegionFilter {
            min_latitude: 20.5,
            max_latitude: 26.7,
            min_longitude: 88.0,
            max_longitude: 92.7,
        }),
        min_magnitude: 0.0,
        significant_magnitude_threshold: 4.5,
    }
}

fn cycle_against(
    feed_server: &MockServer,
    push_server: &MockServer,
    registry: Arc<InMemoryRegistry>,
) -> AlertCycle {
    let feed = Arc::new(UsgsClient::with_config(UsgsConfig {
        base_url: feed_server.base_url(),
        timeout: Duration::from_secs(5),
    }));
    let gateway = Arc::new(ExpoPushClient::with_config(ExpoConfig {
        endpoint: push_server.url("/push"),
        timeout: Duration::from_secs(5),
    }));

    AlertCycle::new(
        feed,
        registry,
        NotificationDispatcher::new(gateway),
        chrono::Duration::minutes(10),
        50,
    )
}

fn quake_body(time_millis: i64) -> serde_json::Value {
    serde_json::json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "id": "usgs1",
            "properties": {"mag": 5.2, "place": "10km SE of Town", "time": time_millis},
            "geometry": {"type": "Point", "coordinates": [90.3, 23.7, 10.0]}
        }]
    })
}

#[tokio::test]
async fn test_significant_event_notifies_exactly_once() {
    let occurred = 1_704_067_200_000i64;

    let feed_server = MockServer::start();
    let feed_mock = feed_server.mock(|when, then| {
        when.method(GET)
            .path("/query")
            .query_param("minlatitude", "20.5")
            .query_param("minmagnitude", "0");
        then.status(200).json_body(quake_body(occurred));
    });

    let push_server = MockServer::start();
    let push_mock = push_server.mock(|when, then| {
        when.method(POST).path("/push").json_body(serde_json::json!([
            {
                "to": "tok-1",
                "sound": "default",
                "title": "Earthquake M5.2",
                "body": "10km SE of Town",
                "data": {"usgsId": "usgs1", "country": "Bangladesh"}
            }
        ]));
        then.status(200)
            .json_body(serde_json::json!({"data": [{"status": "ok"}]}));
    });

    let registry = Arc::new(InMemoryRegistry::new());
    registry.register(registration("tok-1")).await.unwrap();

    let cycle = cycle_against(&feed_server, &push_server, registry.clone());

    // First cycle: one message, watermark set to the event time.
    let report = cycle.run().await.unwrap();
    assert_eq!(report.subscribers, 1);
    assert_eq!(report.messages_dispatched, 1);
    push_mock.assert();

    let stored = registry.list_active().await.unwrap().remove(0);
    assert_eq!(
        stored.last_notified_at,
        Some(Utc.timestamp_millis_opt(occurred).unwrap())
    );

    // Second cycle over the unchanged feed window: nothing dispatched.
    let report = cycle.run().await.unwrap();
    assert_eq!(report.messages_dispatched, 0);
    push_mock.assert_hits(1);
    assert_eq!(feed_mock.hits(), 2);

    let stored = registry.list_active().await.unwrap().remove(0);
    assert_eq!(
        stored.last_notified_at,
        Some(Utc.timestamp_millis_opt(occurred).unwrap())
    );
}

#[tokio::test]
async fn test_sub_threshold_feed_never_hits_gateway() {
    let feed_server = MockServer::start();
    feed_server.mock(|when, then| {
        when.method(GET).path("/query");
        then.status(200).json_body(serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": "usgs-minor",
                "properties": {"mag": 3.1, "place": "Offshore", "time": 1_704_067_200_000i64},
                "geometry": {"type": "Point", "coordinates": [90.3, 23.7, 10.0]}
            }]
        }));
    });

    let push_server = MockServer::start();
    let push_mock = push_server.mock(|when, then| {
        when.method(POST).path("/push");
        then.status(200).json_body(serde_json::json!({"data": []}));
    });

    let registry = Arc::new(InMemoryRegistry::new());
    registry.register(registration("tok-1")).await.unwrap();

    let report = cycle_against(&feed_server, &push_server, registry)
        .run()
        .await
        .unwrap();

    assert_eq!(report.messages_dispatched, 0);
    push_mock.assert_hits(0);
}

#[tokio::test]
async fn test_feed_outage_for_one_subscriber_is_isolated() {
    let occurred = 1_704_067_200_000i64;

    // The first subscriber's region errors; the second's succeeds.
    let feed_server = MockServer::start();
    feed_server.mock(|when, then| {
        when.method(GET).path("/query").query_param("minlatitude", "40");
        then.status(503);
    });
    let ok_mock = feed_server.mock(|when, then| {
        when.method(GET).path("/query").query_param("minlatitude", "20.5");
        then.status(200).json_body(quake_body(occurred));
    });

    let push_server = MockServer::start();
    let push_mock = push_server.mock(|when, then| {
        when.method(POST).path("/push");
        then.status(200).json_body(serde_json::json!({"data": []}));
    });

    let registry = Arc::new(InMemoryRegistry::new());
    let mut outage = registration("tok-outage");
    outage.region = Some(RegionFilter {
        min_latitude: 40.0,
        max_latitude: 46.0,
        min_longitude: 88.0,
        max_longitude: 92.7,
    });
    registry.register(outage).await.unwrap();
    registry.register(registration("tok-ok")).await.unwrap();

    let report = cycle_against(&feed_server, &push_server, registry.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(report.subscribers, 2);
    assert_eq!(report.failed_fetches, 1);
    assert_eq!(report.messages_dispatched, 1);
    ok_mock.assert();
    push_mock.assert();

    // Only the healthy subscriber's watermark advanced.
    let stored = registry.list_active().await.unwrap();
    let outage_sub = stored.iter().find(|s| s.push_token == "tok-outage").unwrap();
    let ok_sub = stored.iter().find(|s| s.push_token == "tok-ok").unwrap();
    assert_eq!(outage_sub.last_notified_at, None);
    assert!(ok_sub.last_notified_at.is_some());
}

#[tokio::test]
async fn test_gateway_failure_does_not_roll_back_watermark() {
    let occurred = 1_704_067_200_000i64;

    let feed_server = MockServer::start();
    feed_server.mock(|when, then| {
        when.method(GET).path("/query");
        then.status(200).json_body(quake_body(occurred));
    });

    let push_server = MockServer::start();
    let push_mock = push_server.mock(|when, then| {
        when.method(POST).path("/push");
        then.status(500);
    });

    let registry = Arc::new(InMemoryRegistry::new());
    registry.register(registration("tok-1")).await.unwrap();

    let cycle = cycle_against(&feed_server, &push_server, registry.clone());

    // Delivery fails, but the cycle itself succeeds and the watermark holds.
    let report = cycle.run().await.unwrap();
    assert_eq!(report.messages_dispatched, 1);
    push_mock.assert();

    let stored = registry.list_active().await.unwrap().remove(0);
    assert_eq!(
        stored.last_notified_at,
        Some(Utc.timestamp_millis_opt(occurred).unwrap())
    );

    // The next cycle does not re-notify: at-most-once delivery.
    let report = cycle.run().await.unwrap();
    assert_eq!(report.messages_dispatched, 0);
    push_mock.assert_hits(1);
}
