mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use fantasy402_rs::dto::{PlaceBetRequest, SportEventQuery};
use fantasy402_rs::entities::ExternalBetStatus;
use fantasy402_rs::events::{EventEnvelope, EventPublisher};
use fantasy402_rs::gateway::{
    HealthState, TOPIC_BALANCE_UPDATED, TOPIC_BET_CANCELLED, TOPIC_BET_PLACED,
    TOPIC_SPORT_EVENT_DISCOVERED,
};
use fantasy402_rs::retry::{RetryConfig, RetryPolicy};
use fantasy402_rs::{Fantasy402Adapter, Fantasy402Gateway};
use mockito::ServerGuard;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

use crate::common::test_config;

fn single_attempt_policy() -> RetryPolicy {
    RetryPolicy::new(RetryConfig {
        max_attempts: 1,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        multiplier: 2.0,
        jitter: false,
    })
}

fn test_gateway(server: &ServerGuard) -> (Fantasy402Gateway, Arc<EventPublisher>) {
    let adapter =
        Fantasy402Adapter::with_retry_policy(test_config(&server.url()), single_attempt_policy());
    let publisher = Arc::new(EventPublisher::new(false));
    let gateway = Fantasy402Gateway::new(adapter, publisher.clone());
    (gateway, publisher)
}

async fn auth_mock(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/System/authenticateCustomer")
        .with_status(200)
        .with_body(r#"{"code": "tok-123"}"#)
        .create_async()
        .await
}

async fn capture(
    publisher: &EventPublisher,
    topic: &str,
) -> Arc<Mutex<Vec<EventEnvelope>>> {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();
    publisher
        .subscribe(topic, move |envelope| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(envelope);
            }
        })
        .await;
    captured
}

#[tokio::test]
async fn test_get_bet_not_found_maps_to_none() {
    let mut server = mockito::Server::new_async().await;
    let _auth = auth_mock(&mut server).await;
    let _mock = server
        .mock("GET", "/bets/missing")
        .with_status(404)
        .create_async()
        .await;

    let (gateway, _publisher) = test_gateway(&server);
    let bet = gateway.get_bet("missing").await.unwrap();
    assert!(bet.is_none());
}

#[tokio::test]
async fn test_live_events_fan_out_one_event_per_entry() {
    let mut server = mockito::Server::new_async().await;
    let _auth = auth_mock(&mut server).await;
    let body = r#"{
        "events": [
            {"eventId": "E-1", "sport": "soccer", "homeTeam": "Home FC",
             "awayTeam": "Away FC", "startTime": "2026-08-30T18:00:00Z", "status": "live"},
            {"eventId": "E-2", "sport": "soccer", "homeTeam": "North",
             "awayTeam": "South", "startTime": "2026-08-30T19:00:00Z", "status": "scheduled"}
        ]
    }"#;
    let _mock = server
        .mock("GET", "/sports/events")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let (gateway, publisher) = test_gateway(&server);
    let captured = capture(&publisher, TOPIC_SPORT_EVENT_DISCOVERED).await;

    let events = gateway
        .get_live_sport_events(&SportEventQuery::default())
        .await
        .unwrap();

    assert_eq!(events.len(), 2);
    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 2);
    assert_eq!(captured[0].payload["eventId"], "E-1");
    assert_eq!(captured[1].payload["eventId"], "E-2");
}

#[tokio::test]
async fn test_place_bet_publishes_request_parameters() {
    let mut server = mockito::Server::new_async().await;
    let _auth = auth_mock(&mut server).await;
    let body = r#"{
        "bet": {
            "betId": "B-9", "agentId": "A-1", "eventId": "E-1",
            "marketId": "M-1", "selection": "Home", "stake": 50,
            "odds": 3.0, "status": "open", "placedAt": "2026-08-30T12:00:00Z"
        }
    }"#;
    let _mock = server
        .mock("POST", "/bets")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let (gateway, publisher) = test_gateway(&server);
    let captured = capture(&publisher, TOPIC_BET_PLACED).await;

    let bet = gateway
        .place_bet(PlaceBetRequest {
            agent_id: "A-1".to_string(),
            event_id: "E-1".to_string(),
            market_id: "M-1".to_string(),
            selection: "Home".to_string(),
            stake: dec!(50),
            odds: dec!(3.0),
            odds_format: None,
        })
        .await
        .unwrap();

    assert_eq!(bet.bet_id(), "B-9");
    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let payload = &captured[0].payload;
    // Request parameters plus resulting status; nothing else.
    assert_eq!(payload["agentId"], "A-1");
    assert_eq!(payload["marketId"], "M-1");
    assert_eq!(payload["status"], "open");
    assert!(payload.get("betId").is_none());
}

#[tokio::test]
async fn test_cancel_bet_publishes_reason() {
    let mut server = mockito::Server::new_async().await;
    let _auth = auth_mock(&mut server).await;
    let body = r#"{
        "bet": {
            "betId": "B-9", "agentId": "A-1", "eventId": "E-1",
            "marketId": "M-1", "selection": "Home", "stake": 50,
            "odds": 3.0, "status": "cancelled", "placedAt": "2026-08-30T12:00:00Z"
        }
    }"#;
    let _mock = server
        .mock("POST", "/bets/B-9/cancel")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let (gateway, publisher) = test_gateway(&server);
    let captured = capture(&publisher, TOPIC_BET_CANCELLED).await;

    let bet = gateway
        .cancel_bet("B-9", Some("line moved"))
        .await
        .unwrap();

    assert_eq!(bet.status(), ExternalBetStatus::Cancelled);
    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let payload = &captured[0].payload;
    assert_eq!(payload["betId"], "B-9");
    assert_eq!(payload["status"], "cancelled");
    assert_eq!(payload["reason"], "line moved");
}

#[tokio::test]
async fn test_balance_change_derives_previous_balance() {
    let mut server = mockito::Server::new_async().await;
    let _auth = auth_mock(&mut server).await;
    let _mock = server
        .mock("POST", "/agents/A-1/balance")
        .with_status(200)
        .with_body(r#"{"balance": {"agentId": "A-1", "newBalance": 750}}"#)
        .create_async()
        .await;

    let (gateway, publisher) = test_gateway(&server);
    let captured = capture(&publisher, TOPIC_BALANCE_UPDATED).await;

    let change = gateway
        .update_agent_balance("A-1", dec!(250), "deposit")
        .await
        .unwrap();

    assert_eq!(change.previous_balance, dec!(500));
    assert_eq!(change.new_balance, dec!(750));
    let captured = captured.lock().unwrap();
    assert_eq!(captured[0].payload["agentId"], "A-1");
}

#[tokio::test]
async fn test_versioned_topics_get_epoch_prefix() {
    let mut server = mockito::Server::new_async().await;
    let _auth = auth_mock(&mut server).await;
    let _mock = server
        .mock("POST", "/agents/A-1/balance")
        .with_status(200)
        .with_body(r#"{"balance": {"agentId": "A-1", "newBalance": 100}}"#)
        .create_async()
        .await;

    let mut config = test_config(&server.url());
    config.enable_event_versioning = true;
    let adapter = Fantasy402Adapter::with_retry_policy(config, single_attempt_policy());
    let publisher = Arc::new(EventPublisher::new(true));
    let gateway = Fantasy402Gateway::new(adapter, publisher.clone());
    let captured = capture(&publisher, TOPIC_BALANCE_UPDATED).await;

    gateway
        .update_agent_balance("A-1", dec!(100), "deposit")
        .await
        .unwrap();

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(
        captured[0].event_type,
        format!("v1.{TOPIC_BALANCE_UPDATED}")
    );
}

#[tokio::test]
async fn test_health_check_healthy_and_unhealthy() {
    let mut server = mockito::Server::new_async().await;
    let _auth = auth_mock(&mut server).await;
    let mock = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let (gateway, _publisher) = test_gateway(&server);
    let report = gateway.health_check().await;
    assert_eq!(report.state, HealthState::Healthy);

    mock.remove_async().await;
    let _down = server
        .mock("GET", "/health")
        .with_status(500)
        .create_async()
        .await;

    let report = gateway.health_check().await;
    assert_eq!(report.state, HealthState::Unhealthy);
}
