use super::*;
use crate::logs::Severity;
use crate::testing::ScriptedConnector;
use pretty_assertions::assert_eq;

fn subscriber_with(logs: LogsConfig) -> (LogSubscriber, ScriptedConnector) {
    let connector = ScriptedConnector::new();
    let subscriber = LogSubscriber::new(
        ServerConfig::default(),
        &logs,
        Box::new(connector.clone()),
    );
    (subscriber, connector)
}

fn subscriber() -> (LogSubscriber, ScriptedConnector) {
    subscriber_with(LogsConfig::default())
}

fn log_frame(message: &str) -> String {
    serde_json::json!({ "type": "log", "message": message, "container": "x" }).to_string()
}

fn messages(subscriber: &LogSubscriber) -> Vec<String> {
    subscriber
        .entries()
        .map(|entry| entry.message.clone())
        .collect()
}

#[test]
fn select_opens_encoded_endpoint_and_connects_on_open() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("web server");
    assert_eq!(subscriber.connection_state(), ConnectionState::Connecting);
    assert_eq!(
        connector.endpoints()[0].url(),
        "ws://localhost:8000/ws/logs/web%20server"
    );
    connector.push(TransportEvent::Opened);
    subscriber.pump(10, Instant::now());
    assert_eq!(subscriber.connection_state(), ConnectionState::Connected);
}

#[test]
fn error_log_frame_is_classified_and_appended_once() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("api");
    connector.push(TransportEvent::Opened);
    connector.push_message(r#"{"type":"log","message":"ERROR: boom"}"#);
    let report = subscriber.pump(10, Instant::now());
    assert_eq!(report.appended, 1);
    assert_eq!(subscriber.buffer().len(), 1);
    let entry = subscriber.entries().next().expect("entry");
    assert_eq!(entry.message, "ERROR: boom");
    assert_eq!(entry.severity, Severity::Error);
}

#[test]
fn non_log_frames_are_ignored() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("api");
    connector.push(TransportEvent::Opened);
    for raw in [
        r#"{"type":"heartbeat"}"#,
        r#"{"type":"error","message":"nope"}"#,
        r#"{"type":"broadcast","message":"hi"}"#,
        r#"{"type":"log","message":""}"#,
        "not json",
    ] {
        connector.push_message(raw);
    }
    let report = subscriber.pump(100, Instant::now());
    assert_eq!(report.ignored, 5);
    assert!(subscriber.buffer().is_empty());
}

#[test]
fn switching_services_keeps_exactly_one_subscription() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("alpha");
    connector.push(TransportEvent::Opened);
    connector.push_message(&log_frame("from alpha"));
    subscriber.pump(10, Instant::now());
    assert_eq!(messages(&subscriber), vec!["from alpha".to_owned()]);

    subscriber.select("beta");
    // Anything alpha still had queued is gone with its transport.
    connector.push_to(0, TransportEvent::Message(log_frame("late alpha")));
    connector.push(TransportEvent::Opened);
    connector.push_message(&log_frame("from beta"));
    subscriber.pump(10, Instant::now());

    assert!(connector.is_closed(0));
    assert_eq!(connector.live_count(), 1);
    assert_eq!(subscriber.selected_service(), Some("beta"));
    assert_eq!(messages(&subscriber), vec!["from beta".to_owned()]);
}

#[test]
fn reselecting_connected_service_is_a_no_op() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("alpha");
    connector.push(TransportEvent::Opened);
    connector.push_message(&log_frame("kept"));
    subscriber.pump(10, Instant::now());
    subscriber.select("alpha");
    assert_eq!(connector.open_count(), 1);
    assert_eq!(messages(&subscriber), vec!["kept".to_owned()]);
}

#[test]
fn paused_records_are_dropped_not_queued() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("alpha");
    connector.push(TransportEvent::Opened);
    subscriber.pump(10, Instant::now());

    subscriber.pause();
    connector.push_message(&log_frame("while paused"));
    let report = subscriber.pump(10, Instant::now());
    assert_eq!(report.dropped_paused, 1);

    subscriber.resume();
    connector.push_message(&log_frame("after resume"));
    subscriber.pump(10, Instant::now());
    assert_eq!(messages(&subscriber), vec!["after resume".to_owned()]);
}

#[test]
fn pause_carries_over_to_the_next_service() {
    let (mut subscriber, _connector) = subscriber();
    subscriber.select("alpha");
    assert!(subscriber.toggle_pause());
    subscriber.select("beta");
    assert!(subscriber.subscription().is_some_and(|s| s.paused));
}

#[test]
fn clear_twice_equals_clear_once_and_keeps_subscription() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("alpha");
    connector.push(TransportEvent::Opened);
    connector.push_message(&log_frame("one"));
    subscriber.pump(10, Instant::now());
    subscriber.clear();
    subscriber.clear();
    assert!(subscriber.buffer().is_empty());
    assert_eq!(subscriber.connection_state(), ConnectionState::Connected);
    connector.push_message(&log_frame("two"));
    subscriber.pump(10, Instant::now());
    let entry = subscriber.entries().next().expect("entry");
    assert_eq!(entry.id, 2);
}

#[test]
fn auto_scroll_requests_follow_appends_only_when_enabled() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("alpha");
    connector.push(TransportEvent::Opened);
    connector.push_message(&log_frame("one"));
    subscriber.pump(10, Instant::now());
    assert!(subscriber.take_scroll_request());
    assert!(!subscriber.take_scroll_request());

    assert!(!subscriber.toggle_auto_scroll());
    connector.push_message(&log_frame("two"));
    subscriber.pump(10, Instant::now());
    assert!(!subscriber.take_scroll_request());
}

#[test]
fn close_leaves_subscription_disconnected_until_manual_reconnect() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("alpha");
    connector.push(TransportEvent::Opened);
    connector.push_message(&log_frame("before"));
    connector.push(TransportEvent::Closed(None));
    let report = subscriber.pump(10, Instant::now());
    assert!(!report.reconnected);
    assert_eq!(subscriber.connection_state(), ConnectionState::Disconnected);

    subscriber.pump(10, Instant::now() + Duration::from_secs(60));
    assert_eq!(connector.open_count(), 1);

    assert!(subscriber.reconnect());
    assert_eq!(connector.open_count(), 2);
    assert_eq!(subscriber.connection_state(), ConnectionState::Connecting);
    assert_eq!(messages(&subscriber), vec!["before".to_owned()]);
    assert!(!subscriber.reconnect());
}

#[test]
fn failed_open_goes_straight_to_disconnected() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("alpha");
    connector.push(TransportEvent::Error("refused".to_owned()));
    subscriber.pump(10, Instant::now());
    assert_eq!(subscriber.connection_state(), ConnectionState::Disconnected);
    assert!(connector.is_closed(0));
}

#[test]
fn configured_delay_schedules_automatic_reconnect() {
    let (mut subscriber, connector) = subscriber_with(LogsConfig {
        reconnect_delay_ms: 500,
        ..LogsConfig::default()
    });
    let start = Instant::now();
    subscriber.select("alpha");
    connector.push(TransportEvent::Error("reset".to_owned()));
    subscriber.pump(10, start);
    assert!(!subscriber.pump(10, start + Duration::from_millis(100)).reconnected);
    assert!(subscriber.pump(10, start + Duration::from_millis(600)).reconnected);
    assert_eq!(connector.open_count(), 2);
}

#[test]
fn unselect_closes_and_drops_records() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("alpha");
    connector.push(TransportEvent::Opened);
    connector.push_message(&log_frame("one"));
    subscriber.pump(10, Instant::now());
    subscriber.unselect();
    assert!(subscriber.subscription().is_none());
    assert!(subscriber.buffer().is_empty());
    assert_eq!(connector.live_count(), 0);
}

#[test]
fn buffer_bound_evicts_oldest_records() {
    let (mut subscriber, connector) = subscriber_with(LogsConfig {
        max_entries: 2,
        ..LogsConfig::default()
    });
    subscriber.select("alpha");
    connector.push(TransportEvent::Opened);
    for message in ["a", "b", "c"] {
        connector.push_message(&log_frame(message));
    }
    subscriber.pump(10, Instant::now());
    assert_eq!(messages(&subscriber), vec!["b".to_owned(), "c".to_owned()]);
}

#[test]
fn pump_respects_event_budget() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("alpha");
    connector.push(TransportEvent::Opened);
    for i in 0..5 {
        connector.push_message(&log_frame(&format!("line {i}")));
    }
    assert_eq!(subscriber.pump(3, Instant::now()).handled, 3);
    assert_eq!(subscriber.pump(10, Instant::now()).handled, 3);
    assert_eq!(subscriber.buffer().len(), 5);
}
