use std::time::{Duration, Instant};

use devstack::config::{LogsConfig, ServerConfig, TerminalConfig};
use devstack::logs::{ConnectionState, LogSubscriber, Severity};
use devstack::terminal::{ContainerSize, Dimensions, SessionMode, TerminalSession};
use devstack::testing::ScriptedConnector;
use devstack::transport::TransportEvent;
use pretty_assertions::assert_eq;

fn mounted_session() -> (TerminalSession, ScriptedConnector) {
    let connector = ScriptedConnector::new();
    let config = TerminalConfig::default();
    let mut session = TerminalSession::new(
        &config,
        ServerConfig::default().terminal_endpoint(),
        Box::new(connector.clone()),
    );
    session.mount(ContainerSize::new(80, 24), Instant::now());
    (session, connector)
}

fn live_session() -> (TerminalSession, ScriptedConnector) {
    let (mut session, connector) = mounted_session();
    session.connect();
    connector.push(TransportEvent::Opened);
    session.pump(16);
    assert_eq!(session.mode(), SessionMode::Live);
    (session, connector)
}

fn subscriber() -> (LogSubscriber, ScriptedConnector) {
    let connector = ScriptedConnector::new();
    let subscriber = LogSubscriber::new(
        ServerConfig::default(),
        &LogsConfig::default(),
        Box::new(connector.clone()),
    );
    (subscriber, connector)
}

fn log_frame(message: &str) -> String {
    serde_json::json!({ "type": "log", "message": message }).to_string()
}

fn messages(subscriber: &LogSubscriber) -> Vec<String> {
    subscriber
        .entries()
        .map(|entry| entry.message.clone())
        .collect()
}

#[test]
fn help_typed_offline_prints_the_command_listing() {
    let (mut session, connector) = mounted_session();
    session.handle_keys("help");
    session.handle_keys("\r");
    assert!(session.surface().contents().contains("Available commands:"));
    assert_eq!(session.input_line(), "");
    assert_eq!(connector.open_count(), 0);
}

#[test]
fn docker_logs_prints_header_and_three_lines() {
    let (mut session, _connector) = mounted_session();
    session.handle_keys("docker logs web-server\r");
    let contents = session.surface().contents();
    let lines = contents.lines().collect::<Vec<&str>>();
    let header = lines
        .iter()
        .rposition(|line| line.contains("web-server") && !line.contains("$ docker logs"))
        .expect("log header");
    let body = &lines[header + 1..header + 4];
    assert!(body.iter().all(|line| !line.trim().is_empty()), "{contents}");
    assert!(lines[header + 4].contains("devstack@manager"), "{contents}");
}

#[test]
fn output_frame_while_live_reaches_the_surface() {
    let (mut session, connector) = live_session();
    connector.push_message(r#"{"type":"output","data":"X marks the spot"}"#);
    assert_eq!(session.pump(16), 1);
    assert!(session.surface().contents().contains("X marks the spot"));
    assert_eq!(session.mode(), SessionMode::Live);
}

#[test]
fn keystrokes_while_live_are_forwarded_verbatim() {
    let (mut session, connector) = live_session();
    session.handle_keys("ls");
    session.handle_keys("\r");
    assert_eq!(
        connector.sent(0),
        vec![
            r#"{"type":"input","data":"ls"}"#.to_owned(),
            r#"{"type":"input","data":"\r"}"#.to_owned(),
        ]
    );
    assert_eq!(session.input_line(), "");
}

#[test]
fn close_while_live_falls_back_to_the_local_editor() {
    let (mut session, connector) = live_session();
    connector.push(TransportEvent::Closed(None));
    session.pump(16);
    assert_eq!(session.mode(), SessionMode::Offline);
    assert!(session
        .surface()
        .contents()
        .contains("Switched to simulation mode."));

    session.handle_keys("p");
    assert_eq!(session.input_line(), "p");
    assert_eq!(connector.sent(0), Vec::<String>::new());
}

#[test]
fn failed_open_returns_to_offline_with_one_message() {
    let (mut session, connector) = mounted_session();
    let mut modes = vec![session.mode()];
    session.connect();
    modes.push(session.mode());
    connector.push(TransportEvent::Error("connection refused".to_owned()));
    session.pump(16);
    modes.push(session.mode());
    assert_eq!(
        modes,
        vec![
            SessionMode::Offline,
            SessionMode::Connecting,
            SessionMode::Offline
        ]
    );
    let contents = session.surface().contents();
    assert_eq!(
        contents
            .matches("Could not connect to live terminal session")
            .count(),
        1
    );
}

#[test]
fn disconnect_from_live_closes_the_transport() {
    let (mut session, connector) = live_session();
    session.disconnect();
    assert_eq!(session.mode(), SessionMode::Offline);
    assert!(connector.is_closed(0));
    assert_eq!(connector.live_count(), 0);
}

#[test]
fn unmount_closes_the_live_transport() {
    let (mut session, connector) = live_session();
    session.unmount();
    assert!(!session.is_mounted());
    assert!(connector.is_closed(0));
}

#[test]
fn error_record_is_classified_and_appended_once() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("api");
    connector.push(TransportEvent::Opened);
    connector.push_message(r#"{"type":"log","message":"ERROR: boom"}"#);
    subscriber.pump(16, Instant::now());
    assert_eq!(subscriber.buffer().len(), 1);
    let entry = subscriber.entries().next().expect("entry");
    assert_eq!(entry.severity, Severity::Error);
    assert_eq!(entry.message, "ERROR: boom");
}

#[test]
fn switching_services_keeps_one_subscription_and_drops_old_records() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("a");
    connector.push_to(0, TransportEvent::Opened);
    connector.push_to(0, TransportEvent::Message(log_frame("from a")));
    subscriber.pump(16, Instant::now());
    assert_eq!(messages(&subscriber), vec!["from a".to_owned()]);

    connector.push_to(0, TransportEvent::Message(log_frame("late from a")));
    subscriber.select("b");
    assert!(connector.is_closed(0));
    assert_eq!(connector.live_count(), 1);
    assert!(subscriber.buffer().is_empty());

    connector.push_to(1, TransportEvent::Opened);
    connector.push_to(1, TransportEvent::Message(log_frame("from b")));
    subscriber.pump(16, Instant::now());
    assert_eq!(subscriber.selected_service(), Some("b"));
    assert_eq!(subscriber.connection_state(), ConnectionState::Connected);
    assert_eq!(messages(&subscriber), vec!["from b".to_owned()]);
}

#[test]
fn records_received_while_paused_never_appear() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("api");
    connector.push(TransportEvent::Opened);
    connector.push_message(&log_frame("before"));
    subscriber.pump(16, Instant::now());

    subscriber.pause();
    connector.push_message(&log_frame("while paused"));
    let report = subscriber.pump(16, Instant::now());
    assert_eq!(report.dropped_paused, 1);

    subscriber.resume();
    connector.push_message(&log_frame("after"));
    subscriber.pump(16, Instant::now());
    assert_eq!(
        messages(&subscriber),
        vec!["before".to_owned(), "after".to_owned()]
    );
}

#[test]
fn clearing_twice_matches_clearing_once() {
    let (mut subscriber, connector) = subscriber();
    subscriber.select("api");
    connector.push(TransportEvent::Opened);
    connector.push_message(&log_frame("one"));
    subscriber.pump(16, Instant::now());
    subscriber.clear();
    subscriber.clear();
    assert!(subscriber.buffer().is_empty());
    assert_eq!(subscriber.connection_state(), ConnectionState::Connected);

    let (mut session, _connector) = mounted_session();
    session.handle_keys("clear\r");
    let once = session.surface().contents();
    session.handle_keys("clear\r");
    assert_eq!(session.surface().contents(), once);
}

#[test]
fn first_fit_waits_for_the_settle_delay_after_mount() {
    let connector = ScriptedConnector::new();
    let mut session = TerminalSession::new(
        &TerminalConfig::default(),
        ServerConfig::default().terminal_endpoint(),
        Box::new(connector.clone()),
    );
    let mounted_at = Instant::now();
    session.mount(ContainerSize::new(100, 30), mounted_at);

    assert!(!session.tick(mounted_at + Duration::from_millis(50)));
    assert_eq!(session.dimensions(), Dimensions::new(24, 80));
    assert!(session.tick(mounted_at + Duration::from_millis(150)));
    assert_eq!(session.dimensions(), Dimensions::new(30, 100));
}

#[test]
fn resizing_while_live_refits_locally_without_sending_upstream() {
    let (mut session, connector) = live_session();
    let resized_at = Instant::now();
    session.resize(ContainerSize::new(120, 40), resized_at);
    session.resize(ContainerSize::new(121, 40), resized_at + Duration::from_millis(60));
    assert!(!session.tick(resized_at + Duration::from_millis(120)));
    session.resize(ContainerSize::new(120, 40), resized_at + Duration::from_millis(130));

    assert!(session.tick(resized_at + Duration::from_millis(300)));
    assert_eq!(session.dimensions(), Dimensions::new(40, 120));
    assert_eq!(session.mode(), SessionMode::Live);
    assert_eq!(connector.sent(0), Vec::<String>::new());
}
