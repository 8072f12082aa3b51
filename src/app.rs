use chrono::Duration;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    config::{Config, RunMode},
    domain::UpcomingEvent,
    message,
    pushplus::{PushPlusClient, SendError},
    schedule,
    storage::{self, EventStore},
};

pub const TEST_EVENT: &str = "[TEST] ECB monetary policy meeting";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Sent { events: usize },
    NothingToSend,
    DryRun { events: usize },
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("notification was not delivered: {0}")]
    Send(#[from] SendError),
}

/// Runs the reminder pipeline once: load, filter, render, send.
pub fn run(config: &Config) -> Result<RunOutcome, RunError> {
    if config.mode == RunMode::Test {
        info!("running in test mode");
        return run_test(config);
    }

    info!(today = %config.today, "checking for upcoming events");
    let records = storage::load_or_empty(&EventStore::new(&config.events_path));
    let upcoming = schedule::upcoming_events(&records, config.today);

    if upcoming.is_empty() {
        info!("no upcoming events need a reminder");
        return Ok(RunOutcome::NothingToSend);
    }

    info!(count = upcoming.len(), "preparing reminder notification");
    deliver(config, &upcoming)
}

fn run_test(config: &Config) -> Result<RunOutcome, RunError> {
    let date = config.today + Duration::days(1);
    let sample = [UpcomingEvent {
        date,
        raw_date: date.format("%Y-%m-%d").to_string(),
        event: TEST_EVENT.to_owned(),
        days_until: 1,
    }];

    info!("sending test notification");
    let outcome = deliver(config, &sample);
    match &outcome {
        Ok(_) => info!("test notification sent; check the subscribed channel"),
        Err(err) => error!(error = %err, "test notification failed"),
    }
    outcome
}

fn deliver(config: &Config, events: &[UpcomingEvent]) -> Result<RunOutcome, RunError> {
    let notification = message::render(events, config.today);

    if config.dry_run {
        info!(count = events.len(), "dry run; printing notification instead of sending");
        println!("{}\n\n{}", notification.title, notification.content);
        return Ok(RunOutcome::DryRun {
            events: events.len(),
        });
    }

    let client = PushPlusClient::new(config.push.clone())?;
    client.send(config.token.as_deref(), &notification)?;
    Ok(RunOutcome::Sent {
        events: events.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::{io::Write, path::PathBuf, time::Duration as StdDuration};

    use chrono::NaiveDate;
    use serde_json::Value;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::pushplus::{PushSettings, tests::serve_once};

    // Nothing listens on the discard port; reaching it would fail the send.
    const UNREACHABLE: &str = "http://127.0.0.1:9/send";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date")
    }

    fn events_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write events");
        file
    }

    fn config(events_path: PathBuf, endpoint: &str, token: Option<&str>) -> Config {
        Config {
            events_path,
            token: token.map(str::to_owned),
            mode: RunMode::Calendar,
            dry_run: false,
            today: today(),
            push: PushSettings {
                endpoint: endpoint.to_owned(),
                timeout: StdDuration::from_secs(5),
                ..PushSettings::default()
            },
        }
    }

    #[test]
    fn empty_calendar_succeeds_without_sending() {
        let file = events_file("[]");
        let config = config(file.path().to_path_buf(), UNREACHABLE, None);
        assert_eq!(run(&config).expect("run"), RunOutcome::NothingToSend);
    }

    #[test]
    fn unreadable_calendar_succeeds_without_sending() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = config(dir.path().join("missing.json"), UNREACHABLE, None);
        assert_eq!(run(&config).expect("run"), RunOutcome::NothingToSend);
    }

    #[test]
    fn events_outside_window_are_not_sent() {
        let file = events_file(
            r#"[{"date": "2026-10-18", "event": "today"}, {"date": "2026-10-21", "event": "later"}]"#,
        );
        let config = config(file.path().to_path_buf(), UNREACHABLE, None);
        assert_eq!(run(&config).expect("run"), RunOutcome::NothingToSend);
    }

    #[test]
    fn missing_token_fails_the_run() {
        let file = events_file(r#"[{"date": "2026-10-20", "event": "Policy Meeting"}]"#);
        let config = config(file.path().to_path_buf(), UNREACHABLE, None);
        assert!(matches!(
            run(&config),
            Err(RunError::Send(SendError::MissingToken))
        ));
    }

    #[test]
    fn upcoming_events_are_pushed() {
        let file = events_file(
            r#"[
                {"date": "2026-10-20", "event": "Policy Meeting"},
                {"date": "2026-11-30", "event": "Too far out"}
            ]"#,
        );
        let (endpoint, requests) = serve_once("200 OK", r#"{"code":200,"data":"id-1"}"#);
        let config = config(file.path().to_path_buf(), &endpoint, Some("token"));

        assert_eq!(run(&config).expect("run"), RunOutcome::Sent { events: 1 });

        let payload: Value =
            serde_json::from_str(&requests.recv().expect("request")).expect("json");
        let title = payload["title"].as_str().expect("title");
        let content = payload["content"].as_str().expect("content");
        assert!(title.starts_with("[1]"));
        assert!(content.contains("Policy Meeting"));
        assert!(!content.contains("Too far out"));
    }

    #[test]
    fn rejected_push_fails_the_run() {
        let file = events_file(r#"[{"date": "2026-10-19", "event": "Rate decision"}]"#);
        let (endpoint, _requests) = serve_once("200 OK", r#"{"code":500,"msg":"bad token"}"#);
        let config = config(file.path().to_path_buf(), &endpoint, Some("token"));
        assert!(matches!(
            run(&config),
            Err(RunError::Send(SendError::Rejected { code: 500, .. }))
        ));
    }

    #[test]
    fn test_mode_sends_sample_without_reading_calendar() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (endpoint, requests) = serve_once("200 OK", r#"{"code":200}"#);
        let mut config = config(dir.path().join("missing.json"), &endpoint, Some("token"));
        config.mode = RunMode::Test;

        assert_eq!(run(&config).expect("run"), RunOutcome::Sent { events: 1 });

        let payload: Value =
            serde_json::from_str(&requests.recv().expect("request")).expect("json");
        let content = payload["content"].as_str().expect("content");
        assert!(content.contains("[TEST] ECB monetary policy meeting"));
        assert!(content.contains("2026-10-19"));
    }

    #[test]
    fn dry_run_needs_no_token() {
        let file = events_file(r#"[{"date": "2026-10-19", "event": "Rate decision"}]"#);
        let mut config = config(file.path().to_path_buf(), UNREACHABLE, None);
        config.dry_run = true;
        assert_eq!(run(&config).expect("run"), RunOutcome::DryRun { events: 1 });
    }
}
