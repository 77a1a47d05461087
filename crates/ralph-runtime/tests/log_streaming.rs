//! Integration tests for log capture through the `Supervisor`.
//!
//! Process output and tailed log files feed one buffer per project; the
//! buffer stays bounded while its counter keeps growing, and subscribers see
//! history first and then every new line exactly once.

#![cfg(unix)]

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use ralph_core::{LogStreamMessage, ProcessEvent, ProcessStatus, Settings};
use ralph_runtime::{LaunchSpec, LogBuffer, Supervisor};
use tempfile::TempDir;
use tokio::time::{sleep, timeout};
use tokio_test::assert_ok;

fn fast_settings() -> Settings {
    Settings {
        stop_timeout_secs: Some(2),
        kill_timeout_secs: Some(2),
        watch_poll_interval_ms: Some(10),
        watch_wait_interval_ms: Some(10),
        ..Settings::with_defaults()
    }
}

fn append_to(path: &Path, text: &str) {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .unwrap();
    file.write_all(text.as_bytes()).unwrap();
}

async fn wait_for_count(buffer: &LogBuffer, count: u64) {
    for _ in 0..500 {
        if buffer.count() >= count {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("buffer reached {} of {count} lines", buffer.count());
}

#[tokio::test]
async fn buffer_stays_bounded_while_counter_grows() {
    let settings = Settings {
        log_max_lines: Some(3),
        history_lines: Some(3),
        ..fast_settings()
    };
    let supervisor = Supervisor::new(&settings);
    let dir = TempDir::new().unwrap();

    let spec = LaunchSpec::new(
        "alpha",
        ["sh", "-c", "for l in a b c d e; do echo $l; done"],
        dir.path(),
    );
    let process = assert_ok!(supervisor.launch_project(spec, &[]).await);
    assert_eq!(process.wait().await, Some(0));

    let buffer = supervisor.logs().get_buffer("alpha");
    wait_for_count(&buffer, 5).await;
    assert_eq!(buffer.get_all(), vec!["c", "d", "e"]);
    assert_eq!(buffer.count(), 5);
    assert_eq!(supervisor.status("alpha").await, ProcessStatus::Completed);
}

#[tokio::test]
async fn launch_watches_discovered_and_extra_logs() {
    let supervisor = Supervisor::new(&fast_settings());
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".ralph-tui/logs")).unwrap();
    std::fs::write(dir.path().join(".ralph-tui/logs/session.log"), "").unwrap();
    let extra = dir.path().join("agent.log");

    let spec = LaunchSpec::new("alpha", ["sleep", "30"], dir.path());
    assert_ok!(supervisor.launch_project(spec, &[extra.clone()]).await);
    assert_eq!(supervisor.logs().watcher_count("alpha"), 2);

    let buffer = supervisor.logs().get_buffer("alpha");
    wait_for_count(&buffer, 1).await;
    assert_eq!(
        buffer.get_all(),
        vec![format!("[LOG] Waiting for log file: {}", extra.display())]
    );

    assert!(supervisor.stop_project("alpha").await);
    assert_eq!(supervisor.logs().watcher_count("alpha"), 0);
    assert!(!supervisor.stop_project("alpha").await);
}

#[tokio::test]
async fn two_watchers_feed_one_buffer() {
    let supervisor = Supervisor::new(&fast_settings());
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.log");
    let second = dir.path().join("second.log");
    std::fs::write(&first, "").unwrap();
    std::fs::write(&second, "").unwrap();

    supervisor.logs().watch_file("alpha", &first);
    supervisor.logs().watch_file("alpha", &second);
    sleep(Duration::from_millis(100)).await;

    append_to(&first, "f1\nf2\n");
    append_to(&second, "s1\ns2\ns3\n");

    let buffer = supervisor.logs().get_buffer("alpha");
    wait_for_count(&buffer, 5).await;

    let lines = buffer.get_all();
    let from_first: Vec<&String> = lines.iter().filter(|l| l.starts_with('f')).collect();
    let from_second: Vec<&String> = lines.iter().filter(|l| l.starts_with('s')).collect();
    assert_eq!(from_first, vec!["f1", "f2"]);
    assert_eq!(from_second, vec!["s1", "s2", "s3"]);

    supervisor.shutdown().await;
    assert_eq!(supervisor.logs().watcher_count("alpha"), 0);

    append_to(&first, "after shutdown\n");
    sleep(Duration::from_millis(100)).await;
    assert_eq!(buffer.count(), 5);
}

#[tokio::test]
async fn subscriber_sees_history_then_each_new_line_once() {
    let supervisor = Supervisor::new(&fast_settings());
    supervisor.logs().add_line("alpha", "earlier");

    let mut subscription = supervisor.subscribe_logs("alpha");
    assert_eq!(
        subscription.history(),
        Some(LogStreamMessage::LogHistory {
            project: "alpha".to_string(),
            lines: vec!["earlier".to_string()],
        })
    );

    let dir = TempDir::new().unwrap();
    let spec = LaunchSpec::new(
        "alpha",
        ["sh", "-c", "echo one; sleep 0.1; echo two; echo three"],
        dir.path(),
    );
    assert_ok!(supervisor.launch_project(spec, &[]).await);

    let mut received = Vec::new();
    while received.len() < 3 {
        let message = timeout(Duration::from_secs(5), subscription.next())
            .await
            .expect("timed out waiting for log delta");
        assert!(matches!(message, LogStreamMessage::Log { .. }));
        received.extend(message.lines().iter().cloned());
    }
    assert_eq!(received, vec!["one", "two", "three"]);
    assert_eq!(subscription.try_next(), None);
}

#[tokio::test]
async fn events_are_broadcast() {
    let supervisor = Supervisor::new(&fast_settings());
    let mut events = supervisor.events().subscribe();
    let dir = TempDir::new().unwrap();

    let spec = LaunchSpec::new("alpha", ["sh", "-c", "echo hi; exit 2"], dir.path());
    assert_ok!(supervisor.launch_project(spec, &[]).await);

    let mut saw_output = false;
    loop {
        let event = timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for events")
            .expect("channel open");
        match event {
            ProcessEvent::Output { line, .. } => saw_output = line == "hi",
            ProcessEvent::Exited { project, exit_code } => {
                assert_eq!(project, "alpha");
                assert_eq!(exit_code, 2);
                break;
            }
        }
    }
    assert!(saw_output, "output should precede the exit event");
}
