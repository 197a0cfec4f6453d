use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::sync::Mutex;
use std::time::Duration;
use upswatch::core::config::AppConfig;
use upswatch::core::status::UpsStatus;
use upswatch::infrastructure::upsc::{StatusSource, UpscStatusSource};
use upswatch::services::notifier::Notifier;
use upswatch::services::watcher::WatchLoop;

struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    fn bodies(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, _subject: &str, body: &str) -> Result<()> {
        self.sent.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

#[test]
fn test_recipient_without_sender_halts_before_polling() {
    let dir = tempfile::tempdir().unwrap();
    let conf = dir.path().join("upswatch.conf");
    fs::write(
        &conf,
        "[ups]\nname = \"office\"\n\n[email]\nto = \"ops@example.com\"\n",
    )
    .unwrap();

    let result = AppConfig::load(&conf, None);
    assert!(result.is_err());
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let conf = dir.path().join("upswatch.conf");
    fs::write(
        &conf,
        r#"
[ups]
name = "office"
poll_interval = 5

[email]
to = "ops@example.com"
from = "ups@example.com"
server = "mail.example.com"
port = 587
tls = true
"#,
    )
    .unwrap();

    let config = AppConfig::load(&conf, None).unwrap();
    assert_eq!(config.ups.name, "office");
    assert_eq!(config.ups.poll_interval, Duration::from_secs(5));
    let email = config.email.unwrap();
    assert_eq!(email.server, "mail.example.com");
    assert_eq!(email.port, 587);
    assert!(email.tls);
}

/// Drives the real subprocess reader against a fake upsc that walks through
/// OL, OL, OB, then keeps answering LB, and checks the loop reports each
/// transition exactly once.
#[cfg(unix)]
#[tokio::test]
async fn test_end_to_end_transitions_with_fake_upsc() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("calls");
    let script = dir.path().join("fake-upsc");
    fs::write(
        &script,
        format!(
            r#"#!/bin/sh
state="{}"
n=$(cat "$state" 2>/dev/null || echo 0)
echo $((n + 1)) > "$state"
case $n in
  0|1) echo "OL" ;;
  2) echo "OB" ;;
  *) echo "LB" ;;
esac
"#,
            state.display()
        ),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let conf = dir.path().join("upswatch.conf");
    fs::write(
        &conf,
        format!("[ups]\nname = \"office\"\ncommand = \"{}\"\n", script.display()),
    )
    .unwrap();

    let config = AppConfig::load(&conf, None).unwrap();
    assert!(config.email.is_none());

    let source = UpscStatusSource::new(config.ups.command.clone(), config.ups.timeout);
    let mut watcher = WatchLoop::new(config.ups, source, Some(RecordingNotifier::new()));

    for _ in 0..5 {
        watcher.poll_once().await;
    }

    assert_eq!(watcher.last(), &UpsStatus::from_raw("LB"));
}

/// Same fake tool, observed through an injected notifier: one notification per
/// transition, none for repeats.
#[cfg(unix)]
#[tokio::test]
async fn test_fake_upsc_notification_bodies() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("calls");
    let script = dir.path().join("fake-upsc");
    fs::write(
        &script,
        format!(
            r#"#!/bin/sh
state="{}"
n=$(cat "$state" 2>/dev/null || echo 0)
echo $((n + 1)) > "$state"
if [ "$n" -lt 2 ]; then echo "OL"; else echo "OB"; fi
"#,
            state.display()
        ),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let config = AppConfig::load(dir.path().join("missing.conf").as_path(), Some("office".into()))
        .unwrap();
    let source = UpscStatusSource::new(
        script.to_str().unwrap().to_string(),
        config.ups.timeout,
    );

    let mut watcher = WatchLoop::new(config.ups, source, Some(RecordingNotifier::new()));
    for _ in 0..4 {
        watcher.poll_once().await;
    }

    let bodies = notifier_bodies(&watcher);
    assert_eq!(bodies.len(), 2);
    assert!(bodies[0].contains("from NONE to OL"));
    assert!(bodies[1].contains("from OL to OB"));
}

#[cfg(unix)]
fn notifier_bodies<S: StatusSource>(watcher: &WatchLoop<S, RecordingNotifier>) -> Vec<String> {
    watcher.notifier().expect("notifier configured").bodies()
}
