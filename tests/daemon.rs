//! End-to-end checks against the `livewatchd` binary.

mod common;

use common::{TestDaemon, free_port};
use std::time::Duration;

#[tokio::test]
async fn rejects_invalid_config() {
    let mut daemon = TestDaemon::spawn(
        r#"
[poll]
interval_secs = 0
platforms = []
"#,
    )
    .unwrap();

    let status = daemon
        .wait_exit(Duration::from_secs(10))
        .await
        .expect("daemon should exit on invalid config");
    assert!(!status.success());
}

#[tokio::test]
async fn rejects_discord_sink_without_token() {
    if std::env::var("LIVEWATCH_DISCORD_TOKEN").is_ok() {
        return;
    }
    let mut daemon = TestDaemon::spawn(
        r#"
[delivery]
kind = "discord"
"#,
    )
    .unwrap();

    let status = daemon.wait_exit(Duration::from_secs(10)).await.unwrap();
    assert!(!status.success());
}

#[tokio::test]
async fn serves_metrics_and_creates_database() {
    let port = free_port();
    let daemon = TestDaemon::spawn(&format!(
        r#"
[database]
path = "{{dir}}/livewatch.db"

[poll]
interval_secs = 1

[metrics]
port = {port}
"#
    ))
    .unwrap();

    let url = format!("http://127.0.0.1:{port}/metrics");
    let client = reqwest::Client::new();
    let mut body = String::new();
    for _ in 0..100 {
        if let Ok(resp) = client.get(&url).send().await
            && let Ok(text) = resp.text().await
            && text.contains("livewatch_poll_cycles_total")
        {
            body = text;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    assert!(body.contains("livewatch_poll_cycles_total"));
    assert!(daemon.dir().join("livewatch.db").exists());
}
