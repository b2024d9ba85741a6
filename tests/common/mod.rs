//! Daemon process management for integration tests.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;
use tempfile::TempDir;

/// A running `livewatchd` with its own scratch directory.
pub struct TestDaemon {
    child: Child,
    dir: TempDir,
}

impl TestDaemon {
    /// Write `config` to a fresh directory and start the daemon on it.
    ///
    /// `{dir}` in the config is replaced with the scratch directory path.
    pub fn spawn(config: &str) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let config_path = write_config(dir.path(), config)?;

        let child = Command::new(env!("CARGO_BIN_EXE_livewatchd"))
            .arg(&config_path)
            .env("RUST_LOG", "livewatch=debug")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(Self { child, dir })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Wait up to `timeout` for the process to exit on its own.
    pub async fn wait_exit(&mut self, timeout: Duration) -> Option<ExitStatus> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if let Ok(Some(status)) = self.child.try_wait() {
                return Some(status);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        None
    }
}

impl Drop for TestDaemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn write_config(dir: &Path, config: &str) -> anyhow::Result<PathBuf> {
    let path = dir.join("livewatch.toml");
    let body = config.replace("{dir}", &dir.display().to_string());
    std::fs::write(&path, body)?;
    Ok(path)
}

/// Grab a free local port.
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .unwrap_or(19090)
}
