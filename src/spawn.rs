//! Opening additional documents in new instances.
//!
//! A window shows one document at a time. When several files are opened at
//! once, the first one that loads stays in this instance and the rest are
//! handed to a freshly started instance of the program. The parent never
//! waits for or supervises that child.

use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// Environment variable naming the terminal emulator used for new instances.
pub const TERMINAL_ENV: &str = "TERMINAL";

/// Starts a new program instance for a batch of paths.
pub trait Spawner {
    /// Start an instance that opens `paths`, one argument per path.
    ///
    /// # Errors
    /// Returns an error if the process cannot be started.
    fn spawn_instance(&mut self, paths: &[PathBuf]) -> io::Result<()>;
}

/// Spawns a new process of the current executable inside a new terminal
/// window, since two full-screen instances cannot share one terminal.
#[derive(Debug, Clone, Default)]
pub struct ProcessSpawner {
    terminal: Option<String>,
}

impl ProcessSpawner {
    pub const fn new(terminal: Option<String>) -> Self {
        Self { terminal }
    }

    /// Use the terminal emulator named by `$TERMINAL`.
    pub fn from_env() -> Self {
        Self::new(std::env::var(TERMINAL_ENV).ok().filter(|t| !t.trim().is_empty()))
    }

    /// Build the command without running it.
    ///
    /// # Errors
    /// Returns an error if no terminal emulator is configured or the current
    /// executable cannot be determined.
    pub fn command(&self, paths: &[PathBuf]) -> io::Result<Command> {
        let terminal = self.terminal.as_deref().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no terminal emulator configured (set {TERMINAL_ENV})"),
            )
        })?;
        let exe = std::env::current_exe()?;
        let mut words = terminal.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty terminal command"))?;
        let mut command = Command::new(program);
        command
            .args(words)
            .arg("-e")
            .arg(exe)
            .args(paths)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        Ok(command)
    }
}

impl Spawner for ProcessSpawner {
    fn spawn_instance(&mut self, paths: &[PathBuf]) -> io::Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let child = self.command(paths)?.spawn()?;
        tracing::info!(pid = child.id(), count = paths.len(), "spawned new instance");
        reap(child);
        Ok(())
    }
}

/// Wait for `child` on a detached thread so that it does not linger as a
/// zombie once it exits. The caller never learns the exit status.
fn reap(mut child: Child) {
    let pid = child.id();
    let spawned = std::thread::Builder::new()
        .name("mdview-reaper".to_string())
        .spawn(move || match child.wait() {
            Ok(status) => tracing::debug!(pid, %status, "instance exited"),
            Err(err) => tracing::warn!(pid, error = %err, "cannot wait for instance"),
        });
    if let Err(err) = spawned {
        tracing::warn!(pid, error = %err, "cannot start reaper thread");
    }
}
