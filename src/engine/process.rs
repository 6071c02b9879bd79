use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::oneshot;

use super::Completion;
use crate::error::{Result, StoryError};

/// An external program plus its arguments. `{placeholder}` arguments are
/// filled in per run by [`CommandTemplate::build`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandTemplate {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn render_args(&self, values: &[(&str, &str)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                values.iter().fold(arg.clone(), |acc, (key, value)| {
                    acc.replace(&format!("{{{}}}", key), value)
                })
            })
            .collect()
    }

    pub fn build(&self, values: &[(&str, &str)]) -> Command {
        let mut command = Command::new(&self.program);
        command.args(self.render_args(values));
        command
    }
}

/// Holds the one child process an engine may have running and lets another
/// caller stop it while `run` is awaiting it.
#[derive(Default)]
pub struct ProcessSlot {
    current: Mutex<Option<(u64, oneshot::Sender<()>)>>,
    next_id: AtomicU64,
}

impl ProcessSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.current.lock().is_some()
    }

    pub fn cancel(&self) {
        if let Some((id, stop)) = self.current.lock().take() {
            tracing::debug!("Cancelling engine process #{}", id);
            let _ = stop.send(());
        }
    }

    /// Spawn `command`, optionally feeding `input` on stdin, and wait for it
    /// to exit or be cancelled. A non-zero exit is a playback error.
    pub async fn run(&self, mut command: Command, input: Option<&str>) -> Result<Completion> {
        command
            .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = command.spawn()?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (stop_tx, stop_rx) = oneshot::channel();
        if let Some((_, previous)) = self.current.lock().replace((id, stop_tx)) {
            let _ = previous.send(());
        }

        if let (Some(text), Some(mut stdin)) = (input, child.stdin.take()) {
            if let Err(e) = stdin.write_all(text.as_bytes()).await {
                tracing::warn!("Failed to write text to engine process: {}", e);
            }
            drop(stdin);
        }

        let outcome = tokio::select! {
            status = child.wait() => match status {
                Ok(status) if status.success() => Ok(Completion::Finished),
                Ok(status) => Err(StoryError::Playback(format!("engine exited with {}", status))),
                Err(e) => Err(StoryError::Io(e)),
            },
            _ = stop_rx => {
                if let Err(e) = child.kill().await {
                    tracing::warn!("Failed to kill engine process: {}", e);
                }
                Ok(Completion::Cancelled)
            }
        };

        let mut current = self.current.lock();
        if matches!(current.as_ref(), Some((running, _)) if *running == id) {
            *current = None;
        }

        outcome
    }
}

/// Look for `program` on `PATH` (or accept it directly if it is a path).
pub fn find_program(program: &str) -> Option<std::path::PathBuf> {
    let direct = std::path::Path::new(program);
    if direct.components().count() > 1 {
        return direct.is_file().then(|| direct.to_path_buf());
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
