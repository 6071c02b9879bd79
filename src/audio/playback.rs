use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::engine::process::{CommandTemplate, ProcessSlot};
use crate::engine::Completion;
use crate::error::Result;

/// Rendered story audio parked on disk while it plays.
///
/// Call [`AudioClip::release`] once playback is over; the file is removed.
#[derive(Debug)]
pub struct AudioClip {
    path: PathBuf,
}

impl AudioClip {
    pub async fn store(bytes: &[u8], dir: &Path) -> Result<Self> {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let name = format!(
            "vocaltales-{}-{}.mp3",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn release(self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            tracing::warn!("Failed to release audio clip {}: {}", self.path.display(), e);
        }
    }
}

/// Plays rendered audio clips
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Resolves when the clip has played to the end or was stopped.
    async fn play(&self, clip: &AudioClip) -> Result<Completion>;
    /// Stop playback; the next play starts from the beginning.
    fn pause_and_rewind(&self);
}

/// Audio output through a command-line player (`afplay`, `ffplay`, ...).
pub struct CommandAudioPlayer {
    template: CommandTemplate,
    slot: ProcessSlot,
}

impl CommandAudioPlayer {
    pub fn new(template: CommandTemplate) -> Self {
        Self {
            template,
            slot: ProcessSlot::new(),
        }
    }

    pub fn default_template() -> CommandTemplate {
        if cfg!(target_os = "macos") {
            CommandTemplate::new("afplay", &["{file}"])
        } else {
            CommandTemplate::new("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet", "{file}"])
        }
    }
}

#[async_trait]
impl AudioOutput for CommandAudioPlayer {
    async fn play(&self, clip: &AudioClip) -> Result<Completion> {
        let file = clip.path().to_string_lossy().to_string();
        let command = self.template.build(&[("file", file.as_str())]);
        tracing::info!("Playing story audio: {}", file);
        self.slot.run(command, None).await
    }

    fn pause_and_rewind(&self) {
        self.slot.cancel();
    }
}
