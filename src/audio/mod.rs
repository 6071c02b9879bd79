#[cfg(feature = "microphone")]
pub mod capture;
pub mod playback;
#[cfg(feature = "microphone")]
pub mod processing;
pub mod wav;

#[cfg(feature = "microphone")]
pub use capture::AudioCapture;
pub use playback::{AudioClip, AudioOutput, CommandAudioPlayer};

use std::sync::Arc;

use crate::error::Result;

/// Mono PCM captured from the microphone
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0;
        }
        let frames = self.samples.len() as u64 / self.channels as u64;
        frames * 1000 / self.sample_rate as u64
    }
}

/// Voice input: records until stopped, then hands back what it heard.
pub trait Recorder: Send {
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<AudioBuffer>;
}

pub type RecorderFactory = Arc<dyn Fn() -> Result<Box<dyn Recorder>> + Send + Sync>;

/// The microphone recorder for this build, if voice input was compiled in.
pub fn default_recorder() -> Option<RecorderFactory> {
    #[cfg(feature = "microphone")]
    {
        Some(Arc::new(|| Ok(Box::new(AudioCapture::new()?) as Box<dyn Recorder>)))
    }
    #[cfg(not(feature = "microphone"))]
    {
        None
    }
}
