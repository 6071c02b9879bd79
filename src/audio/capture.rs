use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;

use super::{AudioBuffer, Recorder};
use crate::error::{Result, StoryError};

/// Sample rate the transcription service expects.
const TARGET_SAMPLE_RATE: u32 = 16000;

/// Microphone capture through the default cpal input device.
pub struct AudioCapture {
    samples: Arc<Mutex<Vec<f32>>>,
    is_recording: Arc<AtomicBool>,
    stream: Option<cpal::Stream>,
    device_sample_rate: u32,
}

// Safety: the stream is only touched through &mut self, and the app keeps the
// recorder behind a Mutex.
unsafe impl Send for AudioCapture {}

impl AudioCapture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            samples: Arc::new(Mutex::new(Vec::new())),
            is_recording: Arc::new(AtomicBool::new(false)),
            stream: None,
            device_sample_rate: TARGET_SAMPLE_RATE,
        })
    }
}

impl Recorder for AudioCapture {
    fn start(&mut self) -> Result<()> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(StoryError::Unsupported("microphone"))?;

        let config = device
            .default_input_config()
            .map_err(|e| StoryError::PermissionDenied(e.to_string()))?;

        self.device_sample_rate = config.sample_rate().0;

        let samples = Arc::clone(&self.samples);
        let is_recording = Arc::clone(&self.is_recording);

        samples.lock().clear();
        is_recording.store(true, Ordering::SeqCst);

        let stream_config: cpal::StreamConfig = config.into();
        let channels = stream_config.channels as usize;

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if is_recording.load(Ordering::SeqCst) {
                        let mono: Vec<f32> = data.iter().step_by(channels).copied().collect();
                        samples.lock().extend_from_slice(&mono);
                    }
                },
                |err| {
                    tracing::error!("Audio capture error: {}", err);
                },
                None,
            )
            .map_err(|e| StoryError::PermissionDenied(e.to_string()))?;

        stream
            .play()
            .map_err(|e| StoryError::PermissionDenied(e.to_string()))?;
        self.stream = Some(stream);

        tracing::info!("Voice capture started (device sample rate: {}Hz)", self.device_sample_rate);
        Ok(())
    }

    fn stop(&mut self) -> Result<AudioBuffer> {
        self.is_recording.store(false, Ordering::SeqCst);
        self.stream = None;

        let raw_samples = std::mem::take(&mut *self.samples.lock());

        tracing::info!(
            "Voice capture stopped: {} samples at {}Hz",
            raw_samples.len(),
            self.device_sample_rate
        );

        let samples = super::processing::resample(&raw_samples, self.device_sample_rate, TARGET_SAMPLE_RATE)?;

        Ok(AudioBuffer {
            samples,
            sample_rate: TARGET_SAMPLE_RATE,
            channels: 1,
        })
    }
}
