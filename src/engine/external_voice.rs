use async_trait::async_trait;

use super::process::{CommandTemplate, ProcessSlot};
use super::{Completion, VoiceEngine, VoiceRequest};
use crate::error::Result;

/// A third-party voice engine driven as a command-line program.
///
/// The story text is written to the program's stdin; `{voice}`, `{rate}`,
/// `{pitch}` and `{volume}` in the configured arguments are substituted.
pub struct ExternalVoice {
    template: CommandTemplate,
    slot: ProcessSlot,
}

impl ExternalVoice {
    pub fn new(template: CommandTemplate) -> Self {
        Self {
            template,
            slot: ProcessSlot::new(),
        }
    }
}

#[async_trait]
impl VoiceEngine for ExternalVoice {
    fn is_playing(&self) -> bool {
        self.slot.is_running()
    }

    fn cancel(&self) {
        self.slot.cancel();
    }

    async fn speak(&self, request: &VoiceRequest) -> Result<Completion> {
        let rate = request.rate.to_string();
        let pitch = request.pitch.to_string();
        let volume = request.volume.to_string();
        let command = self.template.build(&[
            ("voice", request.voice.as_str()),
            ("rate", rate.as_str()),
            ("pitch", pitch.as_str()),
            ("volume", volume.as_str()),
        ]);

        tracing::info!("Voice engine '{}' speaking with voice '{}'", self.template.program, request.voice);
        self.slot.run(command, Some(&request.text)).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finished_run_is_reported() {
        let engine = ExternalVoice::new(CommandTemplate::new("cat", &[]));
        let request = VoiceRequest::for_story("hello there", "en");
        let outcome = engine.speak(&request).await.unwrap();
        assert_eq!(outcome, Completion::Finished);
        assert!(!engine.is_playing());
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let engine = ExternalVoice::new(CommandTemplate::new("no-such-voice-engine", &[]));
        let request = VoiceRequest::for_story("hello", "en");
        assert!(engine.speak(&request).await.is_err());
    }
}
