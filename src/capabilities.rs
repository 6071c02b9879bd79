//! Runtime capability detection.
//!
//! The controller never checks for programs or devices itself; it receives a
//! [`Capabilities`] snapshot from a [`CapabilityProbe`] at startup. Tests pass
//! a hand-built snapshot to simulate machines without speech or voice input.

use crate::engine::process::{find_program, CommandTemplate};

/// What this machine can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Microphone capture for story ideas
    pub voice_input: bool,
    /// A built-in speech synthesizer
    pub speech_synthesis: bool,
    /// A configured third-party voice engine
    pub third_party_voice: bool,
    /// A player for service-rendered audio
    pub audio_output: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            voice_input: true,
            speech_synthesis: true,
            third_party_voice: true,
            audio_output: true,
        }
    }

    pub fn none() -> Self {
        Self {
            voice_input: false,
            speech_synthesis: false,
            third_party_voice: false,
            audio_output: false,
        }
    }

    /// Names of the missing capabilities, for startup warnings.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.voice_input {
            missing.push("voice input");
        }
        if !self.speech_synthesis {
            missing.push("speech synthesis");
        }
        if !self.third_party_voice {
            missing.push("third-party voice");
        }
        if !self.audio_output {
            missing.push("audio output");
        }
        missing
    }
}

pub trait CapabilityProbe: Send + Sync {
    fn probe(&self) -> Capabilities;
}

impl CapabilityProbe for Capabilities {
    fn probe(&self) -> Capabilities {
        *self
    }
}

/// Probes the host for the engine programs it was configured with.
pub struct SystemProbe {
    pub speech: CommandTemplate,
    pub voice: Option<CommandTemplate>,
    pub audio_player: CommandTemplate,
    pub microphone: bool,
}

impl CapabilityProbe for SystemProbe {
    fn probe(&self) -> Capabilities {
        let caps = Capabilities {
            voice_input: self.microphone,
            speech_synthesis: find_program(&self.speech.program).is_some(),
            third_party_voice: self
                .voice
                .as_ref()
                .is_some_and(|voice| find_program(&voice.program).is_some()),
            audio_output: find_program(&self.audio_player.program).is_some(),
        };
        tracing::debug!("Probed capabilities: {:?}", caps);
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_probes_as_itself() {
        let caps = Capabilities {
            speech_synthesis: false,
            ..Capabilities::all()
        };
        assert_eq!(caps.probe(), caps);
        assert_eq!(caps.missing(), vec!["speech synthesis"]);
    }

    #[test]
    fn unconfigured_voice_is_unavailable() {
        let probe = SystemProbe {
            speech: CommandTemplate::new("no-such-speech-program", &[]),
            voice: None,
            audio_player: CommandTemplate::new("no-such-player", &[]),
            microphone: false,
        };
        assert_eq!(probe.probe(), Capabilities::none());
    }
}
