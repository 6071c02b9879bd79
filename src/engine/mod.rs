pub mod external_voice;
pub mod process;
pub mod system_speech;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How a speech or audio run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Finished,
    Cancelled,
}

/// Locale handed to speech engines and voice input for a story language.
pub fn speech_locale(language: &str) -> &'static str {
    match language {
        "hi" => "hi-IN",
        "es" => "es-ES",
        "fr" => "fr-FR",
        "de" => "de-DE",
        "it" => "it-IT",
        "pt" => "pt-PT",
        "zh" => "zh-CN",
        "ja" => "ja-JP",
        "ko" => "ko-KR",
        "ar" => "ar-SA",
        "ru" => "ru-RU",
        _ => "en-US",
    }
}

pub const DEFAULT_VOICE: &str = "US English Female";

/// Voice name for the third-party voice engine.
pub fn voice_name(language: &str) -> &'static str {
    match language {
        "hi" => "Hindi Female",
        "en" => "US English Female",
        "es" => "Spanish Female",
        "fr" => "French Female",
        "de" => "Deutsch Female",
        "it" => "Italian Female",
        "pt" => "Portuguese Female",
        "zh" => "Chinese Female",
        "ja" => "Japanese Female",
        "ko" => "Korean Female",
        "ar" => "Arabic Female",
        "ru" => "Russian Female",
        _ => DEFAULT_VOICE,
    }
}

/// One request to the built-in speech synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub locale: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Utterance {
    /// Story narration settings: slowed down for young listeners.
    pub fn for_story(text: impl Into<String>, language: &str) -> Self {
        Self {
            text: text.into(),
            locale: speech_locale(language).to_string(),
            rate: 0.7,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// One request to the third-party voice engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceRequest {
    pub text: String,
    pub voice: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl VoiceRequest {
    pub fn for_story(text: impl Into<String>, language: &str) -> Self {
        Self {
            text: text.into(),
            voice: voice_name(language).to_string(),
            rate: 0.8,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// Built-in speech synthesis: text -> spoken audio on this machine
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn is_speaking(&self) -> bool;
    fn cancel(&self);
    /// Resolves once the utterance has been spoken or cancelled.
    async fn speak(&self, utterance: &Utterance) -> Result<Completion>;
}

/// An external voice engine with its own named voices
#[async_trait]
pub trait VoiceEngine: Send + Sync {
    fn is_playing(&self) -> bool;
    fn cancel(&self);
    async fn speak(&self, request: &VoiceRequest) -> Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_languages_fall_back_to_english() {
        assert_eq!(speech_locale("sw"), "en-US");
        assert_eq!(voice_name("sw"), DEFAULT_VOICE);
        assert_eq!(speech_locale("hi"), "hi-IN");
        assert_eq!(voice_name("de"), "Deutsch Female");
    }

    #[test]
    fn story_utterance_uses_fixed_prosody() {
        let u = Utterance::for_story("hello", "ja");
        assert_eq!(u.locale, "ja-JP");
        assert_eq!(u.rate, 0.7);
        assert_eq!(u.pitch, 1.0);
        assert_eq!(u.volume, 1.0);
    }
}
