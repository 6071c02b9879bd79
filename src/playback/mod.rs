pub mod controller;
pub mod session;

pub use controller::{Engines, PlaybackController};
pub use session::PlaybackSession;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::Completion;
use crate::error::{Result, StoryError};

/// The four ways a story can be presented. Only one runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Audio rendered by the story service
    #[serde(rename = "gtts")]
    RemoteAudio,
    /// The configured third-party voice engine
    #[serde(rename = "responsive")]
    ThirdPartyVoice,
    /// The system speech synthesizer
    #[serde(rename = "browser")]
    BuiltInSpeech,
    /// Word-by-word highlighting, no audio
    #[serde(rename = "readalong")]
    ReadAlong,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::RemoteAudio,
        Strategy::ThirdPartyVoice,
        Strategy::BuiltInSpeech,
        Strategy::ReadAlong,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Strategy::RemoteAudio => "gtts",
            Strategy::ThirdPartyVoice => "responsive",
            Strategy::BuiltInSpeech => "browser",
            Strategy::ReadAlong => "readalong",
        }
    }

    /// Where a failed strategy hands over to, if anywhere.
    pub fn fallback(&self) -> Option<Strategy> {
        match self {
            Strategy::RemoteAudio | Strategy::ThirdPartyVoice => Some(Strategy::BuiltInSpeech),
            Strategy::BuiltInSpeech | Strategy::ReadAlong => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.key() == s)
            .ok_or_else(|| format!("unknown playback method '{}' (gtts, responsive, browser, readalong)", s))
    }
}

/// Terminal state of one strategy run
#[derive(Debug)]
pub enum Outcome {
    Completed,
    Errored(StoryError),
    Cancelled,
}

impl From<Result<Completion>> for Outcome {
    fn from(result: Result<Completion>) -> Self {
        match result {
            Ok(Completion::Finished) => Outcome::Completed,
            Ok(Completion::Cancelled) => Outcome::Cancelled,
            Err(e) => Outcome::Errored(e),
        }
    }
}
