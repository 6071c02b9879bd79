//! Playback session state and its transitions.
//!
//! The session is a plain value. Every transition takes the current session
//! and returns the next one plus the effects the controller has to carry out,
//! so the whole state machine can be exercised without engines or a view.
//!
//! Each started session gets a new generation number. Engine runs report back
//! with the generation they were launched under; reports for an older
//! generation belong to a torn-down session and are dropped.

use super::{Outcome, Strategy};
use crate::error::{Result, StoryError};
use crate::service::Story;
use crate::ui::{Affordance, Notice};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSession {
    generation: u64,
    active: Option<Strategy>,
    language: String,
    audio_attached: bool,
    highlight_pending: bool,
}

impl PlaybackSession {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn strategy(&self) -> Option<Strategy> {
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn has_audio(&self) -> bool {
        self.audio_attached
    }

    pub fn highlight_pending(&self) -> bool {
        self.highlight_pending
    }

    /// The control that should be showing for this session.
    pub fn affordance(&self) -> Affordance {
        if self.is_active() {
            Affordance::Pause
        } else {
            Affordance::Play
        }
    }

    fn ended(&self) -> Self {
        Self {
            generation: self.generation,
            ..Self::default()
        }
    }
}

/// What the engines report about themselves right before a teardown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineActivity {
    pub voice_playing: bool,
    pub speech_speaking: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CancelVoice,
    CancelSpeech,
    RewindAudio,
    CancelHighlight,
    /// Swap the per-word markup back for the plain story text.
    RestoreText,
    ShowAffordance(Affordance),
    Notify(Notice),
    /// Begin running a strategy under the session's generation.
    Launch(Strategy),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: PlaybackSession,
    pub effects: Vec<Effect>,
}

fn teardown(session: &PlaybackSession, activity: EngineActivity) -> Vec<Effect> {
    let mut effects = Vec::new();
    if activity.voice_playing {
        effects.push(Effect::CancelVoice);
    }
    if activity.speech_speaking {
        effects.push(Effect::CancelSpeech);
    }
    if session.audio_attached {
        effects.push(Effect::RewindAudio);
    }
    if session.highlight_pending {
        effects.push(Effect::CancelHighlight);
        effects.push(Effect::RestoreText);
    }
    effects
}

/// Silence everything and return to idle. Safe to apply to an idle session.
pub fn stop(session: &PlaybackSession, activity: EngineActivity) -> Transition {
    let mut effects = teardown(session, activity);
    effects.push(Effect::ShowAffordance(Affordance::Play));
    Transition {
        session: PlaybackSession {
            generation: session.generation + 1,
            ..PlaybackSession::default()
        },
        effects,
    }
}

/// Tear down whatever is running and start `strategy` for `story`.
pub fn start(
    session: &PlaybackSession,
    strategy: Strategy,
    story: Option<&Story>,
    activity: EngineActivity,
) -> Result<Transition> {
    let story = story.ok_or(StoryError::NoStory)?;

    let mut effects = teardown(session, activity);
    effects.push(Effect::ShowAffordance(Affordance::Pause));
    effects.push(Effect::Launch(strategy));

    Ok(Transition {
        session: PlaybackSession {
            generation: session.generation + 1,
            active: Some(strategy),
            language: story.language().to_string(),
            audio_attached: false,
            highlight_pending: strategy == Strategy::ReadAlong,
        },
        effects,
    })
}

/// Remote audio for `generation` is now loaded and playing.
pub fn attach_audio(session: &PlaybackSession, generation: u64) -> Option<PlaybackSession> {
    if session.generation != generation || session.active != Some(Strategy::RemoteAudio) {
        return None;
    }
    Some(PlaybackSession {
        audio_attached: true,
        ..session.clone()
    })
}

pub fn language_pack_message(language: &str) -> String {
    format!(
        "Could not play story audio. Try installing language pack for {}",
        language.to_uppercase()
    )
}

pub const REMOTE_FALLBACK_MESSAGE: &str = "Online voice failed. Trying the built-in voice...";

/// Apply the outcome of a strategy run. `None` when the run belongs to a
/// session that has already been torn down.
pub fn settle(session: &PlaybackSession, generation: u64, outcome: &Outcome) -> Option<Transition> {
    if session.generation != generation {
        return None;
    }
    let strategy = session.active?;

    let transition = match outcome {
        Outcome::Completed | Outcome::Cancelled => Transition {
            session: session.ended(),
            effects: vec![Effect::ShowAffordance(Affordance::Play)],
        },
        Outcome::Errored(_) => match strategy.fallback() {
            Some(next) => {
                let mut effects = Vec::new();
                if strategy == Strategy::RemoteAudio {
                    effects.push(Effect::Notify(Notice::warning(REMOTE_FALLBACK_MESSAGE)));
                }
                effects.push(Effect::Launch(next));
                Transition {
                    session: PlaybackSession {
                        active: Some(next),
                        audio_attached: false,
                        highlight_pending: false,
                        ..session.clone()
                    },
                    effects,
                }
            }
            None => Transition {
                session: session.ended(),
                effects: vec![
                    Effect::ShowAffordance(Affordance::Play),
                    Effect::Notify(Notice::error(language_pack_message(&session.language))),
                ],
            },
        },
    };
    Some(transition)
}
