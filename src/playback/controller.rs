use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::session::{self, EngineActivity, Effect, PlaybackSession, Transition};
use super::{Outcome, Strategy};
use crate::audio::{AudioClip, AudioOutput};
use crate::capabilities::Capabilities;
use crate::engine::{Completion, SpeechSynthesizer, Utterance, VoiceEngine, VoiceRequest};
use crate::error::{Result, StoryError};
use crate::service::{Story, StoryService};
use crate::state::StoryForm;
use crate::text::clean_for_speech;
use crate::text::readalong::ReadAlong;
use crate::ui::{Affordance, Notice, Region, StoryView};

pub const NO_STORY_MESSAGE: &str = "Pick a story or create a new one first!";
pub const FAVORITE_FAILED_MESSAGE: &str = "Could not save favorite. Please try again!";

/// The engines behind the audio strategies. A missing engine makes its
/// strategy fail straight into the fallback chain.
pub struct Engines {
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub voice: Option<Arc<dyn VoiceEngine>>,
    pub audio: Option<Arc<dyn AudioOutput>>,
    /// Where rendered audio is parked while it plays
    pub clip_dir: PathBuf,
}

struct ControllerState {
    story: Option<Story>,
    session: PlaybackSession,
    highlight: Option<JoinHandle<()>>,
}

struct Shared {
    view: Arc<dyn StoryView>,
    service: Arc<dyn StoryService>,
    engines: Engines,
    capabilities: Capabilities,
    state: Mutex<ControllerState>,
}

/// Owns the current story and the one playback session, and carries out the
/// session transitions against the real engines and view.
#[derive(Clone)]
pub struct PlaybackController {
    shared: Arc<Shared>,
}

impl PlaybackController {
    pub fn new(
        view: Arc<dyn StoryView>,
        service: Arc<dyn StoryService>,
        engines: Engines,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                view,
                service,
                engines,
                capabilities,
                state: Mutex::new(ControllerState {
                    story: None,
                    session: PlaybackSession::idle(),
                    highlight: None,
                }),
            }),
        }
    }

    pub fn current_story(&self) -> Option<Story> {
        self.shared.state.lock().story.clone()
    }

    pub fn session(&self) -> PlaybackSession {
        self.shared.state.lock().session.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.shared.state.lock().session.is_active()
    }

    /// Make `story` current and show it. Whatever was playing is stopped first.
    pub fn show_story(&self, story: Story) {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        let transition = session::stop(&state.session, shared.activity());
        shared.apply(&mut state, transition);

        tracing::info!("Showing story #{} '{}'", story.id, story.title);
        shared.view.show_region(Region::StoryDisplay);
        shared.view.show_story(&story);
        shared.view.set_favorite(story.is_favorite);
        state.story = Some(story);
    }

    /// Start presenting the current story with `strategy`.
    pub fn start(&self, strategy: Strategy) -> Result<()> {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        let transition = match session::start(&state.session, strategy, state.story.as_ref(), shared.activity()) {
            Ok(transition) => transition,
            Err(e) => {
                drop(state);
                shared.view.notify(Notice::warning(NO_STORY_MESSAGE));
                return Err(e);
            }
        };
        tracing::info!("Starting playback: {}", strategy);
        shared.apply(&mut state, transition);
        Ok(())
    }

    /// Silence everything. Safe to call at any time.
    pub fn stop(&self) {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        if state.session.is_active() {
            tracing::info!("Stopping playback");
        }
        let transition = session::stop(&state.session, shared.activity());
        shared.apply(&mut state, transition);
    }

    /// Ask the service to flip the favorite flag of the current story. The
    /// glyph only changes once the service has answered.
    pub async fn toggle_favorite(&self) -> Result<bool> {
        let shared = &self.shared;
        let Some(story_id) = self.current_story().map(|story| story.id) else {
            shared.view.notify(Notice::warning(NO_STORY_MESSAGE));
            return Err(StoryError::NoStory);
        };

        match shared.service.toggle_favorite(story_id).await {
            Ok(reply) => {
                let still_current = {
                    let mut state = shared.state.lock();
                    match state.story.as_mut().filter(|story| story.id == story_id) {
                        Some(story) => {
                            story.is_favorite = reply.is_favorite;
                            true
                        }
                        None => false,
                    }
                };
                if still_current {
                    shared.view.set_favorite(reply.is_favorite);
                }
                shared.view.notify(Notice::success(reply.message));
                Ok(reply.is_favorite)
            }
            Err(e) => {
                tracing::error!("Failed to toggle favorite for story #{}: {}", story_id, e);
                shared.view.notify(Notice::error(FAVORITE_FAILED_MESSAGE));
                Err(e)
            }
        }
    }

    /// Drop the current story and go back to the creator with empty text fields.
    pub fn create_new_story(&self, form: &mut StoryForm) {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        let transition = session::stop(&state.session, shared.activity());
        shared.apply(&mut state, transition);
        state.story = None;
        drop(state);

        form.clear_free_text();
        shared.view.show_region(Region::Creator);
    }
}

impl Shared {
    fn activity(&self) -> EngineActivity {
        EngineActivity {
            voice_playing: self.engines.voice.as_ref().is_some_and(|voice| voice.is_playing()),
            speech_speaking: self.engines.speech.as_ref().is_some_and(|speech| speech.is_speaking()),
        }
    }

    fn apply(self: &Arc<Self>, state: &mut ControllerState, transition: Transition) {
        state.session = transition.session;
        for effect in transition.effects {
            match effect {
                Effect::CancelVoice => {
                    if let Some(voice) = &self.engines.voice {
                        voice.cancel();
                    }
                }
                Effect::CancelSpeech => {
                    if let Some(speech) = &self.engines.speech {
                        speech.cancel();
                    }
                }
                Effect::RewindAudio => {
                    if let Some(audio) = &self.engines.audio {
                        audio.pause_and_rewind();
                    }
                }
                Effect::CancelHighlight => {
                    if let Some(highlight) = state.highlight.take() {
                        highlight.abort();
                    }
                }
                Effect::RestoreText => {
                    if let Some(story) = &state.story {
                        self.view.show_plain_text(&story.content);
                    }
                }
                Effect::ShowAffordance(affordance) => self.view.set_affordance(affordance),
                Effect::Notify(notice) => self.view.notify(notice),
                Effect::Launch(strategy) => self.launch(state, strategy),
            }
        }
    }

    fn launch(self: &Arc<Self>, state: &mut ControllerState, strategy: Strategy) {
        let Some(story) = state.story.as_ref() else {
            return;
        };
        let generation = state.session.generation();
        let language = story.language().to_string();
        let text = if strategy == Strategy::ReadAlong {
            story.content.clone()
        } else {
            clean_for_speech(&story.content, &language)
        };

        let reader = (strategy == Strategy::ReadAlong).then(|| {
            let reader = ReadAlong::new(&text);
            self.view.show_words(reader.words());
            reader
        });

        let shared = Arc::clone(self);
        let run = tokio::spawn(async move {
            let result = match strategy {
                Strategy::RemoteAudio => shared.play_remote(generation, &text, &language).await,
                Strategy::ThirdPartyVoice => shared.speak_with_voice(generation, &text, &language).await,
                Strategy::BuiltInSpeech => shared.speak_built_in(generation, &text, &language).await,
                Strategy::ReadAlong => shared.read_along(reader.unwrap_or_else(|| ReadAlong::new(&text))).await,
            };
            shared.settle(generation, Outcome::from(result));
        });

        if strategy == Strategy::ReadAlong {
            state.highlight = Some(run);
        }
    }

    async fn play_remote(&self, generation: u64, text: &str, language: &str) -> Result<Completion> {
        let audio = match &self.engines.audio {
            Some(audio) if self.capabilities.audio_output => Arc::clone(audio),
            _ => return Err(StoryError::Unsupported("audio output")),
        };

        let bytes = self.service.render_speech(text, language).await?;
        let clip = AudioClip::store(&bytes, &self.engines.clip_dir).await?;

        let attached = {
            let mut state = self.state.lock();
            match session::attach_audio(&state.session, generation) {
                Some(next) => {
                    state.session = next;
                    true
                }
                None => false,
            }
        };
        if !attached {
            tracing::debug!("Rendered audio arrived after playback was stopped");
            clip.release().await;
            return Ok(Completion::Cancelled);
        }

        let result = audio.play(&clip).await;
        clip.release().await;
        result
    }

    /// Whether a run launched under `generation` may still make sound. Checked
    /// right before an engine starts; nothing may await between the two.
    fn still_current(&self, generation: u64) -> bool {
        let state = self.state.lock();
        state.session.is_active() && state.session.generation() == generation
    }

    async fn speak_with_voice(&self, generation: u64, text: &str, language: &str) -> Result<Completion> {
        let voice = match &self.engines.voice {
            Some(voice) if self.capabilities.third_party_voice => Arc::clone(voice),
            _ => return Err(StoryError::Unsupported("third-party voice")),
        };
        if !self.still_current(generation) {
            tracing::debug!("Voice playback #{} was stopped before it began", generation);
            return Ok(Completion::Cancelled);
        }
        voice.speak(&VoiceRequest::for_story(text, language)).await
    }

    async fn speak_built_in(&self, generation: u64, text: &str, language: &str) -> Result<Completion> {
        let speech = match &self.engines.speech {
            Some(speech) if self.capabilities.speech_synthesis => Arc::clone(speech),
            _ => return Err(StoryError::Unsupported("speech synthesis")),
        };
        if !self.still_current(generation) {
            tracing::debug!("Speech #{} was stopped before it began", generation);
            return Ok(Completion::Cancelled);
        }
        if speech.is_speaking() {
            speech.cancel();
        }
        speech.speak(&Utterance::for_story(text, language)).await
    }

    async fn read_along(&self, mut reader: ReadAlong) -> Result<Completion> {
        while let Some((index, delay)) = reader.advance() {
            self.view.highlight_word(index);
            tokio::time::sleep(delay).await;
        }
        Ok(Completion::Finished)
    }

    fn settle(self: &Arc<Self>, generation: u64, outcome: Outcome) {
        let mut state = self.state.lock();
        let strategy = state.session.strategy();
        let Some(transition) = session::settle(&state.session, generation, &outcome) else {
            tracing::debug!("Dropping outcome of stopped playback #{}: {:?}", generation, outcome);
            return;
        };

        match (&outcome, strategy) {
            (Outcome::Errored(e), Some(strategy)) => tracing::warn!("{} playback failed: {}", strategy, e),
            (Outcome::Completed, Some(strategy)) => tracing::info!("{} playback finished", strategy),
            _ => {}
        }

        self.apply(&mut state, transition);
        if !state.session.highlight_pending() {
            state.highlight = None;
        }
        if state.session.affordance() == Affordance::Play {
            tracing::debug!("Playback session #{} ended", generation);
        }
    }
}
