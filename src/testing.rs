//! In-crate fakes for the view, service and engines.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::audio::{AudioBuffer, AudioClip, AudioOutput, Recorder};
use crate::engine::{Completion, SpeechSynthesizer, Utterance, VoiceEngine, VoiceRequest};
use crate::error::{Result, StoryError};
use crate::service::{FavoriteToggle, Story, StoryService, StoryStats};
use crate::state::StoryForm;
use crate::ui::{Affordance, Notice, NoticeLevel, Region, StoryView};

pub fn story(id: i64, content: &str, language: &str) -> Story {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": format!("Story {}", id),
        "content": content,
        "word_count": content.split_whitespace().count(),
        "estimated_duration": 120,
        "request": {"language": language},
    }))
    .expect("valid story json")
}

/// Poll `condition` until it holds, failing the test after a few seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Affordance(Affordance),
    Region(Region),
    Story(i64),
    PlainText(String),
    Words(Vec<String>),
    Highlight(usize, tokio::time::Instant),
    Favorite(bool),
    Loading(bool),
    RecordingStatus(String),
    RecordEnabled(bool),
    Library(usize),
    Stats(u64),
    Notice(Notice),
}

#[derive(Default)]
pub struct FakeView {
    pub events: Mutex<Vec<ViewEvent>>,
}

impl FakeView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().push(event);
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn last_affordance(&self) -> Option<Affordance> {
        self.events.lock().iter().rev().find_map(|e| match e {
            ViewEvent::Affordance(a) => Some(*a),
            _ => None,
        })
    }

    pub fn highlights(&self) -> Vec<(usize, tokio::time::Instant)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Highlight(i, at) => Some((*i, *at)),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self, level: NoticeLevel) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Notice(n) if n.level == level => Some(n.message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn favorites(&self) -> Vec<bool> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Favorite(f) => Some(*f),
                _ => None,
            })
            .collect()
    }
}

impl StoryView for FakeView {
    fn set_affordance(&self, affordance: Affordance) {
        self.push(ViewEvent::Affordance(affordance));
    }
    fn show_region(&self, region: Region) {
        self.push(ViewEvent::Region(region));
    }
    fn show_story(&self, story: &Story) {
        self.push(ViewEvent::Story(story.id));
    }
    fn show_plain_text(&self, text: &str) {
        self.push(ViewEvent::PlainText(text.to_string()));
    }
    fn show_words(&self, words: &[String]) {
        self.push(ViewEvent::Words(words.to_vec()));
    }
    fn highlight_word(&self, index: usize) {
        self.push(ViewEvent::Highlight(index, tokio::time::Instant::now()));
    }
    fn set_favorite(&self, favorited: bool) {
        self.push(ViewEvent::Favorite(favorited));
    }
    fn set_loading(&self, loading: bool) {
        self.push(ViewEvent::Loading(loading));
    }
    fn set_recording_status(&self, status: &str) {
        self.push(ViewEvent::RecordingStatus(status.to_string()));
    }
    fn set_record_enabled(&self, enabled: bool) {
        self.push(ViewEvent::RecordEnabled(enabled));
    }
    fn show_library(&self, stories: &[Story]) {
        self.push(ViewEvent::Library(stories.len()));
    }
    fn show_stats(&self, stats: &StoryStats) {
        self.push(ViewEvent::Stats(stats.total_stories));
    }
    fn notify(&self, notice: Notice) {
        self.push(ViewEvent::Notice(notice));
    }
}

/// How a fake engine behaves when asked to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Finish,
    Fail,
    /// Keep going until cancelled
    Hang,
}

/// A fake speech or voice engine; both traits share it.
pub struct FakeEngine {
    behavior: Mutex<Behavior>,
    busy: AtomicBool,
    cancelled: Notify,
    pub cancels: AtomicUsize,
    pub spoken: Mutex<Vec<String>>,
    pub utterances: Mutex<Vec<Utterance>>,
    pub requests: Mutex<Vec<VoiceRequest>>,
}

impl FakeEngine {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior: Mutex::new(behavior),
            busy: AtomicBool::new(false),
            cancelled: Notify::new(),
            cancels: AtomicUsize::new(0),
            spoken: Mutex::new(Vec::new()),
            utterances: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }

    fn do_cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        if self.busy.swap(false, Ordering::SeqCst) {
            self.cancelled.notify_one();
        }
    }

    async fn run(&self, text: &str) -> Result<Completion> {
        self.spoken.lock().push(text.to_string());
        let behavior = *self.behavior.lock();
        match behavior {
            Behavior::Finish => Ok(Completion::Finished),
            Behavior::Fail => Err(StoryError::Playback("engine failed".into())),
            Behavior::Hang => {
                self.busy.store(true, Ordering::SeqCst);
                self.cancelled.notified().await;
                Ok(Completion::Cancelled)
            }
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeEngine {
    fn is_speaking(&self) -> bool {
        self.is_busy()
    }
    fn cancel(&self) {
        self.do_cancel();
    }
    async fn speak(&self, utterance: &Utterance) -> Result<Completion> {
        self.utterances.lock().push(utterance.clone());
        self.run(&utterance.text).await
    }
}

#[async_trait]
impl VoiceEngine for FakeEngine {
    fn is_playing(&self) -> bool {
        self.is_busy()
    }
    fn cancel(&self) {
        self.do_cancel();
    }
    async fn speak(&self, request: &VoiceRequest) -> Result<Completion> {
        self.requests.lock().push(request.clone());
        self.run(&request.text).await
    }
}

pub struct FakeAudio {
    behavior: Behavior,
    playing: AtomicBool,
    stopped: Notify,
    pub rewinds: AtomicUsize,
    pub played: Mutex<Vec<PathBuf>>,
}

impl FakeAudio {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            playing: AtomicBool::new(false),
            stopped: Notify::new(),
            rewinds: AtomicUsize::new(0),
            played: Mutex::new(Vec::new()),
        })
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioOutput for FakeAudio {
    async fn play(&self, clip: &AudioClip) -> Result<Completion> {
        self.played.lock().push(clip.path().to_path_buf());
        match self.behavior {
            Behavior::Finish => Ok(Completion::Finished),
            Behavior::Fail => Err(StoryError::Playback("decoder error".into())),
            Behavior::Hang => {
                self.playing.store(true, Ordering::SeqCst);
                self.stopped.notified().await;
                Ok(Completion::Cancelled)
            }
        }
    }

    fn pause_and_rewind(&self) {
        self.rewinds.fetch_add(1, Ordering::SeqCst);
        if self.playing.swap(false, Ordering::SeqCst) {
            self.stopped.notify_one();
        }
    }
}

#[derive(Default)]
pub struct FakeService {
    pub calls: Mutex<Vec<String>>,
    pub next_story: Mutex<Option<Story>>,
    pub library: Mutex<Vec<Story>>,
    pub fail_render: AtomicBool,
    pub fail_generation: AtomicBool,
    pub favorite_reply: Mutex<Option<FavoriteToggle>>,
    pub gate_favorite: AtomicBool,
    pub favorite_release: Notify,
    pub transcription: Mutex<Option<String>>,
    pub uploads: Mutex<Vec<(Vec<u8>, String)>>,
}

impl FakeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().push(call.to_string());
    }
}

#[async_trait]
impl StoryService for FakeService {
    async fn transcribe(&self, wav: Vec<u8>, locale: &str) -> Result<String> {
        self.record("transcribe");
        self.uploads.lock().push((wav, locale.to_string()));
        let reply = self.transcription.lock().clone();
        reply.ok_or_else(|| StoryError::Service("Failed to process audio".into()))
    }

    async fn create_story(&self, _form: &StoryForm) -> Result<Story> {
        self.record("create_story");
        if self.fail_generation.load(Ordering::SeqCst) {
            return Err(StoryError::Service("model overloaded".into()));
        }
        let story = self.next_story.lock().clone();
        story.ok_or_else(|| StoryError::Service("no story".into()))
    }

    async fn list_stories(&self) -> Result<Vec<Story>> {
        self.record("list_stories");
        Ok(self.library.lock().clone())
    }

    async fn get_story(&self, id: i64) -> Result<Story> {
        self.record("get_story");
        let found = self.library.lock().iter().find(|s| s.id == id).cloned();
        found.ok_or_else(|| StoryError::Service("Not found.".into()))
    }

    async fn render_speech(&self, text: &str, _language: &str) -> Result<Vec<u8>> {
        self.record("render_speech");
        if self.fail_render.load(Ordering::SeqCst) {
            return Err(StoryError::Service("render failed".into()));
        }
        Ok(format!("audio:{}", text).into_bytes())
    }

    async fn download_speech(&self, text: &str, _language: &str, title: &str, dir: &Path) -> Result<PathBuf> {
        self.record("download_speech");
        let path = dir.join(crate::service::download::audio_file_name(title));
        tokio::fs::write(&path, text.as_bytes()).await?;
        Ok(path)
    }

    async fn toggle_favorite(&self, _story_id: i64) -> Result<FavoriteToggle> {
        self.record("toggle_favorite");
        if self.gate_favorite.load(Ordering::SeqCst) {
            self.favorite_release.notified().await;
        }
        let reply = self.favorite_reply.lock().clone();
        reply.ok_or_else(|| StoryError::Service("Story not found".into()))
    }

    async fn stats(&self) -> Result<StoryStats> {
        self.record("stats");
        Ok(StoryStats {
            total_stories: 3,
            total_requests: 4,
            success_rate: 75.0,
        })
    }
}

pub struct FakeRecorder {
    pub fail_start: bool,
}

impl Recorder for FakeRecorder {
    fn start(&mut self) -> Result<()> {
        if self.fail_start {
            return Err(StoryError::PermissionDenied("microphone access refused".into()));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<AudioBuffer> {
        Ok(AudioBuffer {
            samples: vec![0.0; 1600],
            sample_rate: 16_000,
            channels: 1,
        })
    }
}
