pub mod api;
pub mod csrf;
pub mod download;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::StoryForm;

pub use api::ApiClient;

/// What the story was generated from, as echoed back by the service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryRequestInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub age_group: Option<u8>,
    #[serde(default)]
    pub voice_input: Option<String>,
}

/// A generated story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub word_count: u32,
    /// Seconds, at the service's reading-speed estimate
    #[serde(default)]
    pub estimated_duration: u32,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ai_model_used: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub request: Option<StoryRequestInfo>,
}

/// Library cards show this many characters of the story.
pub const EXCERPT_CHARS: usize = 150;

impl Story {
    /// Language code of the story; English when the service did not say.
    pub fn language(&self) -> &str {
        self.request
            .as_ref()
            .and_then(|r| r.language.as_deref())
            .filter(|l| !l.is_empty())
            .unwrap_or("en")
    }

    pub fn duration_minutes(&self) -> u32 {
        self.estimated_duration.div_ceil(60)
    }

    pub fn excerpt(&self) -> String {
        self.content.chars().take(EXCERPT_CHARS).collect()
    }
}

/// Result of a favorite toggle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteToggle {
    pub is_favorite: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryStats {
    pub total_stories: u64,
    pub total_requests: u64,
    pub success_rate: f64,
}

/// The VocalTales backend, as seen by the app
#[async_trait]
pub trait StoryService: Send + Sync {
    /// Upload a WAV recording and get the words back.
    async fn transcribe(&self, wav: Vec<u8>, locale: &str) -> Result<String>;
    async fn create_story(&self, form: &StoryForm) -> Result<Story>;
    async fn list_stories(&self) -> Result<Vec<Story>>;
    async fn get_story(&self, id: i64) -> Result<Story>;
    /// Render story text to audio on the server.
    async fn render_speech(&self, text: &str, language: &str) -> Result<Vec<u8>>;
    /// Render story text to a downloadable file `{title}.mp3` inside `dir`.
    async fn download_speech(&self, text: &str, language: &str, title: &str, dir: &Path) -> Result<PathBuf>;
    async fn toggle_favorite(&self, story_id: i64) -> Result<FavoriteToggle>;
    async fn stats(&self) -> Result<StoryStats>;
}
