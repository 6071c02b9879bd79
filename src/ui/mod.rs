pub mod terminal;

pub use terminal::TerminalView;

use crate::service::{Story, StoryStats};

/// Which of the play/pause controls is showing. Exactly one always is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Play,
    Pause,
}

/// The two screens of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Creator,
    StoryDisplay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Everything the controller and commands can show. Implementations render
/// synchronously and never fail.
pub trait StoryView: Send + Sync {
    fn set_affordance(&self, affordance: Affordance);
    fn show_region(&self, region: Region);
    fn show_story(&self, story: &Story);
    /// Put the plain story text back in the text region.
    fn show_plain_text(&self, text: &str);
    /// Replace the text region with individually addressable words.
    fn show_words(&self, words: &[String]);
    /// Highlight one word (clearing the previous one) and scroll it into view.
    fn highlight_word(&self, index: usize);
    fn set_favorite(&self, favorited: bool);
    fn set_loading(&self, loading: bool);
    fn set_recording_status(&self, status: &str);
    fn set_record_enabled(&self, enabled: bool);
    fn show_library(&self, stories: &[Story]);
    fn show_stats(&self, stats: &StoryStats);
    fn notify(&self, notice: Notice);
}

/// Heart shown on the favorite button.
pub fn favorite_glyph(favorited: bool) -> &'static str {
    if favorited {
        "\u{2764}\u{fe0f}"
    } else {
        "\u{1f90d}"
    }
}
