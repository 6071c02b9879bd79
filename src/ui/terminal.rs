use std::io::Write;

use parking_lot::Mutex;

use super::{favorite_glyph, Affordance, Notice, NoticeLevel, Region, StoryView};
use crate::service::{Story, StoryStats};

/// Words shown on each side of the highlighted one during read-along.
const READ_ALONG_CONTEXT: usize = 4;

/// Renders the app as lines on stdout.
#[derive(Default)]
pub struct TerminalView {
    words: Mutex<Vec<String>>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }
}

/// The words around `index`, with the current word in brackets.
pub(crate) fn read_along_window(words: &[String], index: usize) -> String {
    if index >= words.len() {
        return String::new();
    }
    let start = index.saturating_sub(READ_ALONG_CONTEXT);
    let end = (index + READ_ALONG_CONTEXT + 1).min(words.len());
    words[start..end]
        .iter()
        .enumerate()
        .map(|(offset, word)| {
            if start + offset == index {
                format!("[{}]", word)
            } else {
                word.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn library_card(story: &Story) -> String {
    let excerpt = story.excerpt();
    let ellipsis = if excerpt.chars().count() < story.content.chars().count() {
        "..."
    } else {
        ""
    };
    format!(
        "#{} {} {}\n    {}{}\n    {} words, {} min",
        story.id,
        story.title,
        favorite_glyph(story.is_favorite),
        excerpt,
        ellipsis,
        story.word_count,
        story.duration_minutes()
    )
}

impl StoryView for TerminalView {
    fn set_affordance(&self, affordance: Affordance) {
        let label = match affordance {
            Affordance::Play => "[play]",
            Affordance::Pause => "[pause]",
        };
        self.line(label);
    }

    fn show_region(&self, region: Region) {
        if region == Region::Creator {
            self.line("-- New story: record or type your idea, then `generate` --");
        }
    }

    fn show_story(&self, story: &Story) {
        self.line(&format!("\n== {} ==", story.title));
        self.line(&format!(
            "{} min | {} words | {}",
            story.duration_minutes(),
            story.word_count,
            favorite_glyph(story.is_favorite)
        ));
        self.line(&story.content);
    }

    fn show_plain_text(&self, text: &str) {
        self.words.lock().clear();
        self.line(text);
    }

    fn show_words(&self, words: &[String]) {
        *self.words.lock() = words.to_vec();
    }

    fn highlight_word(&self, index: usize) {
        let window = read_along_window(&self.words.lock(), index);
        if !window.is_empty() {
            self.line(&window);
        }
    }

    fn set_favorite(&self, favorited: bool) {
        let label = if favorited { "Favorited" } else { "Add to favorites" };
        self.line(&format!("{} {}", favorite_glyph(favorited), label));
    }

    fn set_loading(&self, loading: bool) {
        if loading {
            self.line("Creating your magical story...");
        }
    }

    fn set_recording_status(&self, status: &str) {
        self.line(&format!("(mic) {}", status));
    }

    fn set_record_enabled(&self, enabled: bool) {
        if !enabled {
            self.line("(mic) Voice input is not available here; type your idea with `idea <text>`");
        }
    }

    fn show_library(&self, stories: &[Story]) {
        if stories.is_empty() {
            self.line("No stories yet! Create your first magical story above.");
            return;
        }
        for story in stories {
            self.line(&library_card(story));
        }
    }

    fn show_stats(&self, stats: &StoryStats) {
        self.line(&format!(
            "{} stories from {} requests ({:.1}% success)",
            stats.total_stories, stats.total_requests, stats.success_rate
        ));
    }

    fn notify(&self, notice: Notice) {
        let prefix = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "!",
            NoticeLevel::Error => "error",
        };
        let line = format!("{}: {}", prefix, notice.message);
        if notice.level == NoticeLevel::Error {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{}", line);
        } else {
            self.line(&line);
        }
    }
}
