use std::path::PathBuf;
use std::str::FromStr;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::audio::Recorder;
use crate::engine::process::CommandTemplate;
use crate::playback::Strategy;
use crate::service::Story;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    Idle,
    Recording,
    Transcribing,
    Generating,
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::Idle
    }
}

pub struct AppState {
    pub settings: Mutex<Settings>,
    pub form: Mutex<StoryForm>,
    pub library: Mutex<Vec<Story>>,
    pub status: Mutex<AppStatus>,
    pub recorder: Mutex<Option<Box<dyn Recorder>>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let form = StoryForm {
            language: settings.playback.language.clone(),
            ..StoryForm::default()
        };
        Self {
            settings: Mutex::new(settings),
            form: Mutex::new(form),
            library: Mutex::new(Vec::new()),
            status: Mutex::new(AppStatus::default()),
            recorder: Mutex::new(None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Adventure,
    FairyTale,
    Educational,
    Bedtime,
    Mystery,
    Friendship,
}

impl Default for Genre {
    fn default() -> Self {
        Self::Adventure
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adventure" => Ok(Self::Adventure),
            "fairy_tale" | "fairytale" => Ok(Self::FairyTale),
            "educational" => Ok(Self::Educational),
            "bedtime" => Ok(Self::Bedtime),
            "mystery" => Ok(Self::Mystery),
            "friendship" => Ok(Self::Friendship),
            other => Err(format!("unknown genre '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryLength {
    Short,
    Medium,
    Long,
}

impl Default for StoryLength {
    fn default() -> Self {
        Self::Medium
    }
}

impl FromStr for StoryLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            other => Err(format!("unknown length '{}'", other)),
        }
    }
}

pub const LANGUAGES: &[&str] = &["en", "es", "fr", "de", "it", "pt", "hi", "zh", "ja", "ko", "ar", "ru"];
pub const MIN_AGE: u8 = 4;
pub const MAX_AGE: u8 = 12;

/// What the story creator has filled in so far. Serialized as-is for story generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryForm {
    pub voice_input: String,
    pub genre: Genre,
    pub length: StoryLength,
    pub language: String,
    pub age_group: u8,
    pub characters: String,
    pub setting: String,
    pub moral_lesson: String,
}

impl Default for StoryForm {
    fn default() -> Self {
        Self {
            voice_input: String::new(),
            genre: Genre::default(),
            length: StoryLength::default(),
            language: "en".to_string(),
            age_group: 6,
            characters: String::new(),
            setting: String::new(),
            moral_lesson: String::new(),
        }
    }
}

impl StoryForm {
    /// Empty the free-text fields; the pickers keep their choices.
    pub fn clear_free_text(&mut self) {
        self.voice_input.clear();
        self.characters.clear();
        self.setting.clear();
        self.moral_lesson.clear();
    }

    /// Set one field by its creator name, validating choice fields.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), String> {
        match field {
            "idea" | "voice_input" => self.voice_input = value.to_string(),
            "genre" => self.genre = value.parse()?,
            "length" => self.length = value.parse()?,
            "language" => {
                if !LANGUAGES.contains(&value) {
                    return Err(format!("unsupported language '{}'", value));
                }
                self.language = value.to_string();
            }
            "age" | "age_group" => {
                let age: u8 = value.parse().map_err(|_| format!("age must be a number, got '{}'", value))?;
                if !(MIN_AGE..=MAX_AGE).contains(&age) {
                    return Err(format!("age must be between {} and {}", MIN_AGE, MAX_AGE));
                }
                self.age_group = age;
            }
            "characters" => self.characters = value.to_string(),
            "setting" => self.setting = value.to_string(),
            "moral" | "moral_lesson" => self.moral_lesson = value.to_string(),
            other => return Err(format!("unknown field '{}'", other)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub playback: PlaybackSettings,
    #[serde(default)]
    pub engines: EngineSettings,
    #[serde(default)]
    pub general: GeneralSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub base_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackSettings {
    pub method: Strategy,
    pub language: String,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            method: Strategy::BuiltInSpeech,
            language: "en".to_string(),
        }
    }
}

/// External programs behind the speech strategies. `None` picks the platform default
/// (the third-party voice has none and stays unavailable until configured).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub speech: Option<CommandTemplate>,
    #[serde(default)]
    pub voice: Option<CommandTemplate>,
    #[serde(default)]
    pub audio_player: Option<CommandTemplate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralSettings {
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

impl GeneralSettings {
    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
