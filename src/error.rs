use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoryError>;

/// Everything that can go wrong between the user, the story service and the speech engines.
///
/// None of these are fatal: callers report them through the view and return to idle.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("no story is selected")]
    NoStory,

    #[error("no story idea was given")]
    EmptyIdea,

    /// A browser-style capability (voice input, speech synthesis, ...) is missing here.
    #[error("{0} is not available on this system")]
    Unsupported(&'static str),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The service answered but reported `success: false`.
    #[error("service error: {0}")]
    Service(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("playback failed: {0}")]
    Playback(String),

    /// Voice capture or resampling failed.
    #[error("audio error: {0}")]
    Audio(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("audio encoding error: {0}")]
    Wav(#[from] hound::Error),
}
