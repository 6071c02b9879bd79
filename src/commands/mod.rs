pub mod story;
pub mod stt;
pub mod tts;
