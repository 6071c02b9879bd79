use crate::app::App;
use crate::audio::wav::encode_wav;
use crate::engine::speech_locale;
use crate::error::{Result, StoryError};
use crate::state::AppStatus;
use crate::ui::Notice;

pub const VOICE_UNSUPPORTED_MESSAGE: &str =
    "Voice recognition is not supported on this system. Please type your story idea instead.";
pub const MICROPHONE_DENIED_MESSAGE: &str = "Could not access microphone. Please check permissions.";
pub const LISTENING_STATUS: &str = "Listening to your story idea...";
pub const PROCESSING_STATUS: &str = "Processing your voice...";
pub const PROCESSED_STATUS: &str = "Voice processed successfully!";
pub const PROCESS_FAILED_STATUS: &str = "Could not process audio. Please try typing instead.";

/// Start recording, or stop and transcribe if a recording is running.
/// Returns the transcription when one was produced.
pub async fn toggle_recording(app: &App) -> Result<Option<String>> {
    let recording = *app.state.status.lock() == AppStatus::Recording;
    if recording {
        stop_recording(app).await.map(Some)
    } else {
        start_recording(app).map(|()| None)
    }
}

pub fn start_recording(app: &App) -> Result<()> {
    let factory = match &app.recorder {
        Some(factory) if app.capabilities.voice_input => factory.clone(),
        _ => {
            app.view.notify(Notice::error(VOICE_UNSUPPORTED_MESSAGE));
            return Err(StoryError::Unsupported("voice input"));
        }
    };

    let mut status = app.state.status.lock();
    if *status != AppStatus::Idle {
        return Err(StoryError::Audio(format!(
            "cannot start recording: app is not idle (current: {:?})",
            *status
        )));
    }

    let started = factory().and_then(|mut recorder| {
        recorder.start()?;
        Ok(recorder)
    });
    let recorder = match started {
        Ok(recorder) => recorder,
        Err(e) => {
            tracing::error!("Error starting recording: {}", e);
            app.view.notify(Notice::error(MICROPHONE_DENIED_MESSAGE));
            return Err(e);
        }
    };

    *app.state.recorder.lock() = Some(recorder);
    *status = AppStatus::Recording;
    app.view.set_recording_status(LISTENING_STATUS);

    tracing::info!("Recording started");
    Ok(())
}

pub async fn stop_recording(app: &App) -> Result<String> {
    let captured = {
        let mut guard = app.state.recorder.lock();
        let mut recorder = guard
            .take()
            .ok_or_else(|| StoryError::Audio("No active recording".into()))?;
        recorder.stop()
    };

    *app.state.status.lock() = AppStatus::Transcribing;
    app.view.set_recording_status(PROCESSING_STATUS);

    let locale = speech_locale(&app.state.form.lock().language);
    let result = async move {
        let buffer = captured?;
        tracing::info!("Captured {}ms of audio", buffer.duration_ms());
        let wav = encode_wav(&buffer)?;
        app.service.transcribe(wav, locale).await
    }
    .await;

    *app.state.status.lock() = AppStatus::Idle;

    match result {
        Ok(text) => {
            tracing::info!("Transcription complete: '{}'", text);
            app.state.form.lock().voice_input = text.clone();
            app.view.set_recording_status(PROCESSED_STATUS);
            Ok(text)
        }
        Err(e) => {
            tracing::error!("Error processing audio: {}", e);
            app.view.set_recording_status(PROCESS_FAILED_STATUS);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::test_app;
    use crate::capabilities::Capabilities;
    use crate::testing::ViewEvent;
    use crate::ui::NoticeLevel;

    #[tokio::test]
    async fn unsupported_voice_input_is_reported() {
        let caps = Capabilities {
            voice_input: false,
            ..Capabilities::all()
        };
        let t = test_app(caps, false);
        let err = toggle_recording(&t.app).await.unwrap_err();
        assert!(matches!(err, StoryError::Unsupported(_)));
        assert_eq!(t.view.notices(NoticeLevel::Error), vec![VOICE_UNSUPPORTED_MESSAGE]);
        assert_eq!(*t.app.state.status.lock(), AppStatus::Idle);
    }

    #[tokio::test]
    async fn refused_microphone_is_reported() {
        let t = test_app(Capabilities::all(), true);
        let err = toggle_recording(&t.app).await.unwrap_err();
        assert!(matches!(err, StoryError::PermissionDenied(_)));
        assert_eq!(t.view.notices(NoticeLevel::Error), vec![MICROPHONE_DENIED_MESSAGE]);
        assert_eq!(*t.app.state.status.lock(), AppStatus::Idle);
    }

    #[tokio::test]
    async fn second_toggle_transcribes_into_the_form() {
        let t = test_app(Capabilities::all(), false);
        *t.service.transcription.lock() = Some("a dragon who loves tea".into());
        t.app.state.form.lock().language = "es".into();

        assert_eq!(toggle_recording(&t.app).await.unwrap(), None);
        assert_eq!(*t.app.state.status.lock(), AppStatus::Recording);

        let text = toggle_recording(&t.app).await.unwrap();
        assert_eq!(text.as_deref(), Some("a dragon who loves tea"));
        assert_eq!(t.app.state.form.lock().voice_input, "a dragon who loves tea");
        assert_eq!(*t.app.state.status.lock(), AppStatus::Idle);

        let uploads = t.service.uploads.lock();
        assert_eq!(uploads[0].1, "es-ES");
        assert_eq!(&uploads[0].0[..4], b"RIFF");

        let statuses: Vec<ViewEvent> = t
            .view
            .events()
            .into_iter()
            .filter(|e| matches!(e, ViewEvent::RecordingStatus(_)))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ViewEvent::RecordingStatus(LISTENING_STATUS.into()),
                ViewEvent::RecordingStatus(PROCESSING_STATUS.into()),
                ViewEvent::RecordingStatus(PROCESSED_STATUS.into()),
            ]
        );
    }

    #[tokio::test]
    async fn failed_transcription_keeps_the_typed_idea() {
        let t = test_app(Capabilities::all(), false);
        t.app.state.form.lock().voice_input = "typed idea".into();

        toggle_recording(&t.app).await.unwrap();
        assert!(toggle_recording(&t.app).await.is_err());
        assert_eq!(t.app.state.form.lock().voice_input, "typed idea");
        assert_eq!(
            t.view.events().last(),
            Some(&ViewEvent::RecordingStatus(PROCESS_FAILED_STATUS.into()))
        );
    }
}
