use std::sync::Arc;

use crate::audio::RecorderFactory;
use crate::capabilities::Capabilities;
use crate::playback::{Engines, PlaybackController};
use crate::service::StoryService;
use crate::state::{AppState, Settings};
use crate::ui::StoryView;

/// Everything a command needs: app state, the playback controller and the seams.
pub struct App {
    pub state: AppState,
    pub controller: PlaybackController,
    pub service: Arc<dyn StoryService>,
    pub view: Arc<dyn StoryView>,
    pub capabilities: Capabilities,
    pub recorder: Option<RecorderFactory>,
}

impl App {
    pub fn new(
        settings: Settings,
        view: Arc<dyn StoryView>,
        service: Arc<dyn StoryService>,
        engines: Engines,
        capabilities: Capabilities,
        recorder: Option<RecorderFactory>,
    ) -> Self {
        let controller = PlaybackController::new(view.clone(), service.clone(), engines, capabilities);
        Self {
            state: AppState::new(settings),
            controller,
            service,
            view,
            capabilities,
            recorder,
        }
    }

    /// Log what this machine cannot do and grey out recording if needed.
    pub fn announce_capabilities(&self) {
        for missing in self.capabilities.missing() {
            tracing::warn!("{} not available; related features will fall back or be disabled", missing);
        }
        if !self.voice_input_available() {
            self.view.set_record_enabled(false);
        }
    }

    pub fn voice_input_available(&self) -> bool {
        self.capabilities.voice_input && self.recorder.is_some()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::testing::{Behavior, FakeAudio, FakeEngine, FakeRecorder, FakeService, FakeView};

    pub struct TestApp {
        pub app: App,
        pub view: Arc<FakeView>,
        pub service: Arc<FakeService>,
        pub speech: Arc<FakeEngine>,
        pub dir: tempfile::TempDir,
    }

    pub fn test_app(capabilities: Capabilities, fail_mic: bool) -> TestApp {
        let view = FakeView::new();
        let service = FakeService::new();
        let speech = FakeEngine::new(Behavior::Finish);
        let dir = tempfile::tempdir().unwrap();
        let engines = Engines {
            speech: Some(speech.clone() as Arc<dyn crate::engine::SpeechSynthesizer>),
            voice: None,
            audio: Some(FakeAudio::new(Behavior::Finish) as Arc<dyn crate::audio::AudioOutput>),
            clip_dir: dir.path().join("clips"),
        };
        let recorder: RecorderFactory = Arc::new(move || {
            Ok(Box::new(FakeRecorder { fail_start: fail_mic }) as Box<dyn crate::audio::Recorder>)
        });
        let mut settings = Settings::default();
        settings.general.download_dir = Some(dir.path().join("downloads"));
        let app = App::new(
            settings,
            view.clone(),
            service.clone(),
            engines,
            capabilities,
            Some(recorder),
        );
        TestApp {
            app,
            view,
            service,
            speech,
            dir,
        }
    }
}
