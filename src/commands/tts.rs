use crate::app::App;
use crate::error::Result;
use crate::playback::Strategy;

/// Play the current story, with `method` or the configured default.
pub fn play(app: &App, method: Option<Strategy>) -> Result<()> {
    let method = method.unwrap_or_else(|| app.state.settings.lock().playback.method);
    app.controller.start(method)
}

pub fn pause(app: &App) {
    app.controller.stop();
}

pub fn read_along(app: &App) -> Result<()> {
    app.controller.start(Strategy::ReadAlong)
}

/// Change the default playback method. The caller persists settings.
pub fn set_method(app: &App, method: Strategy) {
    app.state.settings.lock().playback.method = method;
    tracing::info!("Default playback method set to {}", method);
}
