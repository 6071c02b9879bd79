pub mod app;
pub mod audio;
pub mod capabilities;
pub mod cli;
pub mod commands;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod playback;
pub mod service;
pub mod state;
pub mod text;
pub mod ui;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncBufReadExt;

use app::App;
use capabilities::{CapabilityProbe, SystemProbe};
use cli::{Args, Command};
use audio::AudioOutput;
use engine::external_voice::ExternalVoice;
use engine::system_speech::SystemSpeech;
use engine::{SpeechSynthesizer, VoiceEngine};
use playback::Engines;
use service::ApiClient;
use state::Settings;
use ui::TerminalView;

pub const SERVER_ENV: &str = "VOCALTALES_SERVER";

pub fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting VocalTales v{}", env!("CARGO_PKG_VERSION"));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(run_app(args))
}

/// Layer env and command-line overrides on top of the stored settings.
fn apply_overrides(mut settings: Settings, env_server: Option<String>, args: &Args) -> Settings {
    if let Some(server) = env_server.filter(|s| !s.trim().is_empty()) {
        settings.server.base_url = server;
    }
    if let Some(server) = &args.server {
        settings.server.base_url = server.clone();
    }
    if let Some(method) = args.method {
        settings.playback.method = method;
    }
    settings
}

fn build_app(settings: Settings) -> anyhow::Result<App> {
    let speech_template = settings
        .engines
        .speech
        .clone()
        .unwrap_or_else(SystemSpeech::default_template);
    let player_template = settings
        .engines
        .audio_player
        .clone()
        .unwrap_or_else(audio::CommandAudioPlayer::default_template);
    let voice_template = settings.engines.voice.clone();
    let recorder = audio::default_recorder();

    let probe = SystemProbe {
        speech: speech_template.clone(),
        voice: voice_template.clone(),
        audio_player: player_template.clone(),
        microphone: recorder.is_some(),
    };
    let capabilities = probe.probe();

    let engines = Engines {
        speech: Some(Arc::new(SystemSpeech::new(speech_template)) as Arc<dyn SpeechSynthesizer>),
        voice: voice_template.map(|template| Arc::new(ExternalVoice::new(template)) as Arc<dyn VoiceEngine>),
        audio: Some(Arc::new(audio::CommandAudioPlayer::new(player_template)) as Arc<dyn AudioOutput>),
        clip_dir: std::env::temp_dir().join("vocaltales"),
    };

    let service = ApiClient::new(&settings.server.base_url)
        .with_context(|| format!("invalid story service URL '{}'", settings.server.base_url))?;
    tracing::info!("Story service: {}", service.base_url());

    Ok(App::new(
        settings,
        Arc::new(TerminalView::new()),
        Arc::new(service),
        engines,
        capabilities,
        recorder,
    ))
}

async fn run_app(args: Args) -> anyhow::Result<()> {
    let settings = apply_overrides(persistence::load_settings(), std::env::var(SERVER_ENV).ok(), &args);
    let app = build_app(settings)?;
    app.announce_capabilities();
    let _ = commands::story::load_library(&app).await;

    println!("VocalTales -- type `help` for commands");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        use std::io::Write;
        std::io::stderr().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match cli::parse_line(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => dispatch(&app, command).await,
            Ok(None) => {}
            Err(message) => eprintln!("{}", message),
        }
    }

    app.controller.stop();
    tracing::info!("Goodbye");
    Ok(())
}

/// Run one command. Failures have already been reported through the view.
async fn dispatch(app: &App, command: Command) {
    use commands::{story, stt, tts};

    let result = match command {
        Command::Record => stt::toggle_recording(app).await.map(|_| ()),
        Command::Idea(text) => {
            app.state.form.lock().voice_input = text;
            Ok(())
        }
        Command::Set { field, value } => {
            if let Err(message) = app.state.form.lock().set_field(&field, &value) {
                eprintln!("{}", message);
            }
            Ok(())
        }
        Command::Form => {
            let form = app.state.form.lock().clone();
            println!("{:#?}", form);
            Ok(())
        }
        Command::Generate => story::generate_story(app).await.map(|_| ()),
        Command::Library => story::load_library(app).await.map(|_| ()),
        Command::Open(id) => story::open_story(app, id).await.map(|_| ()),
        Command::Play(method) => tts::play(app, method),
        Command::Pause => {
            tts::pause(app);
            Ok(())
        }
        Command::ReadAlong => tts::read_along(app),
        Command::Download => story::download_audio(app).await.map(|_| ()),
        Command::Favorite => story::toggle_favorite(app).await.map(|_| ()),
        Command::New => {
            story::create_new_story(app);
            Ok(())
        }
        Command::Stats => story::show_stats(app).await,
        Command::Method(method) => {
            tts::set_method(app, method);
            persistence::save_settings(&app.state);
            Ok(())
        }
        Command::Help => {
            println!("{}", cli::help_text());
            Ok(())
        }
        Command::Quit => Ok(()),
    };

    if let Err(e) = result {
        tracing::debug!("Command finished with error: {}", e);
    }
}
