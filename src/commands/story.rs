use crate::app::App;
use crate::error::{Result, StoryError};
use crate::service::Story;
use crate::state::AppStatus;
use crate::text::clean_for_speech;
use crate::ui::Notice;

pub const IDEA_MISSING_MESSAGE: &str = "Please tell us your story idea by recording or typing!";
pub const GENERATION_FAILED_MESSAGE: &str = "Oops! Our storyteller is taking a break. Please try again!";
pub const DOWNLOAD_OK_MESSAGE: &str = "Audio downloaded successfully!";
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Could not download audio. Try the play button instead.";

/// Send the creator form to the service and show the story that comes back.
pub async fn generate_story(app: &App) -> Result<Story> {
    let form = app.state.form.lock().clone();
    if form.voice_input.trim().is_empty() {
        app.view.notify(Notice::warning(IDEA_MISSING_MESSAGE));
        return Err(StoryError::EmptyIdea);
    }

    *app.state.status.lock() = AppStatus::Generating;
    app.view.set_loading(true);
    tracing::info!(
        "Generating {:?} {:?} story in '{}' for age {}",
        form.length,
        form.genre,
        form.language,
        form.age_group
    );

    let result = app.service.create_story(&form).await;

    app.view.set_loading(false);
    *app.state.status.lock() = AppStatus::Idle;

    match result {
        Ok(story) => {
            tracing::info!("Story #{} generated: '{}' ({} words)", story.id, story.title, story.word_count);
            app.controller.show_story(story.clone());
            let _ = load_library(app).await;
            Ok(story)
        }
        Err(e) => {
            tracing::error!("Story generation failed: {}", e);
            app.view.notify(Notice::error(GENERATION_FAILED_MESSAGE));
            Err(e)
        }
    }
}

/// Refresh the story library. Failures are logged, not shown.
pub async fn load_library(app: &App) -> Result<usize> {
    match app.service.list_stories().await {
        Ok(stories) => {
            tracing::debug!("Loaded {} stories", stories.len());
            app.view.show_library(&stories);
            let count = stories.len();
            *app.state.library.lock() = stories;
            Ok(count)
        }
        Err(e) => {
            tracing::error!("Error loading story library: {}", e);
            Err(e)
        }
    }
}

/// Show a story from the library, asking the service when it is not loaded.
pub async fn open_story(app: &App, story_id: i64) -> Result<Story> {
    let cached = app.state.library.lock().iter().find(|story| story.id == story_id).cloned();
    let story = match cached {
        Some(story) => story,
        None => match app.service.get_story(story_id).await {
            Ok(story) => story,
            Err(e) => {
                tracing::error!("Failed to fetch story #{}: {}", story_id, e);
                app.view.notify(Notice::error(format!("Could not open story #{}.", story_id)));
                return Err(e);
            }
        },
    };
    app.controller.show_story(story.clone());
    Ok(story)
}

/// Save the current story as an audio file in the download directory.
pub async fn download_audio(app: &App) -> Result<std::path::PathBuf> {
    let Some(story) = app.controller.current_story() else {
        return Err(StoryError::NoStory);
    };
    let language = story.language().to_string();
    let text = clean_for_speech(&story.content, &language);
    let dir = app.state.settings.lock().general.resolved_download_dir();

    let result = async {
        tokio::fs::create_dir_all(&dir).await?;
        app.service.download_speech(&text, &language, &story.title, &dir).await
    }
    .await;

    match result {
        Ok(path) => {
            tracing::info!("Story audio saved to {}", path.display());
            app.view.notify(Notice::success(DOWNLOAD_OK_MESSAGE));
            Ok(path)
        }
        Err(e) => {
            tracing::error!("Audio download failed: {}", e);
            app.view.notify(Notice::error(DOWNLOAD_FAILED_MESSAGE));
            Err(e)
        }
    }
}

pub async fn toggle_favorite(app: &App) -> Result<bool> {
    let favorited = app.controller.toggle_favorite().await?;
    if let Some(current) = app.controller.current_story() {
        let mut library = app.state.library.lock();
        if let Some(entry) = library.iter_mut().find(|story| story.id == current.id) {
            entry.is_favorite = favorited;
        }
    }
    Ok(favorited)
}

pub fn create_new_story(app: &App) {
    let mut form = app.state.form.lock();
    app.controller.create_new_story(&mut form);
}

pub async fn show_stats(app: &App) -> Result<()> {
    match app.service.stats().await {
        Ok(stats) => {
            app.view.show_stats(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Failed to load stats: {}", e);
            Err(e)
        }
    }
}
