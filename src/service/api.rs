use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::csrf::{self, CSRF_HEADER};
use super::{download, FavoriteToggle, Story, StoryService, StoryStats};
use crate::error::{Result, StoryError};
use crate::state::StoryForm;

const USER_AGENT: &str = concat!("VocalTales/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the VocalTales service.
///
/// Keeps a cookie jar so the `csrftoken` cookie set by the service can be
/// echoed back on every mutating request.
pub struct ApiClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
}

#[derive(Deserialize)]
struct CreatedStory {
    story: Story,
}

#[derive(Deserialize)]
struct Transcription {
    transcription: String,
}

#[derive(Deserialize)]
struct FavoriteReply {
    is_favorite: bool,
    #[serde(default)]
    message: String,
}

/// The list endpoint answers with a bare array, or a page when pagination is on.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoryList {
    Plain(Vec<Story>),
    Paged { results: Vec<Story> },
}

#[derive(Serialize)]
struct SpeechBody<'a> {
    text: &'a str,
    language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .map_err(|e| StoryError::Config(format!("invalid server URL '{}': {}", base_url, e)))?;

        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self { http, jar, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| StoryError::Config(format!("invalid endpoint '{}': {}", path, e)))
    }

    /// Current CSRF token from the cookie jar, empty if the service has not set one.
    pub fn csrf_token(&self) -> String {
        self.jar
            .cookies(&self.base)
            .and_then(|value| value.to_str().ok().map(csrf::token_from_cookies))
            .unwrap_or_default()
    }

    /// The service hands out its CSRF cookie with the home page.
    async fn ensure_csrf(&self) -> String {
        let token = self.csrf_token();
        if !token.is_empty() {
            return token;
        }
        if let Err(e) = self.http.get(self.base.clone()).send().await {
            tracing::debug!("Could not fetch CSRF cookie: {}", e);
        }
        self.csrf_token()
    }

    async fn post_json<B: Serialize + Sync + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let token = self.ensure_csrf().await;
        let response = self
            .http
            .post(self.url(path)?)
            .header(CSRF_HEADER, token)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.http.get(self.url(path)?).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Unwrap a `{ success, ... }` reply, turning `success: false` into a service error.
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body: Value = response.json().await?;

    if body.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(serde_json::from_value(body)?);
    }

    let reason = body
        .get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed with status {}", status));
    Err(StoryError::Service(reason))
}

#[async_trait]
impl StoryService for ApiClient {
    async fn transcribe(&self, wav: Vec<u8>, locale: &str) -> Result<String> {
        let token = self.ensure_csrf().await;
        let audio = Part::bytes(wav).file_name("recording.wav").mime_str("audio/wav")?;
        let form = Form::new().part("audio", audio).text("language", locale.to_string());

        let response = self
            .http
            .post(self.url("api/voice/upload/")?)
            .header(CSRF_HEADER, token)
            .multipart(form)
            .send()
            .await?;

        let reply: Transcription = read_envelope(response).await?;
        Ok(reply.transcription)
    }

    async fn create_story(&self, form: &StoryForm) -> Result<Story> {
        let response = self.post_json("api/stories/create/", form).await?;
        let reply: CreatedStory = read_envelope(response).await?;
        tracing::info!("Story generated: #{} '{}'", reply.story.id, reply.story.title);
        Ok(reply.story)
    }

    async fn list_stories(&self) -> Result<Vec<Story>> {
        Ok(match self.get_json::<StoryList>("api/stories/").await? {
            StoryList::Plain(stories) => stories,
            StoryList::Paged { results } => results,
        })
    }

    async fn get_story(&self, id: i64) -> Result<Story> {
        self.get_json(&format!("api/stories/{}/", id)).await
    }

    async fn render_speech(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let body = SpeechBody { text, language, title: None };
        let response = self.post_json("api/tts/gtts/", &body).await?.error_for_status()?;
        let bytes = response.bytes().await?;
        tracing::info!("Rendered {} bytes of story audio ({})", bytes.len(), language);
        Ok(bytes.to_vec())
    }

    async fn download_speech(&self, text: &str, language: &str, title: &str, dir: &Path) -> Result<PathBuf> {
        let body = SpeechBody { text, language, title: Some(title) };
        let response = self.post_json("api/tts/download/", &body).await?.error_for_status()?;
        download::save_audio(response, dir, title).await
    }

    async fn toggle_favorite(&self, story_id: i64) -> Result<FavoriteToggle> {
        let token = self.ensure_csrf().await;
        let response = self
            .http
            .post(self.url(&format!("api/stories/{}/favorite/", story_id))?)
            .header(CSRF_HEADER, token)
            .send()
            .await?;

        let reply: FavoriteReply = read_envelope(response).await?;
        Ok(FavoriteToggle {
            is_favorite: reply.is_favorite,
            message: reply.message,
        })
    }

    async fn stats(&self) -> Result<StoryStats> {
        self.get_json("api/stats/").await
    }
}
