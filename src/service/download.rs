use std::path::{Path, PathBuf};

use futures_util::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;

use crate::error::{Result, StoryError};

/// File name a story's audio is saved under.
pub fn audio_file_name(title: &str) -> String {
    let safe: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '-',
            c => c,
        })
        .collect();
    let stem = if safe.is_empty() { "story".to_string() } else { safe };
    format!("{}.mp3", stem)
}

/// Stream a response body into `dir/{title}.mp3`, replacing any earlier copy.
pub async fn save_audio(response: reqwest::Response, dir: &Path, title: &str) -> Result<PathBuf> {
    let total_size = response.content_length().unwrap_or(0);
    let stream = response.bytes_stream().map(|chunk| chunk.map_err(StoryError::from));
    save_stream(stream, dir, title, total_size).await
}

/// Write `stream` to `dir/{title}.mp3`. A failed download leaves no partial
/// file behind.
pub async fn save_stream<S, B>(stream: S, dir: &Path, title: &str, total_size: u64) -> Result<PathBuf>
where
    S: Stream<Item = Result<B>> + Unpin,
    B: AsRef<[u8]>,
{
    tokio::fs::create_dir_all(dir).await?;
    let dest = dir.join(audio_file_name(title));

    match write_stream(stream, &dest, total_size).await {
        Ok(downloaded) => {
            tracing::info!("Download complete: {} ({} bytes)", dest.display(), downloaded);
            Ok(dest)
        }
        Err(e) => {
            tracing::error!("Download of {} failed: {}", dest.display(), e);
            if let Err(remove) = tokio::fs::remove_file(&dest).await {
                if remove.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove partial download {}: {}", dest.display(), remove);
                }
            }
            Err(e)
        }
    }
}

async fn write_stream<S, B>(mut stream: S, dest: &Path, total_size: u64) -> Result<u64>
where
    S: Stream<Item = Result<B>> + Unpin,
    B: AsRef<[u8]>,
{
    let mut file = tokio::fs::File::create(dest).await?;
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        file.write_all(chunk).await?;
        downloaded += chunk.len() as u64;

        if total_size > 0 {
            tracing::debug!("Audio download {:.0}%", downloaded as f64 / total_size as f64 * 100.0);
        }
    }
    file.flush().await?;
    Ok(downloaded)
}
