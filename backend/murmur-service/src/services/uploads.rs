/// Local disk storage for post images
use crate::error::{AppError, Result};
use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Image received from a client, not yet written to disk
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Filename as sent by the client; only its extension is kept
    pub original_name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::Internal(format!(
                "cannot create uploads directory {}: {e}",
                self.dir.display()
            ))
        })
    }

    /// Write the image under a fresh `<millis>-<random><ext>` name and
    /// return that name
    pub async fn save(&self, image: &UploadedImage) -> Result<String> {
        let name = stored_name(&image.original_name);
        self.ensure_dir().await?;

        fs::write(self.dir.join(&name), &image.data)
            .await
            .map_err(|e| AppError::Internal(format!("failed to store upload {name}: {e}")))?;

        tracing::info!(file = %name, bytes = image.data.len(), "image stored");
        Ok(name)
    }

    /// Best-effort removal; failures are logged, never returned
    pub async fn remove(&self, name: &str) {
        let Some(path) = self.resolve(name) else {
            tracing::warn!(file = %name, "refusing to remove upload with unsafe name");
            return;
        };

        if let Err(e) = fs::remove_file(&path).await {
            tracing::warn!(file = %name, error = %e, "failed to remove upload");
        }
    }

    /// Path of a stored upload, or `None` if the name could escape the
    /// uploads directory
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let safe = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0'])
            && !name.starts_with('.');
        safe.then(|| self.dir.join(name))
    }

    /// Read a stored upload; `Ok(None)` when it does not exist
    pub async fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let Some(path) = self.resolve(name) else {
            return Ok(None);
        };

        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Internal(format!("failed to read upload {name}: {e}"))),
        }
    }
}

fn stored_name(original_name: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!(
        "{}-{}{}",
        Utc::now().timestamp_millis(),
        suffix,
        extension_of(original_name)
    )
}

/// `.ext` of the client filename, dropped unless it is short and alphanumeric
fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// Content type for a stored upload, from its extension
pub fn content_type_for(name: &str) -> mime::Mime {
    let ext = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("png") => mime::IMAGE_PNG,
        Some("gif") => mime::IMAGE_GIF,
        Some("bmp") => mime::IMAGE_BMP,
        Some("svg") => mime::IMAGE_SVG,
        Some("webp") => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
