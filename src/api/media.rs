//! Media uploads

use crate::client::Mastodon;
use crate::decode::Value;
use crate::error::{Error, Result};
use crate::http::FilePart;
use crate::params::Params;
use crate::types::Method;
use crate::version::Version;
use base64::Engine as _;
use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Extension to mime type table used for guessing in both directions
const MIME_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("mp4", "video/mp4"),
    ("m4v", "video/mp4"),
    ("webm", "video/webm"),
    ("mov", "video/quicktime"),
    ("mp3", "audio/mpeg"),
    ("ogg", "audio/ogg"),
    ("wav", "audio/wav"),
];

const UPLOAD_SUFFIX_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// What to upload
#[derive(Debug, Clone)]
pub enum MediaSource {
    /// A file on disk; the mime type is guessed from its extension unless given
    Path(PathBuf),
    /// Raw bytes; the mime type must be given
    Bytes(Vec<u8>),
}

impl From<PathBuf> for MediaSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for MediaSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for MediaSource {
    fn from(data: Vec<u8>) -> Self {
        Self::Bytes(data)
    }
}

/// Guess a mime type from a file name's extension
pub fn guess_mime_type(path: &Path) -> Option<mime::Mime> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .and_then(|(_, mime)| mime.parse().ok())
}

fn extension_for(mime: &mime::Mime) -> String {
    let essence = mime.essence_str();
    MIME_TYPES
        .iter()
        .find(|(_, known)| *known == essence)
        .map(|(ext, _)| format!(".{ext}"))
        .unwrap_or_default()
}

/// `mastodonpyupload_<epoch>_<10 random [A-Z0-9]><ext>`
fn upload_file_name(mime: &mime::Mime) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..10)
        .map(|_| UPLOAD_SUFFIX_CHARS[rng.gen_range(0..UPLOAD_SUFFIX_CHARS.len())] as char)
        .collect();
    let now = Utc::now();
    format!(
        "mastodonpyupload_{}.{:06}_{suffix}{}",
        now.timestamp(),
        now.timestamp_subsec_micros(),
        extension_for(mime)
    )
}

/// Encode bytes as a `data:` URI, as profile avatar and header updates expect
pub fn data_uri(mime_type: &str, data: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{mime_type};base64,{encoded}")
}

impl Mastodon {
    /// Upload an image, video or audio file
    ///
    /// Returns the media record; pass its id to
    /// [`StatusPost::media_ids`](super::StatusPost::media_ids) to attach it.
    pub async fn media_post(
        &mut self,
        source: impl Into<MediaSource>,
        mime_type: Option<&str>,
        description: Option<&str>,
    ) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 0, 0))?;

        let source = source.into();
        let explicit = mime_type
            .map(|m| {
                m.parse::<mime::Mime>()
                    .map_err(|e| Error::illegal_argument(format!("Invalid mime type '{m}': {e}")))
            })
            .transpose()?;

        let (data, mime) = match source {
            MediaSource::Path(path) => {
                let mime = explicit.or_else(|| guess_mime_type(&path));
                (tokio::fs::read(&path).await?, mime)
            }
            MediaSource::Bytes(data) => (data, explicit),
        };
        let mime = mime.ok_or_else(|| {
            Error::illegal_argument(
                "Could not determine mime type or data passed directly without mime type.",
            )
        })?;

        let file = FilePart {
            field: "file".to_string(),
            file_name: upload_file_name(&mime),
            mime_type: mime.to_string(),
            data,
        };
        let params = Params::new().set_opt("description", description);
        self.request_with_files(Method::POST, "/api/v1/media", params, vec![file])
            .await
    }
}
