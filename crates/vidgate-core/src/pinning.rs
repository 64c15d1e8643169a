//! Upload to the pinning service.
//!
//! Posts the file as multipart form data with the two static credential
//! headers and returns the content identifier the provider assigned.
//! Blocking; call from `spawn_blocking` if used from async code.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::config::PinningConfig;
use crate::content_id::{ContentId, ContentIdError};

#[derive(Debug, thiserror::Error)]
pub enum PinningError {
    #[error("pinning credentials are not configured")]
    MissingCredentials,
    #[error("not a supported video file: {0}")]
    NotVideo(String),
    #[error("file is {size} bytes, limit is {max}")]
    TooLarge { size: u64, max: u64 },
    #[error("read upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("upload transport failed: {0}")]
    Transport(String),
    #[error("upload rejected (HTTP {status}): {details}")]
    Rejected { status: u32, details: String },
    #[error("unexpected pinning response: {0}")]
    InvalidResponse(String),
    #[error("pinning service returned an invalid identifier: {0}")]
    InvalidContentId(#[from] ContentIdError),
}

impl From<curl::Error> for PinningError {
    fn from(e: curl::Error) -> Self {
        PinningError::Transport(e.to_string())
    }
}

impl From<curl::FormError> for PinningError {
    fn from(e: curl::FormError) -> Self {
        PinningError::Transport(e.to_string())
    }
}

/// Content type for accepted video extensions.
pub fn video_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "mp4" | "m4v" => Some("video/mp4"),
        "webm" => Some("video/webm"),
        "ogg" | "ogv" => Some("video/ogg"),
        "mov" => Some("video/quicktime"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Turn a pinning response into a content identifier or a rejection.
pub(crate) fn parse_pin_response(status: u32, body: &[u8]) -> Result<ContentId, PinningError> {
    if !(200..300).contains(&status) {
        let details = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/details")
                    .or_else(|| v.pointer("/error/reason"))
                    .or_else(|| v.get("error"))
                    .and_then(|d| d.as_str().map(str::to_string))
            })
            .unwrap_or_else(|| "Upload failed".to_string());
        return Err(PinningError::Rejected { status, details });
    }
    let parsed: PinResponse = serde_json::from_slice(body)
        .map_err(|e| PinningError::InvalidResponse(e.to_string()))?;
    Ok(ContentId::parse(&parsed.ipfs_hash)?)
}

#[derive(Debug, Clone)]
pub struct PinningClient {
    api_url: String,
    api_key: String,
    secret_key: String,
    max_upload_bytes: u64,
    timeout: Duration,
}

impl PinningClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            max_upload_bytes: PinningConfig::default().max_upload_bytes,
            timeout: Duration::from_secs(3600),
        }
    }

    pub fn from_config(cfg: &PinningConfig) -> Result<Self, PinningError> {
        Self::from_config_with(cfg, |name| std::env::var(name).ok())
    }

    /// `from_config` with credential overrides read through `env`.
    pub fn from_config_with<F>(cfg: &PinningConfig, env: F) -> Result<Self, PinningError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (key, secret) = cfg
            .credentials_with(env)
            .ok_or(PinningError::MissingCredentials)?;
        Ok(Self::new(cfg.api_url.clone(), key, secret).with_max_upload_bytes(cfg.max_upload_bytes))
    }

    pub fn with_max_upload_bytes(mut self, max: u64) -> Self {
        self.max_upload_bytes = max;
        self
    }

    /// Check the file is an accepted video within the size limit.
    pub fn check_upload(&self, path: &Path) -> Result<&'static str, PinningError> {
        let content_type = video_content_type(path)
            .ok_or_else(|| PinningError::NotVideo(path.display().to_string()))?;
        let size = std::fs::metadata(path)?.len();
        if size > self.max_upload_bytes {
            return Err(PinningError::TooLarge {
                size,
                max: self.max_upload_bytes,
            });
        }
        Ok(content_type)
    }

    pub fn pin_file(&self, path: &Path) -> Result<ContentId, PinningError> {
        let content_type = self.check_upload(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video")
            .to_string();
        let metadata = serde_json::json!({
            "name": name,
            "keyvalues": { "contentType": content_type },
        })
        .to_string();

        let mut form = curl::easy::Form::new();
        form.part("file")
            .file(path)
            .content_type(content_type)
            .add()?;
        form.part("pinataMetadata")
            .contents(metadata.as_bytes())
            .add()?;

        let mut list = curl::easy::List::new();
        list.append(&format!("pinata_api_key: {}", self.api_key.trim()))?;
        list.append(&format!("pinata_secret_api_key: {}", self.secret_key.trim()))?;

        let mut easy = curl::easy::Easy::new();
        easy.url(&self.api_url)?;
        easy.connect_timeout(Duration::from_secs(30))?;
        easy.timeout(self.timeout)?;
        easy.http_headers(list)?;
        easy.httppost(form)?;

        tracing::info!(file = %path.display(), %content_type, "uploading to pinning service");

        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        let status = easy.response_code()?;

        match parse_pin_response(status, &body) {
            Ok(id) => {
                tracing::info!(%id, "upload pinned");
                Ok(id)
            }
            Err(e) => {
                tracing::warn!(status, error = %e, "pinning upload failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_success_response() {
        let body = br#"{"IpfsHash":"QmTest123","PinSize":1024,"Timestamp":"2024-01-01T00:00:00Z"}"#;
        let id = parse_pin_response(200, body).unwrap();
        assert_eq!(id.as_str(), "QmTest123");
    }

    #[test]
    fn parse_rejection_details() {
        let body = br#"{"error":{"reason":"INVALID_CREDENTIALS","details":"Invalid API key"}}"#;
        match parse_pin_response(401, body) {
            Err(PinningError::Rejected { status, details }) => {
                assert_eq!(status, 401);
                assert_eq!(details, "Invalid API key");
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn parse_rejection_without_json_body() {
        match parse_pin_response(500, b"internal error") {
            Err(PinningError::Rejected { details, .. }) => assert_eq!(details, "Upload failed"),
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn parse_success_with_missing_hash_is_invalid() {
        assert!(matches!(
            parse_pin_response(200, br#"{"ok":true}"#),
            Err(PinningError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_pin_response(200, br#"{"IpfsHash":""}"#),
            Err(PinningError::InvalidContentId(_))
        ));
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(video_content_type(Path::new("a.MP4")), Some("video/mp4"));
        assert_eq!(video_content_type(Path::new("clip.webm")), Some("video/webm"));
        assert_eq!(video_content_type(Path::new("clip.ogg")), Some("video/ogg"));
        assert_eq!(video_content_type(Path::new("notes.txt")), None);
        assert_eq!(video_content_type(Path::new("noext")), None);
    }

    #[test]
    fn check_upload_enforces_type_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, vec![0u8; 2048]).unwrap();
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, b"hello").unwrap();

        let client = PinningClient::new("http://127.0.0.1:1/pin", "k", "s");
        assert_eq!(client.check_upload(&video).unwrap(), "video/mp4");
        assert!(matches!(client.check_upload(&text), Err(PinningError::NotVideo(_))));

        let small = client.with_max_upload_bytes(1024);
        assert!(matches!(
            small.check_upload(&video),
            Err(PinningError::TooLarge { size: 2048, max: 1024 })
        ));
    }

    #[test]
    fn from_config_requires_credentials() {
        assert!(matches!(
            PinningClient::from_config_with(&PinningConfig::default(), |_| None),
            Err(PinningError::MissingCredentials)
        ));

        let cfg = PinningConfig {
            max_upload_bytes: 10,
            ..PinningConfig::default()
        };
        let env = |_: &str| Some("from-env".to_string());
        let client = PinningClient::from_config_with(&cfg, env).unwrap();
        assert_eq!(client.api_key, "from-env");
        assert_eq!(client.max_upload_bytes, 10);
    }
}
