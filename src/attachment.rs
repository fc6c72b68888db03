//! User-supplied images: where the bytes come from, how they are shown
//! while a turn runs, and how they are packed for the gateway.

use crate::types::AttachmentRef;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("{name}: {source}")]
    Unreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is empty")]
    Empty(String),
    #[error("{name} is {media_type}, only images can be attached")]
    NotAnImage { name: String, media_type: String },
}

#[derive(Clone, Debug)]
pub enum AttachmentSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// Releases a preview resource when dropped. Dropping twice is impossible,
/// so the release callback runs at most once.
pub struct PreviewHandle {
    url: String,
    on_release: Option<Box<dyn FnOnce(&str) + Send>>,
}

impl PreviewHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            on_release: None,
        }
    }

    pub fn with_release(url: impl Into<String>, release: impl FnOnce(&str) + Send + 'static) -> Self {
        Self {
            url: url.into(),
            on_release: Some(Box::new(release)),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Some(release) = self.on_release.take() {
            release(&self.url);
        }
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("url", &self.url)
            .field("released", &self.on_release.is_none())
            .finish()
    }
}

#[derive(Debug)]
pub struct Attachment {
    pub name: String,
    pub media_type: Option<String>,
    pub source: AttachmentSource,
    pub preview: Option<PreviewHandle>,
}

impl Attachment {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: None,
            source: AttachmentSource::Bytes(bytes),
            preview: None,
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            media_type: None,
            source: AttachmentSource::Path(path),
            preview: None,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_preview(mut self, preview: PreviewHandle) -> Self {
        self.preview = Some(preview);
        self
    }

    /// Declared media type, or one guessed from the file name.
    pub fn resolved_media_type(&self) -> String {
        self.media_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
    }

    pub fn reference(&self) -> AttachmentRef {
        AttachmentRef {
            name: self.name.clone(),
            media_type: Some(self.resolved_media_type()),
            preview_url: self.preview.as_ref().map(|p| p.url().to_string()),
        }
    }

    /// Splits the preview off so the caller controls when it is released.
    pub fn take_preview(&mut self) -> Option<PreviewHandle> {
        self.preview.take()
    }

    pub async fn encode(&self) -> Result<InlineData, AttachmentError> {
        let bytes = match &self.source {
            AttachmentSource::Bytes(bytes) => bytes.clone(),
            AttachmentSource::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| AttachmentError::Unreadable {
                        name: self.name.clone(),
                        source,
                    })?
            }
        };
        if bytes.is_empty() {
            return Err(AttachmentError::Empty(self.name.clone()));
        }

        let media_type = self.resolved_media_type();
        if !media_type.starts_with("image/") {
            return Err(AttachmentError::NotAnImage {
                name: self.name.clone(),
                media_type,
            });
        }

        Ok(InlineData {
            mime_type: media_type,
            data: BASE64.encode(&bytes),
        })
    }
}

/// Binary payload in the form the gateway sends it: base64 plus media type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// `data:` URL for showing raw image bytes inline.
pub fn data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, BASE64.encode(bytes))
}
