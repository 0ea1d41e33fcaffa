use std::{cell::Cell, path::Path, sync::Arc};

use base64::Engine as _;
use tokio::sync::watch;

use crate::foundation::error::{RibbonError, RibbonResult};

const FALLBACK_MIME: &str = "application/octet-stream";

/// The single uploaded image of a session, kept in its embeddable form.
///
/// Bytes are never validated here: a file that is not really an image still becomes a
/// `SourceImage` and is forwarded as-is to export. Only the render engine decodes pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    bytes: Arc<[u8]>,
    mime: String,
    data_url: String,
}

impl SourceImage {
    /// Wrap raw file bytes. `name_hint` (usually the file name) is used for MIME
    /// detection only when the bytes carry no recognizable signature.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>, name_hint: Option<&Path>) -> Self {
        let bytes = bytes.into();
        let mime = sniff_mime(&bytes, name_hint).to_string();
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let data_url = format!("data:{mime};base64,{encoded}");
        Self {
            bytes,
            mime,
            data_url,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// `data:<mime>;base64,<payload>` string suitable for embedding.
    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

fn sniff_mime(bytes: &[u8], name_hint: Option<&Path>) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }
    name_hint
        .and_then(|p| image::ImageFormat::from_path(p).ok())
        .map(|f| f.to_mime_type())
        .unwrap_or(FALLBACK_MIME)
}

/// Session owner of the current [`SourceImage`].
///
/// Each ingest replaces the image wholesale. When ingests overlap, only the most
/// recently started one is allowed to land; a stale completion is dropped.
#[derive(Debug)]
pub struct ImageSource {
    tx: watch::Sender<Option<Arc<SourceImage>>>,
    generation: Cell<u64>,
}

impl ImageSource {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx,
            generation: Cell::new(0),
        }
    }

    pub fn current(&self) -> Option<Arc<SourceImage>> {
        self.tx.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_none()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<SourceImage>>> {
        self.tx.subscribe()
    }

    /// Read `path` and make it the current image.
    ///
    /// Returns `Ok(None)` when a later ingest started while this one was reading,
    /// whether or not the read succeeded. On failure the current image is left
    /// untouched.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn ingest(&self, path: impl AsRef<Path>) -> RibbonResult<Option<Arc<SourceImage>>> {
        let path = path.as_ref();
        let ticket = self.next_ticket();

        let read = tokio::fs::read(path).await;

        if ticket != self.generation.get() {
            tracing::debug!(ticket, "ingest superseded by a newer upload");
            return Ok(None);
        }

        let bytes = read.map_err(|e| {
            tracing::warn!(error = %e, "image ingest failed");
            RibbonError::ingest(format!("read '{}': {e}", path.display()))
        })?;

        let image = Arc::new(SourceImage::from_bytes(bytes, Some(path)));
        tracing::info!(
            mime = image.mime(),
            bytes = image.bytes().len(),
            "source image replaced"
        );
        self.tx.send_replace(Some(Arc::clone(&image)));
        Ok(Some(image))
    }

    /// Replace the current image from memory. Supersedes any ingest still in flight.
    pub fn ingest_bytes(
        &self,
        bytes: impl Into<Arc<[u8]>>,
        name_hint: Option<&Path>,
    ) -> Arc<SourceImage> {
        self.next_ticket();
        let image = Arc::new(SourceImage::from_bytes(bytes, name_hint));
        self.tx.send_replace(Some(Arc::clone(&image)));
        image
    }

    fn next_ticket(&self) -> u64 {
        let ticket = self.generation.get().wrapping_add(1);
        self.generation.set(ticket);
        ticket
    }
}

impl Default for ImageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/image.rs"]
mod tests;
