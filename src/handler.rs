//! Preview rendering entry points.
//!
//! [`PreviewHandler::render`] decides between the engine-rendered thumbnail
//! and the embedded frame:
//!
//! 1. Wait for the engine loader to settle.
//! 2. With an engine, fetch the document and rasterize the requested page.
//!    Any failure on that path switches once to the frame fallback.
//! 3. Without an engine, go straight to the frame fallback.
//!
//! Only a missing mount point is reported to the caller.

use crate::engine::{EngineHandle, EngineLoader};
use crate::error::{PreviewError, Result};
use crate::markup::{Preview, PreviewBody};
use crate::options::{PreviewOptions, PreviewOverrides};
use crate::page::Page;
use crate::pdf::{EngineConfig, Thumbnail};
use crate::source::{DocumentLocation, MAX_DOCUMENT_BYTES};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, error, info, warn};

/// Which path produced the mounted preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered { width: u32, height: u32 },
    Fallback,
}

/// Renders document previews into mount points.
#[derive(Debug)]
pub struct PreviewHandler {
    loader: EngineLoader,
    /// Directory that relative document URLs resolve against
    base_dir: PathBuf,
    defaults: PreviewOptions,
    /// Documents over this size go straight to the frame fallback
    max_document_bytes: u64,
}

impl PreviewHandler {
    pub fn new(loader: EngineLoader) -> Self {
        Self {
            loader,
            base_dir: PathBuf::from("."),
            defaults: PreviewOptions::default(),
            max_document_bytes: MAX_DOCUMENT_BYTES,
        }
    }

    /// Handler that binds PDFium from the default search paths on first use.
    pub fn with_pdfium() -> Self {
        Self::new(EngineLoader::pdfium(EngineConfig::from_env()))
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_defaults(mut self, defaults: PreviewOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_max_document_bytes(mut self, max_bytes: u64) -> Self {
        self.max_document_bytes = max_bytes;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn defaults(&self) -> &PreviewOptions {
        &self.defaults
    }

    /// Start loading the engine without rendering anything.
    pub async fn ensure_engine_loaded(&self) -> bool {
        self.loader.ensure_loaded().await.is_some()
    }

    /// Whether the engine load attempt has already completed.
    pub fn is_engine_settled(&self) -> bool {
        self.loader.is_settled()
    }

    /// Render a preview of `document_url` into the mount point `mount_point_id`.
    ///
    /// Returns `true` once a preview is mounted (including the fallback
    /// frame), `false` if the mount point does not exist.
    pub async fn render_preview(
        &self,
        page: &Page,
        document_url: &str,
        mount_point_id: &str,
        overrides: &PreviewOverrides,
    ) -> bool {
        self.render(page, document_url, mount_point_id, overrides)
            .await
            .is_ok()
    }

    /// Like [`render_preview`](Self::render_preview), reporting which path was taken.
    pub async fn render(
        &self,
        page: &Page,
        document_url: &str,
        mount_point_id: &str,
        overrides: &PreviewOverrides,
    ) -> Result<RenderOutcome> {
        let Some(mount) = page.mount_point(mount_point_id) else {
            error!(mount = mount_point_id, "container not found");
            return Err(PreviewError::MountPointNotFound(mount_point_id.to_string()));
        };

        let options = self.defaults.merged(overrides);

        // Calls on the same mount point complete in the order they lock
        let _guard = mount.serialize_renders().await;

        let body = match self.loader.ensure_loaded().await {
            Some(engine) => match self.rasterize(engine, document_url, &options).await {
                Ok(thumbnail) => PreviewBody::Rendered(thumbnail),
                Err(e) => {
                    warn!(url = document_url, error = %e, "thumbnail rendering failed, falling back to frame");
                    PreviewBody::Fallback {
                        src: document_url.to_string(),
                    }
                }
            },
            None => PreviewBody::Fallback {
                src: document_url.to_string(),
            },
        };

        let outcome = match &body {
            PreviewBody::Rendered(thumbnail) => RenderOutcome::Rendered {
                width: thumbnail.width,
                height: thumbnail.height,
            },
            PreviewBody::Fallback { .. } => RenderOutcome::Fallback,
        };

        mount.replace(Preview::new(document_url, &options, body));

        match outcome {
            RenderOutcome::Rendered { width, height } => {
                info!(url = document_url, mount = mount_point_id, width, height, "preview rendered");
            }
            RenderOutcome::Fallback => {
                info!(url = document_url, mount = mount_point_id, "preview rendered with frame fallback");
            }
        }

        Ok(outcome)
    }

    async fn rasterize(
        &self,
        engine: EngineHandle,
        document_url: &str,
        options: &PreviewOptions,
    ) -> Result<Thumbnail> {
        let location = DocumentLocation::resolve(document_url, &self.base_dir)?;
        let page_number = options.preview_page_number;
        let scale = options.render_scale;
        let max_bytes = self.max_document_bytes;

        debug!(location = %location, page = page_number, scale, engine = engine.name(), "rendering thumbnail");

        tokio::task::spawn_blocking(move || {
            let document = location.fetch_with_limit(max_bytes)?;
            engine.rasterize(&document, page_number, scale)
        })
        .await
        .map_err(|e| PreviewError::Render(format!("render task failed: {}", e)))?
    }

    /// Whether the document is reachable. Failures of the probe itself count
    /// as "does not exist".
    pub async fn document_exists(&self, document_url: &str) -> bool {
        let location = match DocumentLocation::resolve(document_url, &self.base_dir) {
            Ok(location) => location,
            Err(e) => {
                warn!(url = document_url, error = %e, "cannot probe document");
                return false;
            }
        };

        tokio::task::spawn_blocking(move || location.exists())
            .await
            .unwrap_or(false)
    }

    /// Open the full document in the platform's default viewer.
    pub fn open_full_view(&self, document_url: &str) -> std::io::Result<()> {
        match DocumentLocation::resolve(document_url, &self.base_dir) {
            Ok(DocumentLocation::Local(path)) => open::that(path),
            _ => open::that(document_url),
        }
    }
}

static GLOBAL_HANDLER: OnceLock<PreviewHandler> = OnceLock::new();

/// Install the process-wide handler. Returns `false` if one already exists.
pub fn install_global(handler: PreviewHandler) -> bool {
    GLOBAL_HANDLER.set(handler).is_ok()
}

/// The process-wide handler, if one has been installed.
pub fn global() -> Option<&'static PreviewHandler> {
    GLOBAL_HANDLER.get()
}

/// Render with the process-wide handler.
///
/// Returns `false` when no handler has been installed yet.
pub async fn load_pdf_preview(
    page: &Page,
    document_url: &str,
    mount_point_id: &str,
    overrides: &PreviewOverrides,
) -> bool {
    match global() {
        Some(handler) => {
            handler
                .render_preview(page, document_url, mount_point_id, overrides)
                .await
        }
        None => {
            error!("preview handler not initialized");
            false
        }
    }
}
