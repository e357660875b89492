//! Error taxonomy for preview rendering.
//!
//! Only [`PreviewError::MountPointNotFound`] is ever reported to callers of
//! the render surface. Everything else is absorbed by the fallback path or
//! turned into a negative existence result.

use thiserror::Error;

/// Errors that can occur while producing a preview.
#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("Container with ID '{0}' not found")]
    MountPointNotFound(String),

    #[error("Failed to load rendering engine: {0}")]
    EngineLoad(String),

    #[error("Invalid document URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load document: {0}")]
    DocumentLoad(String),

    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u16, page_count: u16 },

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Image encoding failed: {0}")]
    ImageEncode(String),
}

pub type Result<T, E = PreviewError> = std::result::Result<T, E>;
