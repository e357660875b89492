// Folio - PDF preview rendering for portfolio pages
//
// Renders a thumbnail of a document page into a page's mount point using
// PDFium, degrading to an embedded viewer frame when the engine is missing
// or the document cannot be rendered.

mod engine;
mod error;
mod handler;
mod markup;
mod options;
mod page;
pub mod pdf;
mod source;

pub use engine::{EngineHandle, EngineLoader};
pub use error::{PreviewError, Result};
pub use handler::{global, install_global, load_pdf_preview, PreviewHandler, RenderOutcome};
pub use markup::{escape_html, Preview, PreviewBody};
pub use options::{PreviewOptions, PreviewOverrides};
pub use page::{MountContent, MountPoint, Page};
pub use source::{file_name, DocumentLocation, MAX_DOCUMENT_BYTES};

/// Install a `tracing` subscriber that honours `RUST_LOG`.
/// Call this once at application startup if you want to see logs.
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only the first call installs a subscriber; later calls are no-ops
    let _ = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .try_init();
}
