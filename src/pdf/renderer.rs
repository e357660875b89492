//! PDFium-backed render engine.
//!
//! Note: pdfium-render's Pdfium struct is not Send+Sync, so the engine only
//! remembers which library binding worked and creates a Pdfium instance
//! on-demand within each render.

use super::thumbnail::{page_index, RenderEngine, Thumbnail, Viewport};
use crate::error::{PreviewError, Result};
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Environment variable naming an explicit PDFium library file.
pub const PDFIUM_PATH_ENV: &str = "FOLIO_PDFIUM_PATH";

#[cfg(target_os = "macos")]
const LIBRARY_FILE: &str = "libpdfium.dylib";
#[cfg(target_os = "windows")]
const LIBRARY_FILE: &str = "pdfium.dll";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const LIBRARY_FILE: &str = "libpdfium.so";

/// Where to look for the PDFium library.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Candidate library files, tried in order
    pub library_paths: Vec<PathBuf>,
    /// Fall back to the system library search when no candidate binds
    pub use_system_library: bool,
}

impl EngineConfig {
    /// Search order:
    /// 1. `$FOLIO_PDFIUM_PATH`
    /// 2. `lib/` in current working directory (development)
    /// 3. next to the executable, and `lib/` relative to it
    /// 4. `Frameworks/` and `Resources/lib/` in a macOS bundle
    /// 5. system library
    pub fn from_env() -> Self {
        let mut library_paths = Vec::new();

        if let Some(explicit) = std::env::var_os(PDFIUM_PATH_ENV) {
            library_paths.push(PathBuf::from(explicit));
        }

        if let Ok(cwd) = std::env::current_dir() {
            library_paths.push(cwd.join("lib").join(LIBRARY_FILE));
        }

        if let Ok(exe) = std::env::current_exe() {
            if let Some(parent) = exe.parent() {
                library_paths.push(parent.join(LIBRARY_FILE));
                library_paths.push(parent.join("lib").join(LIBRARY_FILE));

                if let Some(grandparent) = parent.parent() {
                    library_paths.push(grandparent.join("Frameworks").join(LIBRARY_FILE));
                    library_paths.push(grandparent.join("Resources/lib").join(LIBRARY_FILE));
                }
            }
        }

        Self {
            library_paths,
            use_system_library: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LibrarySource {
    Path(PathBuf),
    System,
}

/// Render engine backed by a PDFium library that was proven bindable.
#[derive(Debug)]
pub struct PdfiumEngine {
    library: LibrarySource,
}

impl PdfiumEngine {
    /// Locate and bind the PDFium library once to prove it is usable.
    pub fn load(config: &EngineConfig) -> Result<Self> {
        for path in &config.library_paths {
            if !path.is_file() {
                continue;
            }
            match Pdfium::bind_to_library(path) {
                Ok(bindings) => {
                    drop(Pdfium::new(bindings));
                    info!(path = %path.display(), "loaded bundled PDFium library");
                    return Ok(Self {
                        library: LibrarySource::Path(path.clone()),
                    });
                }
                Err(e) => {
                    debug!(path = %path.display(), error = ?e, "failed to bind PDFium library");
                }
            }
        }

        if config.use_system_library {
            match Pdfium::bind_to_system_library() {
                Ok(bindings) => {
                    drop(Pdfium::new(bindings));
                    info!("loaded system PDFium library");
                    return Ok(Self {
                        library: LibrarySource::System,
                    });
                }
                Err(e) => {
                    debug!(error = ?e, "failed to bind system PDFium library");
                }
            }
        }

        // All strategies failed
        Err(PreviewError::EngineLoad(format!(
            "could not load {} (set {} to its location)",
            LIBRARY_FILE, PDFIUM_PATH_ENV
        )))
    }

    fn bind(&self) -> Result<Pdfium> {
        let bindings = match &self.library {
            LibrarySource::Path(path) => Pdfium::bind_to_library(path),
            LibrarySource::System => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| PreviewError::EngineLoad(format!("{:?}", e)))?;
        Ok(Pdfium::new(bindings))
    }
}

impl RenderEngine for PdfiumEngine {
    fn name(&self) -> &str {
        "pdfium"
    }

    fn rasterize(&self, document: &[u8], page_number: u16, scale: f32) -> Result<Thumbnail> {
        let pdfium = self.bind()?;
        let doc = pdfium
            .load_pdf_from_byte_slice(document, None)
            .map_err(|e| PreviewError::DocumentLoad(e.to_string()))?;

        let pages = doc.pages();
        let index = page_index(page_number, pages.len())?;
        let page = pages
            .get(index)
            .map_err(|e| PreviewError::Render(e.to_string()))?;

        let viewport = Viewport::at_scale(page.width().value, page.height().value, scale)?;

        let config = PdfRenderConfig::new()
            .set_target_width(viewport.width as i32)
            .set_target_height(viewport.height as i32)
            .render_form_data(true)
            .render_annotations(true);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| PreviewError::Render(e.to_string()))?;

        Thumbnail::from_image(&bitmap.as_image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_fails_without_any_candidate() {
        let config = EngineConfig {
            library_paths: vec![PathBuf::from("/nonexistent/folio/libpdfium.so")],
            use_system_library: false,
        };
        let err = PdfiumEngine::load(&config).unwrap_err();
        assert!(matches!(err, PreviewError::EngineLoad(_)));
        assert!(err.to_string().contains(PDFIUM_PATH_ENV));
    }

    #[test]
    fn test_config_search_order_starts_with_working_dir() {
        let config = EngineConfig::from_env();
        assert!(config.use_system_library);
        assert!(config
            .library_paths
            .iter()
            .any(|p| p.ends_with(PathBuf::from("lib").join(LIBRARY_FILE))));
    }
}
