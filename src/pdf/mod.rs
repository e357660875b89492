//! PDF rasterization for preview thumbnails.
//!
//! This module provides:
//! - The `RenderEngine` seam and the PDFium-backed engine
//! - Viewport geometry derived from the page's intrinsic size
//! - PNG thumbnails ready for inline embedding

mod renderer;
mod thumbnail;

pub use renderer::*;
pub use thumbnail::*;
