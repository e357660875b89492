//! Thumbnail geometry and the engine seam.

use crate::error::{PreviewError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::DynamicImage;
use std::io::Cursor;

/// Upper bound on either edge of a rendered thumbnail, in pixels.
const MAX_VIEWPORT_EDGE: u32 = 10_000;

/// A capability that can rasterize one page of a document.
///
/// Implementations are shared read-only across render calls and are invoked
/// from the blocking pool.
pub trait RenderEngine: Send + Sync {
    /// Short engine name for diagnostics.
    fn name(&self) -> &str;

    /// Rasterize the 1-based `page_number` of `document` at `scale`.
    fn rasterize(&self, document: &[u8], page_number: u16, scale: f32) -> Result<Thumbnail>;
}

/// Pixel size of a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Viewport for a page of intrinsic size `width` x `height` (PDF points)
    /// at `scale`. Container bounds play no part here.
    pub fn at_scale(width: f32, height: f32, scale: f32) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PreviewError::Render(format!("invalid render scale {}", scale)));
        }
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(PreviewError::Render(format!(
                "invalid page size {}x{}",
                width, height
            )));
        }

        let scaled_width = (width * scale) as u32;
        let scaled_height = (height * scale) as u32;
        if scaled_width > MAX_VIEWPORT_EDGE || scaled_height > MAX_VIEWPORT_EDGE {
            return Err(PreviewError::Render(format!(
                "viewport {}x{} exceeds {} pixels",
                scaled_width, scaled_height, MAX_VIEWPORT_EDGE
            )));
        }

        Ok(Self {
            width: scaled_width.max(1),
            height: scaled_height.max(1),
        })
    }
}

/// Convert a 1-based page number to a 0-based index, checking the range.
pub fn page_index(page_number: u16, page_count: u16) -> Result<u16> {
    if page_number == 0 || page_number > page_count {
        return Err(PreviewError::PageOutOfRange {
            page: page_number,
            page_count,
        });
    }
    Ok(page_number - 1)
}

/// A rendered page, PNG-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl Thumbnail {
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| PreviewError::ImageEncode(e.to_string()))?;

        Ok(Self {
            width: image.width(),
            height: image.height(),
            png,
        })
    }

    /// The PNG as a `data:` URI for inline embedding.
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }
}
