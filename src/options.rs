//! Preview options and caller overrides.

use serde::{Deserialize, Serialize};

/// Effective options for a single preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewOptions {
    /// Maximum width of the preview container in CSS pixels
    pub width: u32,
    /// Minimum height of the content area in CSS pixels (also the frame height)
    pub height: u32,
    /// Scale applied to the page's intrinsic size (1.0 = 72 DPI)
    pub render_scale: f32,
    pub show_download_affordance: bool,
    pub show_full_view_affordance: bool,
    /// 1-based page number to render
    pub preview_page_number: u16,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            width: 600,
            height: 800,
            render_scale: 1.2,
            show_download_affordance: true,
            show_full_view_affordance: true,
            preview_page_number: 1,
        }
    }
}

impl PreviewOptions {
    /// Apply caller overrides field by field. Unset fields keep their value.
    pub fn merged(&self, overrides: &PreviewOverrides) -> Self {
        Self {
            width: overrides.width.unwrap_or(self.width),
            height: overrides.height.unwrap_or(self.height),
            render_scale: overrides.render_scale.unwrap_or(self.render_scale),
            show_download_affordance: overrides
                .show_download_affordance
                .unwrap_or(self.show_download_affordance),
            show_full_view_affordance: overrides
                .show_full_view_affordance
                .unwrap_or(self.show_full_view_affordance),
            preview_page_number: overrides
                .preview_page_number
                .unwrap_or(self.preview_page_number),
        }
    }
}

/// Caller-supplied overrides. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub render_scale: Option<f32>,
    pub show_download_affordance: Option<bool>,
    pub show_full_view_affordance: Option<bool>,
    pub preview_page_number: Option<u16>,
}

impl PreviewOverrides {
    /// Parse overrides from a JSON object such as `{"previewPageNumber": 3}`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn page(mut self, page_number: u16) -> Self {
        self.preview_page_number = Some(page_number);
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.render_scale = Some(scale);
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn download(mut self, show: bool) -> Self {
        self.show_download_affordance = Some(show);
        self
    }

    pub fn full_view(mut self, show: bool) -> Self {
        self.show_full_view_affordance = Some(show);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_override_keeps_other_defaults() {
        let merged = PreviewOptions::default().merged(&PreviewOverrides::default().page(3));
        assert_eq!(merged.preview_page_number, 3);
        assert_eq!(merged.width, 600);
        assert_eq!(merged.height, 800);
        assert_eq!(merged.render_scale, 1.2);
        assert!(merged.show_download_affordance);
        assert!(merged.show_full_view_affordance);
    }

    #[test]
    fn test_empty_overrides_are_defaults() {
        let merged = PreviewOptions::default().merged(&PreviewOverrides::default());
        assert_eq!(merged, PreviewOptions::default());
    }

    #[test]
    fn test_overrides_from_camel_case_json() {
        let overrides =
            PreviewOverrides::from_json(r#"{"previewPageNumber": 3, "showDownloadAffordance": false}"#)
                .unwrap();
        let merged = PreviewOptions::default().merged(&overrides);
        assert_eq!(merged.preview_page_number, 3);
        assert!(!merged.show_download_affordance);
        assert!(merged.show_full_view_affordance);
        assert_eq!(merged.width, 600);
    }

    #[test]
    fn test_empty_json_object_is_no_override() {
        let overrides = PreviewOverrides::from_json("{}").unwrap();
        assert_eq!(overrides, PreviewOverrides::default());
    }
}
