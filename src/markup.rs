//! Preview UI and its HTML form.

use crate::options::PreviewOptions;
use crate::pdf::Thumbnail;
use crate::source::file_name;
use std::fmt::Write as _;

/// What fills the content area of a preview.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewBody {
    /// Engine-rendered page image
    Rendered(Thumbnail),
    /// Embedded viewer frame pointing straight at the document
    Fallback { src: String },
}

/// A complete preview: header strip plus one content body.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub document_url: String,
    pub file_name: String,
    pub download_link: Option<String>,
    pub full_view_link: Option<String>,
    /// Container max-width in CSS pixels
    pub width: u32,
    /// Content min-height (and frame height) in CSS pixels
    pub height: u32,
    pub body: PreviewBody,
}

impl Preview {
    pub fn new(document_url: &str, options: &PreviewOptions, body: PreviewBody) -> Self {
        let link = || document_url.to_string();
        Self {
            document_url: document_url.to_string(),
            file_name: file_name(document_url),
            download_link: options.show_download_affordance.then(link),
            full_view_link: options.show_full_view_affordance.then(link),
            width: options.width,
            height: options.height,
            body,
        }
    }

    pub fn fallback(document_url: &str, options: &PreviewOptions) -> Self {
        Self::new(
            document_url,
            options,
            PreviewBody::Fallback {
                src: document_url.to_string(),
            },
        )
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.body, PreviewBody::Fallback { .. })
    }

    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(2048);

        let _ = write!(
            html,
            "<div class=\"pdf-preview-container\" style=\"border: 1px solid #ddd; \
             border-radius: 5px; overflow: hidden; background: #f9f9f9; \
             max-width: {}px; margin: 0 auto;\">",
            self.width
        );

        html.push_str(
            "<div class=\"pdf-preview-header\" style=\"background: #252122; color: white; \
             padding: 10px 15px; display: flex; justify-content: space-between; \
             align-items: center; font-size: 14px;\">",
        );
        let _ = write!(html, "<span>📄 {}</span>", escape_html(&self.file_name));

        html.push_str("<div class=\"pdf-actions\">");
        if let Some(href) = &self.download_link {
            let _ = write!(
                html,
                "<a href=\"{}\" download class=\"pdf-action-btn\" style=\"color: #03bafc; \
                 text-decoration: none; margin-right: 10px; font-size: 12px;\">⬇ Download</a>",
                escape_html(href)
            );
        }
        if let Some(href) = &self.full_view_link {
            let _ = write!(
                html,
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"pdf-action-btn\" \
                 style=\"color: #03bafc; text-decoration: none; font-size: 12px;\">🔍 Full View</a>",
                escape_html(href)
            );
        }
        html.push_str("</div></div>");

        let _ = write!(
            html,
            "<div class=\"pdf-preview-content\" style=\"background: white; display: flex; \
             justify-content: center; align-items: center; min-height: {}px;\">",
            self.height
        );
        match &self.body {
            PreviewBody::Rendered(thumbnail) => {
                // Clicking the thumbnail opens the full document in a new tab
                let _ = write!(
                    html,
                    "<div class=\"pdf-preview-canvas\" style=\"display: flex; \
                     justify-content: center; align-items: center; padding: 20px;\">\
                     <a href=\"{}\" target=\"_blank\" rel=\"noopener\">\
                     <img src=\"{}\" width=\"{}\" height=\"{}\" alt=\"Preview of {}\" \
                     style=\"cursor: pointer; max-width: 100%; height: auto;\"></a></div>",
                    escape_html(&self.document_url),
                    thumbnail.data_uri(),
                    thumbnail.width,
                    thumbnail.height,
                    escape_html(&self.file_name)
                );
            }
            PreviewBody::Fallback { src } => {
                let _ = write!(
                    html,
                    "<iframe src=\"{}\" style=\"width: 100%; height: {}px; border: none;\" \
                     title=\"PDF Preview\"></iframe>",
                    escape_html(src),
                    self.height
                );
            }
        }
        html.push_str("</div></div>");

        html
    }
}

/// Escape HTML entities for safe embedding.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
