//! Document location handling.
//!
//! A document URL is either a remote `http(s)://` URL, a `file://` URL, or a
//! path relative to the site root the handler was configured with.

use crate::error::{PreviewError, Result};
use std::fmt;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

/// Documents larger than this are not fetched for thumbnail rendering.
pub const MAX_DOCUMENT_BYTES: u64 = 64 * 1024 * 1024;

/// Where a document's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentLocation {
    Remote(Url),
    Local(PathBuf),
}

impl fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentLocation::Remote(url) => write!(f, "{}", url),
            DocumentLocation::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

impl DocumentLocation {
    /// Resolve a document URL against `base_dir`.
    pub fn resolve(document_url: &str, base_dir: &Path) -> Result<Self> {
        let trimmed = document_url.trim();
        if trimmed.is_empty() {
            return Err(PreviewError::InvalidUrl("empty document URL".to_string()));
        }

        match Url::parse(trimmed) {
            // Single-letter schemes are Windows drive letters, not URLs
            Ok(url) if url.scheme().len() == 1 => Ok(DocumentLocation::Local(PathBuf::from(trimmed))),
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(DocumentLocation::Remote(url)),
                "file" => url_to_file_path(&url)
                    .map(DocumentLocation::Local)
                    .ok_or_else(|| PreviewError::InvalidUrl(trimmed.to_string())),
                other => Err(PreviewError::InvalidUrl(format!(
                    "unsupported scheme '{}' in {}",
                    other, trimmed
                ))),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => Self::relative(trimmed, base_dir),
            Err(e) => Err(PreviewError::InvalidUrl(format!("{}: {}", trimmed, e))),
        }
    }

    /// Site-relative URLs stay under `base_dir`: a leading `/` means the site
    /// root, and `..` may not climb above it.
    fn relative(url: &str, base_dir: &Path) -> Result<Self> {
        let path = strip_query(url);
        // Handle URL-encoded paths (e.g., spaces as %20)
        let decoded = urlencoding::decode(path)
            .map(|d| d.into_owned())
            .unwrap_or_else(|_| path.to_string());

        let mut resolved = PathBuf::new();
        for component in Path::new(decoded.trim_start_matches(['/', '\\'])).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::ParentDir => {
                    if !resolved.pop() {
                        return Err(PreviewError::InvalidUrl(format!(
                            "{} escapes the site root",
                            url
                        )));
                    }
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }

        Ok(DocumentLocation::Local(base_dir.join(resolved)))
    }

    /// Read the whole document. Blocking.
    pub fn fetch(&self) -> Result<Vec<u8>> {
        self.fetch_with_limit(MAX_DOCUMENT_BYTES)
    }

    /// Read the whole document, refusing anything over `max_bytes`. Blocking.
    pub fn fetch_with_limit(&self, max_bytes: u64) -> Result<Vec<u8>> {
        match self {
            DocumentLocation::Remote(url) => {
                let response = ureq::get(url.as_str())
                    .call()
                    .map_err(|e| PreviewError::DocumentLoad(format!("{}: {}", url, e)))?;

                let mut bytes = Vec::new();
                response
                    .into_reader()
                    .take(max_bytes.saturating_add(1))
                    .read_to_end(&mut bytes)
                    .map_err(|e| PreviewError::DocumentLoad(format!("{}: {}", url, e)))?;

                if bytes.len() as u64 > max_bytes {
                    return Err(PreviewError::DocumentLoad(format!(
                        "{}: larger than {} bytes",
                        url, max_bytes
                    )));
                }
                debug!(url = %url, bytes = bytes.len(), "fetched remote document");
                Ok(bytes)
            }
            DocumentLocation::Local(path) => {
                let load_error =
                    |e: std::io::Error| PreviewError::DocumentLoad(format!("{}: {}", path.display(), e));
                let size = std::fs::metadata(path).map_err(load_error)?.len();
                if size > max_bytes {
                    return Err(PreviewError::DocumentLoad(format!(
                        "{}: larger than {} bytes",
                        path.display(),
                        max_bytes
                    )));
                }
                std::fs::read(path).map_err(load_error)
            }
        }
    }

    /// Lightweight existence probe. Remote documents get a `HEAD` request,
    /// so no body is transferred. Any failure reads as "does not exist".
    pub fn exists(&self) -> bool {
        match self {
            DocumentLocation::Remote(url) => match ureq::head(url.as_str()).call() {
                Ok(response) => (200..300).contains(&response.status()),
                Err(ureq::Error::Status(code, _)) => {
                    debug!(url = %url, status = code, "document probe returned error status");
                    false
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "error checking document existence");
                    false
                }
            },
            DocumentLocation::Local(path) => path.is_file(),
        }
    }
}

/// Display name for a document: the last path segment of its URL.
///
/// Query strings and fragments are dropped and the segment is
/// percent-decoded, so `files/My%20CV.pdf?v=2` shows as `My CV.pdf`. Trailing
/// slashes are ignored (`https://example.com/` shows as `example.com`); a
/// URL with no segment at all shows as itself.
pub fn file_name(document_url: &str) -> String {
    let path = strip_query(document_url.trim());
    let segment = path
        .trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path);

    if segment.is_empty() {
        return document_url.trim().to_string();
    }

    urlencoding::decode(segment)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

fn strip_query(url: &str) -> &str {
    url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url)
}

/// Convert a file:// URL to a path.
fn url_to_file_path(url: &Url) -> Option<PathBuf> {
    url.to_file_path().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_is_last_segment() {
        assert_eq!(file_name("resume.pdf"), "resume.pdf");
        assert_eq!(file_name("assets/docs/resume.pdf"), "resume.pdf");
        assert_eq!(
            file_name("https://example.com/files/My%20Resume.pdf?v=2#page=1"),
            "My Resume.pdf"
        );
    }

    #[test]
    fn test_file_name_edge_cases() {
        assert_eq!(file_name("https://example.com/"), "example.com");
        assert_eq!(file_name("/"), "/");
    }

    #[test]
    fn test_resolve_relative_against_base() {
        let base = Path::new("/srv/site");
        assert_eq!(
            DocumentLocation::resolve("docs/My%20CV.pdf", base).unwrap(),
            DocumentLocation::Local(PathBuf::from("/srv/site/docs/My CV.pdf"))
        );
    }

    #[test]
    fn test_resolve_site_root_urls_under_base() {
        let base = Path::new("/srv/site");
        assert_eq!(
            DocumentLocation::resolve("/assets/resume.pdf", base).unwrap(),
            DocumentLocation::Local(PathBuf::from("/srv/site/assets/resume.pdf"))
        );
        assert_eq!(
            DocumentLocation::resolve("./docs/../assets/resume.pdf", base).unwrap(),
            DocumentLocation::Local(PathBuf::from("/srv/site/assets/resume.pdf"))
        );
    }

    #[test]
    fn test_resolve_rejects_paths_above_base() {
        let base = Path::new("/srv/site");
        assert!(matches!(
            DocumentLocation::resolve("../../etc/hostname", base),
            Err(PreviewError::InvalidUrl(_))
        ));
        assert!(matches!(
            DocumentLocation::resolve("/assets/../../secret.pdf", base),
            Err(PreviewError::InvalidUrl(_))
        ));
        assert!(matches!(
            DocumentLocation::resolve("assets/%2E%2E/%2E%2E/secret.pdf", base),
            Err(PreviewError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_site_root_url_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/resume.pdf"), b"%PDF-1.7").unwrap();

        assert!(DocumentLocation::resolve("assets/resume.pdf", dir.path()).unwrap().exists());
        assert!(DocumentLocation::resolve("/assets/resume.pdf", dir.path()).unwrap().exists());
    }

    #[test]
    fn test_fetch_limit_applies_to_local_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.pdf"), vec![b'%'; 2048]).unwrap();
        let location = DocumentLocation::resolve("big.pdf", dir.path()).unwrap();

        assert!(matches!(
            location.fetch_with_limit(1024),
            Err(PreviewError::DocumentLoad(_))
        ));
        assert_eq!(location.fetch_with_limit(2048).unwrap().len(), 2048);
    }

    #[test]
    fn test_fetch_limit_applies_to_remote_bodies() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        std::thread::spawn(move || {
            for request in server.incoming_requests() {
                let _ = request.respond(tiny_http::Response::from_data(vec![b'%'; 2048]));
            }
        });

        let url = format!("http://127.0.0.1:{}/big.pdf", port);
        let location = DocumentLocation::resolve(&url, Path::new(".")).unwrap();

        let err = location.fetch_with_limit(1024).unwrap_err();
        assert!(err.to_string().contains("larger than 1024 bytes"));
        assert_eq!(location.fetch_with_limit(4096).unwrap().len(), 2048);
    }

    #[test]
    fn test_resolve_remote_and_file_urls() {
        let base = Path::new("/srv/site");
        match DocumentLocation::resolve("https://example.com/resume.pdf", base).unwrap() {
            DocumentLocation::Remote(url) => assert_eq!(url.host_str(), Some("example.com")),
            other => panic!("expected remote location, got {:?}", other),
        }

        #[cfg(unix)]
        assert_eq!(
            DocumentLocation::resolve("file:///tmp/resume.pdf", base).unwrap(),
            DocumentLocation::Local(PathBuf::from("/tmp/resume.pdf"))
        );
    }

    #[test]
    fn test_resolve_rejects_empty_and_unsupported() {
        let base = Path::new(".");
        assert!(matches!(
            DocumentLocation::resolve("  ", base),
            Err(PreviewError::InvalidUrl(_))
        ));
        assert!(matches!(
            DocumentLocation::resolve("ftp://example.com/resume.pdf", base),
            Err(PreviewError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_local_exists_and_fetch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("resume.pdf"), b"%PDF-1.7").unwrap();

        let present = DocumentLocation::resolve("resume.pdf", dir.path()).unwrap();
        assert!(present.exists());
        assert_eq!(present.fetch().unwrap(), b"%PDF-1.7");

        let missing = DocumentLocation::resolve("missing.pdf", dir.path()).unwrap();
        assert!(!missing.exists());
        assert!(matches!(missing.fetch(), Err(PreviewError::DocumentLoad(_))));
    }
}
