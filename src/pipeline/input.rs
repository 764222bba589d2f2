//! Input resolution: turn a user-supplied path or URL into a [`RawDocument`].
//!
//! ## Why keep everything in memory?
//!
//! Every extractor works from a byte slice (pdfium can load from memory,
//! `docx-rs` reads from `&[u8]`), so there is no temp file to manage and
//! nothing to clean up if the process dies mid-conversion. The declared
//! format comes from the file extension, or from the `Content-Type` of a
//! download when the URL has no usable extension; the extractor checks the
//! content against it.

use crate::document::{DocumentFormat, RawDocument};
use crate::error::Doc2PodcastError;
use std::path::PathBuf;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to an in-memory document.
///
/// If the input is a URL it is downloaded; otherwise it is read from disk.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<RawDocument, Doc2PodcastError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else if input.trim().is_empty() {
        Err(Doc2PodcastError::InvalidInput {
            input: input.to_string(),
        })
    } else {
        read_local(input).await
    }
}

/// Read a local file, mapping the usual I/O failures to friendly errors.
async fn read_local(path_str: &str) -> Result<RawDocument, Doc2PodcastError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(Doc2PodcastError::FileNotFound { path });
    }
    if path.is_dir() {
        return Err(Doc2PodcastError::InvalidInput {
            input: path_str.to_string(),
        });
    }

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Doc2PodcastError::PermissionDenied { path });
        }
        Err(_) => return Err(Doc2PodcastError::FileNotFound { path }),
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path_str.to_string());
    let format = DocumentFormat::detect(&name, None);

    debug!(
        "Resolved local document: {} ({}, {} bytes)",
        path.display(),
        format,
        bytes.len()
    );
    Ok(RawDocument::new(name, format, bytes))
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<RawDocument, Doc2PodcastError> {
    info!("Downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Doc2PodcastError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_send_err = |e: reqwest::Error| {
        if e.is_timeout() {
            Doc2PodcastError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Doc2PodcastError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(map_send_err)?;

    if !response.status().is_success() {
        return Err(Doc2PodcastError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let filename = filename_from_url(url);
    let bytes = response.bytes().await.map_err(map_send_err)?;

    let format = DocumentFormat::detect(&filename, content_type.as_deref());
    info!(
        "Downloaded '{}' ({}, {} bytes)",
        filename,
        format,
        bytes.len()
    );

    Ok(RawDocument::new(filename, format, bytes.to_vec()))
}

/// Last path segment of the URL when it looks like a file name.
pub fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://example.com/papers/report.docx?dl=1"),
            "report.docx"
        );
        assert_eq!(filename_from_url("https://example.com/download"), "downloaded");
        assert_eq!(filename_from_url("https://example.com/"), "downloaded");
    }

    #[tokio::test]
    async fn local_file_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.TXT");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"hello there").unwrap();

        let doc = resolve_input(path.to_str().unwrap(), 5).await.unwrap();
        assert_eq!(doc.name(), "notes.TXT");
        assert_eq!(doc.format(), &DocumentFormat::PlainText);
        assert_eq!(doc.bytes(), b"hello there");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = resolve_input("/definitely/not/here.pdf", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Doc2PodcastError::FileNotFound { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn directory_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_input(dir.path().to_str().unwrap(), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Doc2PodcastError::InvalidInput { .. }), "{err:?}");
    }
}
