//! The pipeline's input value: raw bytes plus a declared format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Declared format of an uploaded document.
///
/// `Unsupported` keeps whatever tag the caller supplied so the extractor can
/// name it in the error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    /// `.doc` / `.docx`. Only the OOXML package format can be read.
    Word,
    Unsupported(String),
}

impl DocumentFormat {
    /// Map a file extension (with or without the dot, any case).
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "text" => DocumentFormat::PlainText,
            "pdf" => DocumentFormat::Pdf,
            "doc" | "docx" => DocumentFormat::Word,
            other => DocumentFormat::Unsupported(other.to_string()),
        }
    }

    /// Map a MIME type such as the `Content-Type` of a download.
    ///
    /// Parameters (`; charset=utf-8`) are ignored.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "text/plain" => DocumentFormat::PlainText,
            "application/pdf" => DocumentFormat::Pdf,
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                DocumentFormat::Word
            }
            other => DocumentFormat::Unsupported(other.to_string()),
        }
    }

    /// Infer the format from a file name, falling back to a content type.
    ///
    /// A known extension wins. Otherwise only a supplied content type (the
    /// `Content-Type` of a download) can name a supported format.
    pub fn detect(name: &str, content_type: Option<&str>) -> Self {
        let by_ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(DocumentFormat::from_extension);

        if let Some(fmt) = by_ext.as_ref().filter(|f| f.is_supported()) {
            return fmt.clone();
        }

        if let Some(ct) = content_type {
            let fmt = DocumentFormat::from_mime(ct);
            if fmt.is_supported() {
                return fmt;
            }
        }

        by_ext.unwrap_or_else(|| {
            DocumentFormat::Unsupported(content_type.unwrap_or("unknown").to_string())
        })
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, DocumentFormat::Unsupported(_))
    }

    /// Short human label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => "plain text",
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Word => "Word",
            DocumentFormat::Unsupported(_) => "unsupported",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Unsupported(tag) => write!(f, "{tag}"),
            other => f.write_str(other.label()),
        }
    }
}

/// An uploaded document: binary content plus its declared format.
#[derive(Clone)]
pub struct RawDocument {
    name: String,
    format: DocumentFormat,
    bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(name: impl Into<String>, format: DocumentFormat, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            format,
            bytes,
        }
    }

    /// Build a document whose format is inferred from `name`.
    pub fn from_named_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let format = DocumentFormat::detect(&name, None);
        Self::new(name, format, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> &DocumentFormat {
        &self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDocument")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_mapping() {
        assert_eq!(DocumentFormat::from_extension("TXT"), DocumentFormat::PlainText);
        assert_eq!(DocumentFormat::from_extension(".pdf"), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_extension("doc"), DocumentFormat::Word);
        assert_eq!(DocumentFormat::from_extension("docx"), DocumentFormat::Word);
        assert_eq!(
            DocumentFormat::from_extension("epub"),
            DocumentFormat::Unsupported("epub".into())
        );
    }

    #[test]
    fn mime_mapping_ignores_parameters() {
        assert_eq!(
            DocumentFormat::from_mime("text/plain; charset=utf-8"),
            DocumentFormat::PlainText
        );
        assert_eq!(
            DocumentFormat::from_mime(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            DocumentFormat::Word
        );
        assert!(!DocumentFormat::from_mime("image/png").is_supported());
    }

    #[test]
    fn detect_prefers_known_extension() {
        assert_eq!(
            DocumentFormat::detect("report.pdf", Some("application/octet-stream")),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn detect_falls_back_to_content_type() {
        assert_eq!(
            DocumentFormat::detect("download", Some("application/pdf")),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn detect_keeps_unknown_extension_tag() {
        assert_eq!(
            DocumentFormat::detect("slides.pptx", None),
            DocumentFormat::Unsupported("pptx".into())
        );
        assert_eq!(
            DocumentFormat::detect("noext", None),
            DocumentFormat::Unsupported("unknown".into())
        );
    }

    #[test]
    fn text_like_extensions_stay_unsupported() {
        for (name, tag) in [
            ("server.log", "log"),
            ("setup.ini", "ini"),
            ("notes.conf", "conf"),
            ("template.dot", "dot"),
        ] {
            assert_eq!(
                DocumentFormat::detect(name, None),
                DocumentFormat::Unsupported(tag.into()),
                "{name}"
            );
        }
        assert_eq!(
            DocumentFormat::detect("server.log", Some("text/plain")),
            DocumentFormat::PlainText
        );
    }

    #[test]
    fn named_bytes_infers_format() {
        let doc = RawDocument::from_named_bytes("hello.txt", b"hi".to_vec());
        assert_eq!(doc.format(), &DocumentFormat::PlainText);
        assert_eq!(doc.len(), 2);
        assert!(format!("{doc:?}").contains("bytes: 2"));
    }
}
