//! Document extraction: `RawDocument` → `ExtractedText`.
//!
//! The declared format picks the parser, but the bytes are sniffed first so
//! a mislabelled upload (a PDF renamed to `.txt`, a legacy `.doc` that is not
//! an OOXML package) fails with a clear [`ExtractionError::FormatMismatch`]
//! instead of a parser stack trace.

use crate::document::{DocumentFormat, RawDocument};
use crate::error::ExtractionError;
use crate::output::ExtractedText;
use crate::pipeline::{clean, pdf, word};
use tracing::{debug, info};

/// What the first bytes of a buffer say it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    Pdf,
    /// ZIP container, which is what `.docx` is.
    Zip,
    /// OLE2 compound file, the legacy binary `.doc` format.
    Ole2,
    Unknown,
}

impl Signature {
    fn describe(&self) -> &'static str {
        match self {
            Signature::Pdf => "a PDF file",
            Signature::Zip => "a ZIP archive",
            Signature::Ole2 => "a legacy binary Word (.doc) file; re-save it as .docx",
            Signature::Unknown => "not recognised",
        }
    }
}

/// Identify a buffer by its magic bytes.
pub fn sniff(bytes: &[u8]) -> Signature {
    if bytes.starts_with(b"%PDF") {
        Signature::Pdf
    } else if bytes.starts_with(b"PK\x03\x04") {
        Signature::Zip
    } else if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]) {
        Signature::Ole2
    } else {
        Signature::Unknown
    }
}

/// Extract plain text from a document.
///
/// # Errors
/// - [`ExtractionError::UnsupportedFormat`] for any format tag other than
///   plain text, PDF or Word
/// - [`ExtractionError::FormatMismatch`] when the content contradicts the tag
/// - [`ExtractionError::EmptyDocument`] when nothing readable remains after cleanup
pub async fn extract(doc: &RawDocument) -> Result<ExtractedText, ExtractionError> {
    let name = doc.name();
    let signature = sniff(doc.bytes());
    debug!(
        "Extracting '{}' ({}, {} bytes, signature {:?})",
        name,
        doc.format(),
        doc.len(),
        signature
    );

    let raw = match doc.format() {
        DocumentFormat::Unsupported(tag) => {
            return Err(ExtractionError::UnsupportedFormat {
                format: tag.clone(),
            });
        }
        DocumentFormat::PlainText => {
            if matches!(signature, Signature::Pdf | Signature::Zip | Signature::Ole2) {
                return Err(mismatch(doc, signature));
            }
            decode_plain_text(name, doc.bytes())?
        }
        DocumentFormat::Pdf => {
            if signature != Signature::Pdf {
                return Err(mismatch(doc, signature));
            }
            pdf::extract_pdf_text(name, doc.bytes().to_vec()).await?
        }
        DocumentFormat::Word => {
            if signature != Signature::Zip {
                return Err(mismatch(doc, signature));
            }
            word::extract_word_text(name, doc.bytes())?
        }
    };

    let cleaned = clean::clean_extracted(&raw);
    let text = ExtractedText::new(cleaned).ok_or_else(|| ExtractionError::EmptyDocument {
        name: name.to_string(),
    })?;

    info!(
        "Extracted {} chars / {} words from '{}'",
        text.char_count(),
        text.word_count(),
        name
    );
    Ok(text)
}

fn mismatch(doc: &RawDocument, signature: Signature) -> ExtractionError {
    ExtractionError::FormatMismatch {
        name: doc.name().to_string(),
        declared: doc.format().label(),
        detail: signature.describe().to_string(),
    }
}

/// Decode UTF-8 text, dropping a leading byte-order mark.
fn decode_plain_text(name: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| ExtractionError::InvalidEncoding {
            name: name.to_string(),
            detail: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, format: DocumentFormat, bytes: &[u8]) -> RawDocument {
        RawDocument::new(name, format, bytes.to_vec())
    }

    #[test]
    fn sniff_signatures() {
        assert_eq!(sniff(b"%PDF-1.7\n"), Signature::Pdf);
        assert_eq!(sniff(b"PK\x03\x04rest"), Signature::Zip);
        assert_eq!(
            sniff(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0]),
            Signature::Ole2
        );
        assert_eq!(sniff(b"hello"), Signature::Unknown);
        assert_eq!(sniff(b""), Signature::Unknown);
    }

    #[tokio::test]
    async fn plain_text_is_decoded_and_cleaned() {
        let d = doc(
            "hello.txt",
            DocumentFormat::PlainText,
            b"\xEF\xBB\xBFThe quick brown fox...\r\n",
        );
        let text = extract(&d).await.unwrap();
        assert_eq!(text.as_str(), "The quick brown fox...");
    }

    #[tokio::test]
    async fn whitespace_only_text_is_empty_document() {
        let d = doc("blank.txt", DocumentFormat::PlainText, b"  \n\t\r\n ");
        let err = extract(&d).await.unwrap_err();
        assert!(matches!(err, ExtractionError::EmptyDocument { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn invalid_utf8_is_rejected() {
        let d = doc("latin1.txt", DocumentFormat::PlainText, b"caf\xE9");
        let err = extract(&d).await.unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidEncoding { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn unsupported_tag_is_rejected() {
        let d = doc("deck.pptx", DocumentFormat::Unsupported("pptx".into()), b"PK\x03\x04");
        let err = extract(&d).await.unwrap_err();
        match err {
            ExtractionError::UnsupportedFormat { format } => assert_eq!(format, "pptx"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn pdf_tag_without_pdf_magic_is_mismatch() {
        let d = doc("fake.pdf", DocumentFormat::Pdf, b"just text");
        let err = extract(&d).await.unwrap_err();
        assert!(matches!(err, ExtractionError::FormatMismatch { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn pdf_bytes_labelled_as_text_is_mismatch() {
        let d = doc("renamed.txt", DocumentFormat::PlainText, b"%PDF-1.4 ...");
        let err = extract(&d).await.unwrap_err();
        assert!(err.to_string().contains("a PDF file"), "{err}");
    }

    #[tokio::test]
    async fn legacy_doc_is_mismatch_with_hint() {
        let d = doc(
            "old.doc",
            DocumentFormat::Word,
            &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0, 0],
        );
        let err = extract(&d).await.unwrap_err();
        assert!(err.to_string().contains("re-save it as .docx"), "{err}");
    }
}
