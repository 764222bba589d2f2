//! PDF text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and parses synchronously. Running it on the blocking pool keeps the
//! Tokio workers free while a large document is parsed.
//!
//! A scanned PDF without an OCR layer parses fine but yields no text; the
//! caller turns that into [`ExtractionError::EmptyDocument`].

use crate::error::ExtractionError;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Environment variable naming an existing pdfium shared library.
pub const PDFIUM_LIB_PATH: &str = "PDFIUM_LIB_PATH";

/// Extract the text of every page, joined with `"\n"` in page order.
pub async fn extract_pdf_text(name: &str, bytes: Vec<u8>) -> Result<String, ExtractionError> {
    let name = name.to_string();
    tokio::task::spawn_blocking(move || extract_pdf_text_blocking(&name, &bytes))
        .await
        .map_err(|e| ExtractionError::Internal(format!("PDF task panicked: {e}")))?
}

/// Bind to pdfium: `PDFIUM_LIB_PATH` first, then the system library.
fn bind_pdfium() -> Result<Pdfium, ExtractionError> {
    let bindings = match std::env::var(PDFIUM_LIB_PATH) {
        Ok(path) if !path.trim().is_empty() => {
            debug!("Binding pdfium from {}", path);
            Pdfium::bind_to_library(path.trim())
        }
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ExtractionError::PdfEngineUnavailable(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

fn extract_pdf_text_blocking(name: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium.load_pdf_from_byte_slice(bytes, None).map_err(|e| {
        let err_str = format!("{e:?}");
        if err_str.contains("Password") || err_str.contains("password") {
            ExtractionError::PasswordRequired {
                name: name.to_string(),
            }
        } else {
            ExtractionError::CorruptDocument {
                name: name.to_string(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    let total = pages.len() as usize;
    info!("PDF '{}' loaded: {} pages", name, total);

    let mut texts = Vec::with_capacity(total);
    for (idx, page) in pages.iter().enumerate() {
        let text = page.text().map_err(|e| ExtractionError::CorruptDocument {
            name: name.to_string(),
            detail: format!("page {}: {e:?}", idx + 1),
        })?;
        let content = text.all();
        debug!("Page {}: {} chars", idx + 1, content.len());
        texts.push(content);
    }

    Ok(texts.join("\n"))
}
