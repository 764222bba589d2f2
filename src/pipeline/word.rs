//! Word (`.docx`) text extraction via `docx-rs`.
//!
//! Paragraphs come out in document order, one per line. Tables are read row
//! by row with cells joined by `" | "` so that a narrated summary can still
//! pick up figures that only live in a table. Run formatting is discarded.

use crate::error::ExtractionError;
use tracing::debug;

/// Extract paragraph and table text, joined with `"\n"`.
pub fn extract_word_text(name: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractionError::CorruptDocument {
        name: name.to_string(),
        detail: format!("DOCX parse error: {e}"),
    })?;

    let mut lines: Vec<String> = Vec::new();
    for child in &docx.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(paragraph) => {
                lines.push(paragraph_text(paragraph));
            }
            docx_rs::DocumentChild::Table(table) => {
                lines.extend(table_rows(table));
            }
            _ => {}
        }
    }

    debug!("DOCX '{}': {} paragraphs/rows", name, lines.len());
    Ok(lines.join("\n"))
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut content = String::new();
    for para_child in &paragraph.children {
        if let docx_rs::ParagraphChild::Run(run) = para_child {
            for run_child in &run.children {
                match run_child {
                    docx_rs::RunChild::Text(text) => content.push_str(&text.text),
                    docx_rs::RunChild::Tab(_) => content.push(' '),
                    docx_rs::RunChild::Break(_) => content.push('\n'),
                    _ => {}
                }
            }
        }
    }
    content
}

fn table_rows(table: &docx_rs::Table) -> Vec<String> {
    let mut rows = Vec::new();
    for table_child in &table.rows {
        let docx_rs::TableChild::TableRow(row) = table_child;
        let mut cells: Vec<String> = Vec::new();
        for row_child in &row.cells {
            let docx_rs::TableRowChild::TableCell(cell) = row_child;
            let mut cell_text = String::new();
            for cell_child in &cell.children {
                if let docx_rs::TableCellContent::Paragraph(para) = cell_child {
                    let text = paragraph_text(para);
                    if !cell_text.is_empty() && !text.is_empty() {
                        cell_text.push(' ');
                    }
                    cell_text.push_str(&text);
                }
            }
            let cell_text = cell_text.trim().to_string();
            if !cell_text.is_empty() {
                cells.push(cell_text);
            }
        }
        if !cells.is_empty() {
            rows.push(cells.join(" | "));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn build_docx<F>(builder_fn: F) -> Vec<u8>
    where
        F: FnOnce(docx_rs::Docx) -> docx_rs::Docx,
    {
        let docx = builder_fn(docx_rs::Docx::new());
        let mut buffer = Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).expect("pack DOCX");
        buffer.into_inner()
    }

    #[test]
    fn paragraphs_in_document_order() {
        use docx_rs::*;
        let bytes = build_docx(|d| {
            d.add_paragraph(Paragraph::new().add_run(Run::new().add_text("First paragraph.")))
                .add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_text("Second "))
                        .add_run(Run::new().add_text("paragraph.").bold()),
                )
        });
        let text = extract_word_text("doc.docx", &bytes).unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn table_cells_are_joined() {
        use docx_rs::*;
        let bytes = build_docx(|d| {
            d.add_table(Table::new(vec![
                TableRow::new(vec![
                    TableCell::new()
                        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Year"))),
                    TableCell::new()
                        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Revenue"))),
                ]),
                TableRow::new(vec![
                    TableCell::new()
                        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("2024"))),
                    TableCell::new()
                        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("12M"))),
                ]),
            ]))
        });
        let text = extract_word_text("t.docx", &bytes).unwrap();
        assert!(text.contains("Year | Revenue"), "got: {text}");
        assert!(text.contains("2024 | 12M"), "got: {text}");
    }

    #[test]
    fn garbage_zip_is_corrupt() {
        let err = extract_word_text("bad.docx", b"PK\x03\x04not really a zip").unwrap_err();
        assert!(matches!(err, ExtractionError::CorruptDocument { .. }), "{err:?}");
    }
}
