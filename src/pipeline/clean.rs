//! Text cleanup: deterministic normalisation of extracted and spoken text.
//!
//! Extractors hand back text with the quirks of their source format: CRLF
//! line endings from Word, zero-width joiners and soft hyphens from PDFs,
//! words split across lines as `exam-\nple`, and page after page of blank
//! lines. None of that helps a summarization model, so [`clean_extracted`]
//! removes it before the text leaves the extraction stage.
//!
//! The summary goes through [`prepare_for_speech`] before synthesis. LLM
//! backends like to answer in Markdown, and a TTS voice reading out "hash
//! hash Summary" or "asterisk" is worse than useless.
//!
//! Every rule is a pure `&str → String` function and is tested on its own.

use once_cell::sync::Lazy;
use regex::Regex;

/// Normalise text coming out of an extractor.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, …)
/// 3. Replace no-break spaces and tabs with plain spaces
/// 4. Re-join words hyphenated across a line break
/// 5. Trim trailing whitespace per line
/// 6. Collapse runs of blank lines down to one
/// 7. Trim the whole text
pub fn clean_extracted(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = normalise_spaces(&s);
    let s = join_hyphenated_breaks(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

/// Turn a summary into a single line of plain prose for the TTS voice.
///
/// Rules (applied in order):
/// 1. Strip invisible Unicode
/// 2. Drop Markdown heading markers and list bullets at line starts
/// 3. Drop emphasis markers (`**`, `__`, `*`, backticks)
/// 4. Remove spaces before punctuation (`word .` → `word.`)
/// 5. Collapse all whitespace to single spaces
pub fn prepare_for_speech(input: &str) -> String {
    let s = remove_invisible_chars(input);
    let s = strip_line_markers(&s);
    let s = strip_emphasis(&s);
    let s = tighten_punctuation(&s);
    collapse_whitespace(&s)
}

/// Collapse every whitespace run (including newlines) to one space.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Rule: Normalise line endings ─────────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule: Remove invisible Unicode characters ────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{0000}',
        ],
        "",
    )
}

// ── Rule: No-break spaces, tabs and form feeds ───────────────────────────────
//
// pdfium emits a form feed between some pages; Word uses NBSP liberally.

fn normalise_spaces(input: &str) -> String {
    input.replace(['\u{00A0}', '\u{202F}', '\t'], " ").replace('\u{000C}', "\n")
}

// ── Rule: Re-join hyphenated line breaks ─────────────────────────────────────

static RE_HYPHEN_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{L})-[ ]*\n[ ]*(\p{Ll})").unwrap());

fn join_hyphenated_breaks(input: &str) -> String {
    RE_HYPHEN_BREAK.replace_all(input, "$1$2").to_string()
}

// ── Rule: Trim trailing whitespace per line ──────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule: Collapse blank lines ───────────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule: Markdown line markers ──────────────────────────────────────────────

static RE_LINE_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ ]*(?:#{1,6}[ ]+|[-*+•][ ]+|>[ ]?)").unwrap());

fn strip_line_markers(input: &str) -> String {
    RE_LINE_MARKERS.replace_all(input, "").to_string()
}

// ── Rule: Emphasis markers ───────────────────────────────────────────────────

static RE_EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*|__|`|\*").unwrap());

fn strip_emphasis(input: &str) -> String {
    RE_EMPHASIS.replace_all(input, "").to_string()
}

// ── Rule: Space before punctuation ───────────────────────────────────────────

static RE_SPACE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ ]+([.,;:!?])").unwrap());

fn tighten_punctuation(input: &str) -> String {
    RE_SPACE_PUNCT.replace_all(input, "$1").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
