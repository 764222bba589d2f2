//! End-to-end integration tests for doc2podcast.
//!
//! These tests call the live Hugging Face inference API and Google Cloud
//! Text-to-Speech, and the PDF tests need the pdfium library. They are gated
//! behind the `E2E_ENABLED` environment variable so they do not run in CI
//! unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 HF_TOKEN=hf_... GOOGLE_TTS_API_KEY=... \
//!     cargo test --test e2e -- --nocapture
//!
//! PDF tests additionally look for `./test_cases/sample.pdf`.

use doc2podcast::{
    convert_to_file, extract_input, AudioEncoding, GoogleTtsOptions, GoogleTtsProvider,
    HuggingFaceModel, HuggingFaceOptions, LlmModel, LlmModelOptions, Pipeline, PodcastConfig,
    SummaryModel, TtsCredentials,
};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

/// Skip this test unless E2E_ENABLED is set *and* the file at `path` exists.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        e2e_skip_unless_enabled!();
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

fn live_pipeline(summarizer: Arc<dyn SummaryModel>, encoding: AudioEncoding) -> Pipeline {
    let credentials = TtsCredentials::from_env().expect("TTS credentials in the environment");
    let speech = GoogleTtsProvider::new(credentials, GoogleTtsOptions::default())
        .expect("valid TTS options");
    let config = PodcastConfig::builder()
        .encoding(encoding)
        .max_length(120)
        .min_length(30)
        .build()
        .expect("valid config");
    Pipeline::new(summarizer, Arc::new(speech), config)
}

fn bart() -> Arc<dyn SummaryModel> {
    Arc::new(HuggingFaceModel::new(HuggingFaceOptions::from_env()).expect("valid HF options"))
}

const ARTICLE: &str = "\
The city council approved a new public transport plan on Tuesday after months of debate. \
The plan adds three tram lines, extends night bus service to every district, and lowers \
the monthly pass price for students and retirees. Construction of the first tram line is \
scheduled to begin next spring and should take about two years. Council members who voted \
against the plan argued that the budget relies on optimistic ridership forecasts and on a \
regional grant that has not yet been confirmed. Supporters answered that traffic congestion \
already costs local businesses millions every year and that the grant application has strong \
backing from neighbouring towns. The mayor said the first public consultations on tram stop \
locations will be held next month, and residents can submit comments online until the end \
of the year.";

fn assert_audio(bytes: &[u8], encoding: AudioEncoding, context: &str) {
    assert!(bytes.len() > 1024, "[{context}] audio suspiciously short: {} bytes", bytes.len());
    match encoding {
        AudioEncoding::Mp3 => assert!(
            bytes.starts_with(b"ID3") || (bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0),
            "[{context}] not an MP3 stream"
        ),
        AudioEncoding::Linear16 | AudioEncoding::Mulaw | AudioEncoding::Alaw => {
            assert!(bytes.starts_with(b"RIFF"), "[{context}] not a WAV file")
        }
        AudioEncoding::OggOpus => assert!(bytes.starts_with(b"OggS"), "[{context}] not Ogg"),
    }
    println!("[{context}] ✓  {} bytes of audio", bytes.len());
}

// ── Extraction only (no remote calls) ────────────────────────────────────────

#[tokio::test]
async fn test_extract_pdf_sample() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));

    let text = extract_input(path.to_str().unwrap(), 30)
        .await
        .expect("extraction should succeed");

    assert!(text.word_count() > 20, "PDF text too short: {:?}", text.preview(200));
    println!("Extracted {} words: {}", text.word_count(), text.preview(300));
}

#[tokio::test]
async fn test_extract_nonexistent() {
    e2e_skip_unless_enabled!();

    let result = extract_input("/definitely/not/a/real/file.pdf", 5).await;
    assert!(result.is_err(), "extract_input() should fail for a missing file");
}

// ── Full conversions (need HF_TOKEN + Google TTS credentials) ─────────────────

#[tokio::test]
async fn test_convert_text_to_mp3() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("transport.txt");
    std::fs::write(&input, ARTICLE).unwrap();
    let out = dir.path().join("summary_podcast.mp3");

    let pipeline = live_pipeline(bart(), AudioEncoding::Mp3);
    let output = convert_to_file(input.to_str().unwrap(), &out, &pipeline)
        .await
        .expect("conversion should succeed");

    assert!(output.summary.word_count() <= 120);
    assert!(output.summary.word_count() > 5, "summary: {}", output.summary);
    assert_eq!(output.stats.summary_model_calls, 1);
    assert_audio(&std::fs::read(&out).unwrap(), AudioEncoding::Mp3, "txt→mp3");
    println!("Summary: {}", output.summary);
    println!("Stats: {:?}", output.stats);
}

#[tokio::test]
async fn test_convert_docx_to_wav() {
    e2e_skip_unless_enabled!();

    use docx_rs::{Docx, Paragraph, Run};
    let docx = ARTICLE.split(". ").fold(Docx::new(), |d, s| {
        let sentence = format!("{}.", s.trim_end_matches('.'));
        d.add_paragraph(Paragraph::new().add_run(Run::new().add_text(sentence)))
    });
    let mut buffer = Cursor::new(Vec::new());
    docx.build().pack(&mut buffer).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("transport.docx");
    std::fs::write(&input, buffer.into_inner()).unwrap();
    let out = dir.path().join("summary_podcast.wav");

    let pipeline = live_pipeline(bart(), AudioEncoding::Linear16);
    convert_to_file(input.to_str().unwrap(), &out, &pipeline)
        .await
        .expect("conversion should succeed");

    assert_audio(&std::fs::read(&out).unwrap(), AudioEncoding::Linear16, "docx→wav");
}

#[tokio::test]
async fn test_convert_pdf_sample() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("summary_podcast.ogg");

    let pipeline = live_pipeline(bart(), AudioEncoding::OggOpus);
    let output = convert_to_file(path.to_str().unwrap(), &out, &pipeline)
        .await
        .expect("conversion should succeed");

    assert_audio(&std::fs::read(&out).unwrap(), AudioEncoding::OggOpus, "pdf→ogg");
    println!("Summary: {}", output.summary);
}

#[tokio::test]
async fn test_convert_with_llm_summarizer() {
    e2e_skip_unless_enabled!();
    if std::env::var("OPENAI_API_KEY").is_err() {
        println!("SKIP — OPENAI_API_KEY not set");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("transport.txt");
    std::fs::write(&input, ARTICLE).unwrap();
    let out = dir.path().join("summary_podcast.mp3");

    let llm = LlmModel::new(LlmModelOptions {
        provider_name: Some("openai".into()),
        ..LlmModelOptions::default()
    });
    let pipeline = live_pipeline(Arc::new(llm), AudioEncoding::Mp3);
    let output = convert_to_file(input.to_str().unwrap(), &out, &pipeline)
        .await
        .expect("conversion should succeed");

    assert!(output.summary.word_count() <= 120);
    assert_audio(output.audio.bytes(), AudioEncoding::Mp3, "llm→mp3");
    println!("Summary: {}", output.summary);
}
