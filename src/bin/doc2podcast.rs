//! CLI binary for doc2podcast.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to a `PodcastConfig` plus backends, runs one conversion, and
//! writes the audio file.

use anyhow::{Context, Result};
use clap::Parser;
use doc2podcast::{
    convert_to_file, extract_input, AudioEncoding, ConversionProgressCallback, ConversionState,
    GoogleTtsOptions, GoogleTtsProvider, HuggingFaceModel, HuggingFaceOptions, LlmModel,
    LlmModelOptions, LongInputPolicy, Pipeline, PipelineStage, PodcastConfig, ProgressCallback,
    SpeechProvider, SummaryModel, TtsCredentials, VoiceGender,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Characters shown by `--extract-only --preview`.
const PREVIEW_CHARS: usize = 1500;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one spinner for the running stage, and a log
/// line with the elapsed time as each stage completes.
struct CliProgressCallback {
    bar: ProgressBar,
    stage_started: Mutex<Option<(PipelineStage, Instant)>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            stage_started: Mutex::new(None),
        })
    }

    fn finish_stage(&self) {
        if let Some((stage, start)) = self.stage_started.lock().unwrap().take() {
            self.bar.println(format!(
                "  {} {:<14} {}",
                green("✓"),
                stage.to_string(),
                dim(&format!("{:.1}s", start.elapsed().as_secs_f64())),
            ));
        }
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_state(&self, state: ConversionState) {
        match state {
            ConversionState::Received => {}
            ConversionState::Extracted
            | ConversionState::Summarized
            | ConversionState::Synthesized => self.finish_stage(),
            ConversionState::Delivered => self.bar.finish_and_clear(),
        }
    }

    fn on_stage_start(&self, stage: PipelineStage) {
        let (prefix, msg) = match stage {
            PipelineStage::Extraction => ("Extracting", "reading document text…"),
            PipelineStage::Summarization => ("Summarizing", "waiting for the model…"),
            PipelineStage::Synthesis => ("Speaking", "synthesizing audio…"),
        };
        *self.stage_started.lock().unwrap() = Some((stage, Instant::now()));
        self.bar.set_prefix(prefix);
        self.bar.set_message(msg);
    }

    fn on_chunk_synthesized(&self, index: usize, total: usize) {
        self.bar.set_message(format!("chunk {index}/{total}"));
    }

    fn on_failed(&self, stage: PipelineStage, error: &str) {
        self.stage_started.lock().unwrap().take();
        let first_line = error.lines().next().unwrap_or(error);
        self.bar
            .println(format!("  {} {:<14} {}", red("✗"), stage.to_string(), red(first_line)));
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarize a PDF and write summary_podcast.mp3
  doc2podcast report.pdf

  # Word document, custom output file, male voice, slightly faster
  doc2podcast notes.docx -o notes.mp3 --gender male --speaking-rate 1.15

  # Long book: summarize in chunks instead of truncating
  doc2podcast --chunked book.txt

  # Use an LLM instead of BART
  doc2podcast --summarizer llm --provider openai --model gpt-4.1-mini paper.pdf

  # Preview the extracted text (no credentials needed)
  doc2podcast --extract-only --preview https://example.com/whitepaper.pdf

  # JSON summary + stats
  doc2podcast --json report.pdf > result.json

SUPPORTED INPUTS:
  .txt (UTF-8), .pdf, .docx (and .doc files saved in the OOXML format)

ENVIRONMENT VARIABLES:
  GOOGLE_CREDENTIALS_JSON         Service-account JSON content
  GOOGLE_APPLICATION_CREDENTIALS  Path to a service-account JSON file
  GOOGLE_TTS_API_KEY              API key for Cloud Text-to-Speech
  GOOGLE_ACCESS_TOKEN             Pre-minted OAuth2 access token
  HF_TOKEN                        Hugging Face access token
  DOC2PODCAST_SUMMARIZER          huggingface (default) or llm
  DOC2PODCAST_MODEL               Summarization model id
  OPENAI_API_KEY, ANTHROPIC_API_KEY, …  LLM provider keys (--summarizer llm)
  EDGEQUAKE_LLM_PROVIDER          LLM provider override
  EDGEQUAKE_MODEL                 LLM model override
  PDFIUM_LIB_PATH                 Path to libpdfium (otherwise the system library)

SETUP:
  1. Set TTS credentials:  export GOOGLE_TTS_API_KEY=...
  2. Set a model token:    export HF_TOKEN=hf_...
  3. Convert:              doc2podcast report.pdf
"#;

/// Turn a document into a narrated audio summary.
#[derive(Parser, Debug)]
#[command(
    name = "doc2podcast",
    version,
    about = "Turn a document (TXT, PDF, Word) into a narrated audio summary",
    long_about = "Extract the text of a TXT, PDF or Word document, summarize it with an \
abstractive model (BART on Hugging Face, or any LLM via edgequake-llm), and read the summary \
aloud with Google Cloud Text-to-Speech.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local document path or HTTP/HTTPS URL.
    input: String,

    /// Write audio to this file. Default: summary_podcast.<ext>.
    #[arg(short, long, env = "DOC2PODCAST_OUTPUT")]
    output: Option<PathBuf>,

    // ── Summarizer ──────────────────────────────────────────────────────
    /// Summarization backend.
    #[arg(long, env = "DOC2PODCAST_SUMMARIZER", value_enum, default_value = "huggingface")]
    summarizer: SummarizerArg,

    /// Summarization model id (Hugging Face repo or LLM model).
    #[arg(long, env = "DOC2PODCAST_MODEL")]
    model: Option<String>,

    /// LLM provider for --summarizer llm: openai, anthropic, gemini, ollama, …
    #[arg(long, env = "EDGEQUAKE_LLM_PROVIDER")]
    provider: Option<String>,

    /// Hugging Face access token.
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    hf_token: Option<String>,

    /// Maximum summary length in words.
    #[arg(long, env = "DOC2PODCAST_MAX_LENGTH", default_value_t = 150)]
    max_length: usize,

    /// Minimum summary length in words.
    #[arg(long, env = "DOC2PODCAST_MIN_LENGTH", default_value_t = 40)]
    min_length: usize,

    /// Fail instead of truncating text longer than the model window.
    #[arg(long, env = "DOC2PODCAST_NO_TRUNCATION")]
    no_truncation: bool,

    /// Summarize long documents chunk by chunk instead of truncating.
    #[arg(long, env = "DOC2PODCAST_CHUNKED")]
    chunked: bool,

    /// Model input window in characters.
    #[arg(long, env = "DOC2PODCAST_MAX_INPUT_CHARS", default_value_t = 4096)]
    max_input_chars: usize,

    /// Per-call summarization timeout in seconds.
    #[arg(long, env = "DOC2PODCAST_SUMMARY_TIMEOUT", default_value_t = 120)]
    summary_timeout: u64,

    // ── Voice ───────────────────────────────────────────────────────────
    /// BCP-47 language code of the voice.
    #[arg(long, env = "DOC2PODCAST_LANGUAGE", default_value = "en-US")]
    language: String,

    /// Exact voice name, e.g. en-US-Neural2-F.
    #[arg(long, env = "DOC2PODCAST_VOICE")]
    voice: Option<String>,

    /// Voice gender.
    #[arg(long, env = "DOC2PODCAST_GENDER", value_enum, default_value = "female")]
    gender: GenderArg,

    /// Audio encoding of the output file.
    #[arg(long, env = "DOC2PODCAST_ENCODING", value_enum, default_value = "mp3")]
    encoding: EncodingArg,

    /// Speaking rate (0.25–4.0).
    #[arg(long, env = "DOC2PODCAST_SPEAKING_RATE", default_value_t = 1.0)]
    speaking_rate: f32,

    /// Pitch in semitones (-20.0–20.0).
    #[arg(long, env = "DOC2PODCAST_PITCH", default_value_t = 0.0, allow_negative_numbers = true)]
    pitch: f32,

    /// Output sample rate in Hz (provider default when unset).
    #[arg(long, env = "DOC2PODCAST_SAMPLE_RATE")]
    sample_rate: Option<u32>,

    /// Per-request TTS timeout in seconds.
    #[arg(long, env = "DOC2PODCAST_TTS_TIMEOUT", default_value_t = 60)]
    tts_timeout: u64,

    // ── Output & logging ────────────────────────────────────────────────
    /// Print the extracted text only; no model or TTS call.
    #[arg(long)]
    extract_only: bool,

    /// With --extract-only, print only the first 1500 characters.
    #[arg(long, requires = "extract_only")]
    preview: bool,

    /// Output structured JSON (summary + stats) instead of plain text.
    #[arg(long, env = "DOC2PODCAST_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "DOC2PODCAST_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2PODCAST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOC2PODCAST_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, env = "DOC2PODCAST_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum SummarizerArg {
    Huggingface,
    Llm,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum GenderArg {
    Female,
    Male,
    Neutral,
}

impl From<GenderArg> for VoiceGender {
    fn from(v: GenderArg) -> Self {
        match v {
            GenderArg::Female => VoiceGender::Female,
            GenderArg::Male => VoiceGender::Male,
            GenderArg::Neutral => VoiceGender::Neutral,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum EncodingArg {
    Mp3,
    Linear16,
    OggOpus,
    Mulaw,
    Alaw,
}

impl From<EncodingArg> for AudioEncoding {
    fn from(v: EncodingArg) -> Self {
        match v {
            EncodingArg::Mp3 => AudioEncoding::Mp3,
            EncodingArg::Linear16 => AudioEncoding::Linear16,
            EncodingArg::OggOpus => AudioEncoding::OggOpus,
            EncodingArg::Mulaw => AudioEncoding::Mulaw,
            EncodingArg::Alaw => AudioEncoding::Alaw,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // stage lines provide all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.extract_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let text = extract_input(&cli.input, cli.download_timeout)
            .await
            .context("Failed to extract document text")?;

        let shown = if cli.preview {
            text.preview(PREVIEW_CHARS)
        } else {
            text.as_str().to_string()
        };

        if cli.json {
            let value = serde_json::json!({
                "source": cli.input,
                "chars": text.char_count(),
                "words": text.word_count(),
                "text": shown,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&value).context("Failed to serialise output")?
            );
        } else {
            println!("{shown}");
            if !cli.quiet {
                eprintln!(
                    "{}",
                    dim(&format!(
                        "{} chars, {} words",
                        text.char_count(),
                        text.word_count()
                    ))
                );
            }
        }
        return Ok(());
    }

    // ── Build config & backends ──────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;
    let summarizer = build_summarizer(&cli)?;
    let speech = build_speech(&cli)?;
    let encoding = config.voice.encoding;
    let pipeline = Pipeline::new(summarizer, speech, config);

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("summary_podcast.{}", encoding.extension())));

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert_to_file(&cli.input, &output_path, &pipeline)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let mut value = serde_json::to_value(&output).context("Failed to serialise output")?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "output_file".into(),
                serde_json::Value::String(output_path.display().to_string()),
            );
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("Failed to serialise output")?
        );
    } else {
        println!("{}", output.summary);
    }

    if !cli.quiet && !cli.json {
        let stats = &output.stats;
        eprintln!(
            "{}  {} words → {} words{}  →  {} chunk(s), {}  {}ms  →  {}",
            green("✔"),
            stats.extracted_words,
            stats.summary_words,
            if stats.source_truncated {
                dim(" (source truncated)")
            } else {
                String::new()
            },
            stats.synthesis_chunks,
            dim(&format!("{} KiB", stats.audio_bytes / 1024)),
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `PodcastConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PodcastConfig> {
    let mut builder = PodcastConfig::builder()
        .max_length(cli.max_length)
        .min_length(cli.min_length)
        .truncation(!cli.no_truncation)
        .max_input_chars(cli.max_input_chars)
        .long_input(if cli.chunked {
            LongInputPolicy::Chunked
        } else {
            LongInputPolicy::Truncate
        })
        .summary_timeout_secs(cli.summary_timeout)
        .language_code(cli.language.clone())
        .gender(cli.gender.clone().into())
        .encoding(cli.encoding.clone().into())
        .speaking_rate(cli.speaking_rate)
        .pitch(cli.pitch)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref name) = cli.voice {
        builder = builder.voice_name(name.clone());
    }
    if let Some(hz) = cli.sample_rate {
        builder = builder.sample_rate_hertz(hz);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn build_summarizer(cli: &Cli) -> Result<Arc<dyn SummaryModel>> {
    match cli.summarizer {
        SummarizerArg::Huggingface => {
            let mut options = HuggingFaceOptions {
                token: cli.hf_token.clone().filter(|t| !t.trim().is_empty()),
                timeout_secs: cli.summary_timeout,
                ..HuggingFaceOptions::default()
            };
            if let Some(ref model) = cli.model {
                options.model = model.clone();
            }
            let model = HuggingFaceModel::new(options).context("Invalid summarizer settings")?;
            Ok(Arc::new(model))
        }
        SummarizerArg::Llm => Ok(Arc::new(LlmModel::new(LlmModelOptions {
            provider_name: cli.provider.clone(),
            model: cli.model.clone(),
            ..LlmModelOptions::default()
        }))),
    }
}

fn build_speech(cli: &Cli) -> Result<Arc<dyn SpeechProvider>> {
    let credentials = TtsCredentials::from_env().context("Failed to load TTS credentials")?;
    tracing::debug!("TTS credentials: {}", credentials.kind());
    let provider = GoogleTtsProvider::new(
        credentials,
        GoogleTtsOptions {
            timeout_secs: cli.tts_timeout,
            ..GoogleTtsOptions::default()
        },
    )
    .context("Invalid TTS settings")?;
    Ok(Arc::new(provider))
}
