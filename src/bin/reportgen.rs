//! CLI binary for edgequake-report.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ReportConfig` and writes the generated `.docx`.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_report::{
    generate_report_with_llm, plan_report, FrontMatter, ProgressCallback, ReportConfig,
    ReportPlan, ReportProgressCallback, ReportRequest, SectionKey,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar over all section calls plus the
/// references call, with one log line per finished section.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start time of the section in flight.
    started: Mutex<Option<Instant>>,
    completed: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Rendering front matter…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
            completed: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ReportProgressCallback for CliProgressCallback {
    fn on_report_start(&self, total_sections: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>2}/{len} calls  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        // One extra step for the references call.
        self.bar.set_length(total_sections as u64 + 1);
        self.bar.set_style(style);
        self.bar.set_prefix("Writing");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Generating {total_sections} sections…"))
        ));
    }

    fn on_section_start(&self, key: SectionKey, _total: usize) {
        if let Ok(mut s) = self.started.lock() {
            *s = Some(Instant::now());
        }
        self.bar.set_message(format!("section {key}"));
    }

    fn on_section_complete(&self, key: SectionKey, total: usize, text_len: usize) {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        self.bar.println(format!(
            "  {} Section {:<4} {:>2}/{:<2}  {:<8}  {}",
            green("✓"),
            key.to_string(),
            done,
            total,
            dim(&format!("{text_len:>5} chars")),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_section_error(&self, key: SectionKey, _total: usize, error: &str) {
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Section {:<4} {}  {}",
            red("✗"),
            key.to_string(),
            red(&msg),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.abandon();
    }

    fn on_references_start(&self) {
        self.bar.set_message("references");
    }

    fn on_report_complete(&self, sections: usize, paragraphs: usize) {
        self.bar.inc(1);
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} sections generated, {} paragraphs",
            green("✔"),
            bold(&sections.to_string()),
            paragraphs
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # 10-page report written to "Smart_Irrigation_System.docx"
  reportgen --title "Smart Irrigation System" --pages 10

  # Choose the output file and model
  reportgen --title "Smart Irrigation System" --pages 20 -o report.docx \
    --provider openai --model gpt-4.1

  # Show the word plan only (no API key needed)
  reportgen --title "Smart Irrigation System" --pages 10 --plan-only

  # Fill in the title page and add a logo
  reportgen --title "Smart Irrigation System" --pages 10 \
    --candidate "A. Student" --degree "BACHELOR OF ENGINEERING" \
    --branch "COMPUTER SCIENCE" --logo static/logo.png

  # Local model, no rate-limit pauses
  reportgen --title "Edge AI Camera" --pages 8 --provider ollama --model llama3.1 \
    --section-delay-ms 0 --chapter-delay-ms 0

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Provider used with EDGEQUAKE_MODEL when --provider is unset
  EDGEQUAKE_PROVIDER      Same as --provider
  EDGEQUAKE_MODEL         Same as --model
  REPORTGEN_*             Every other flag, e.g. REPORTGEN_PAGES=12
"#;

/// Generate academic project reports (.docx) with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "reportgen",
    version,
    about = "Generate academic project reports (.docx) with an LLM",
    long_about = "Generate a formatted academic project report (title page, certificate, \
table of contents, five chapters and IEEE references) for a project title. Section text is \
written by an LLM; numbering, headings, bullets and pagination are applied by reportgen.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Project title.
    #[arg(long, env = "REPORTGEN_TITLE")]
    title: String,

    /// Target report length in pages (300 words per page).
    #[arg(long, env = "REPORTGEN_PAGES",
          value_parser = clap::value_parser!(u32).range(1..))]
    pages: u32,

    /// Output .docx path. Default: derived from the title.
    #[arg(short, long, env = "REPORTGEN_OUTPUT")]
    output: Option<PathBuf>,

    /// LLM model ID (e.g. gpt-4.1-mini, gpt-4.1, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "REPORTGEN_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Max LLM output tokens per section.
    #[arg(long, env = "REPORTGEN_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// Retries per call on LLM failure.
    #[arg(long, env = "REPORTGEN_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Per-call LLM timeout in seconds.
    #[arg(long, env = "REPORTGEN_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Pause before every LLM call, in milliseconds.
    #[arg(long, env = "REPORTGEN_SECTION_DELAY_MS", default_value_t = 2000)]
    section_delay_ms: u64,

    /// Pause after every chapter, in milliseconds.
    #[arg(long, env = "REPORTGEN_CHAPTER_DELAY_MS", default_value_t = 5000)]
    chapter_delay_ms: u64,

    /// Path to a text file containing a custom section system prompt.
    #[arg(long, env = "REPORTGEN_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// PNG or JPEG logo for the title page and certificate.
    #[arg(long, env = "REPORTGEN_LOGO")]
    logo: Option<PathBuf>,

    /// Institution named on the title page.
    #[arg(long, env = "REPORTGEN_INSTITUTION")]
    institution: Option<String>,

    /// Candidate name(s) for the title page and certificate.
    #[arg(long, env = "REPORTGEN_CANDIDATE")]
    candidate: Option<String>,

    /// Degree named on the title page.
    #[arg(long, env = "REPORTGEN_DEGREE")]
    degree: Option<String>,

    /// Branch of study named on the title page.
    #[arg(long, env = "REPORTGEN_BRANCH")]
    branch: Option<String>,

    /// Print the word plan and exit, without calling the LLM.
    #[arg(long)]
    plan_only: bool,

    /// Print structured JSON (plan, or the full ReportOutput) to stdout.
    #[arg(long, env = "REPORTGEN_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "REPORTGEN_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "REPORTGEN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "REPORTGEN_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.plan_only;
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

    let request = ReportRequest::new(cli.title.clone(), cli.pages);

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ReportProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb).await?;

    // ── Plan-only mode ───────────────────────────────────────────────────
    if cli.plan_only {
        let plan = plan_report(&request, &config).context("Invalid report request")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).context("Failed to serialise plan")?
            );
        } else {
            print_plan(&plan);
        }
        return Ok(());
    }

    // ── Generate ─────────────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.title));

    let output = generate_report_with_llm(&request, &config)
        .await
        .context("Report generation failed")?;
    output
        .save(&output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    }

    if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {} sections  {}/{} words  {}ms  →  {}",
            green("✔"),
            stats.sections,
            stats.generated_words,
            stats.target_words,
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&stats.total_input_tokens.to_string()),
            dim(&stats.total_output_tokens.to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `ReportConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ReportConfig> {
    let defaults = FrontMatter::default();
    let front_matter = FrontMatter {
        candidate: cli.candidate.clone().unwrap_or(defaults.candidate),
        degree: cli.degree.clone().unwrap_or(defaults.degree),
        branch: cli.branch.clone().unwrap_or(defaults.branch),
        institution: cli.institution.clone().unwrap_or(defaults.institution),
        logo_path: cli.logo.clone(),
        ..FrontMatter::default()
    };

    let mut builder = ReportConfig::builder()
        .front_matter(front_matter)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout)
        .section_delay_ms(cli.section_delay_ms)
        .chapter_delay_ms(cli.chapter_delay_ms);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// `"Smart Irrigation System"` → `Smart_Irrigation_System.docx`.
fn default_output_path(title: &str) -> PathBuf {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '-' || c == '.' => c,
            _ => '_',
        })
        .collect();
    let stem = stem.trim_matches(|c| c == '_' || c == '.');
    if stem.is_empty() {
        PathBuf::from("report.docx")
    } else {
        PathBuf::from(format!("{stem}.docx"))
    }
}

fn print_plan(plan: &ReportPlan) {
    println!(
        "{} pages  →  {} words",
        bold(&plan.pages.to_string()),
        bold(&plan.target_words.to_string())
    );
    for chapter in &plan.chapters {
        println!();
        println!("{}  {}", cyan(&format!("{:>5}", chapter.total_words)), bold(&chapter.title));
        for section in &chapter.sections {
            println!(
                "{}  {:<4} {}",
                dim(&format!("{:>5}", section.target_words)),
                section.key.to_string(),
                section.title
            );
        }
    }
}
