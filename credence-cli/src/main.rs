//! Credence CLI
//!
//! Quick, explainable credibility checks for news articles.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

use credence_agents::{
    create_anthropic_backend, create_backend, create_fact_checker, create_gemini_backend,
    AnthropicConfig, GeminiConfig, OpenAIBackendConfig, Persona, DEFAULT_GEMINI_MODEL,
};
use credence_fetch::{FetchConfig, DEFAULT_MAX_CHARS};
use credence_runtime::{
    AnalysisMode, AnalysisReport, AnalysisRequest, Detector, DetectorConfig, FailurePolicy,
    DEFAULT_MIN_CHARS,
};

#[derive(Parser)]
#[command(name = "credence")]
#[command(author, version, about = "Credence: explainable credibility checks for news articles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single article
    Analyze {
        /// Article URL to fetch
        #[arg(short, long)]
        url: Option<String>,

        /// Article text
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// Read article text from a file ("-" for stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        provider: ProviderArgs,
    },

    /// Analyze several articles concurrently (URLs or text file paths)
    Batch {
        /// URLs or paths to text files
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Maximum articles analyzed at once
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Output file for the JSON reports (default: verdicts_<timestamp>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        provider: ProviderArgs,
    },

    /// Show which analysis path would be used
    Status {
        #[command(flatten)]
        provider: ProviderArgs,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ProviderKind {
    /// Gemini when a Google key is present, otherwise local heuristics
    Auto,
    Local,
    Gemini,
    Openai,
    Openrouter,
    Anthropic,
}

#[derive(Args)]
struct ProviderArgs {
    /// Analysis provider
    #[arg(long, value_enum, default_value = "auto")]
    provider: ProviderKind,

    /// Model name (defaults per provider)
    #[arg(short, long)]
    model: Option<String>,

    /// Gemini model when --model is not given (or set GEMINI_MODEL env var)
    #[arg(long, env = "GEMINI_MODEL")]
    gemini_model: Option<String>,

    /// Google Generative API key (or set GOOGLE_API_KEY env var)
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    google_key: Option<String>,

    /// Legacy Gemini API key (or set GEMINI_API_KEY env var)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_key: Option<String>,

    /// Override the generateContent endpoint
    #[arg(long, env = "GENERATIVE_ENDPOINT")]
    endpoint: Option<String>,

    /// OpenAI API key (or set OPENAI_API_KEY env var)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_key: Option<String>,

    /// OpenRouter API key (or set OPENROUTER_API_KEY env var)
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    openrouter_key: Option<String>,

    /// Anthropic API key (or set ANTHROPIC_API_KEY env var)
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    anthropic_key: Option<String>,

    /// Custom persona TOML for remote providers
    #[arg(long)]
    persona: Option<PathBuf>,

    /// Use the local analyzer when the remote provider fails
    #[arg(long)]
    fallback_local: bool,

    /// Minimum article length in characters
    #[arg(long, default_value_t = DEFAULT_MIN_CHARS)]
    min_chars: usize,

    /// Fetch timeout in seconds
    #[arg(long, default_value = "15")]
    fetch_timeout: u64,

    /// Maximum characters kept from a fetched page
    #[arg(long, default_value_t = DEFAULT_MAX_CHARS)]
    max_chars: usize,

    /// Proxy for article fetching (e.g. socks5h://127.0.0.1:9050)
    #[arg(long)]
    proxy: Option<String>,
}

impl ProviderArgs {
    fn google_key(&self) -> Option<&str> {
        self.google_key
            .as_deref()
            .or(self.gemini_key.as_deref())
            .filter(|key| !key.trim().is_empty())
    }

    fn resolved_kind(&self) -> ProviderKind {
        match self.provider {
            ProviderKind::Auto if self.google_key().is_some() => ProviderKind::Gemini,
            ProviderKind::Auto => ProviderKind::Local,
            kind => kind,
        }
    }

    fn load_persona(&self) -> Result<Persona> {
        match &self.persona {
            Some(path) => Persona::load(path)
                .with_context(|| format!("Failed to load persona from {}", path.display())),
            None => Persona::fact_checker().context("Embedded persona is invalid"),
        }
    }

    /// Build the analysis mode once, from explicit configuration
    fn analysis_mode(&self) -> Result<AnalysisMode> {
        let backend = match self.resolved_kind() {
            ProviderKind::Auto | ProviderKind::Local => return Ok(AnalysisMode::Local),
            ProviderKind::Gemini => {
                let key = self.google_key().ok_or_else(|| {
                    anyhow::anyhow!("Google API key required. Set GOOGLE_API_KEY or use --google-key")
                })?;
                let model = self
                    .model
                    .as_deref()
                    .or(self.gemini_model.as_deref())
                    .unwrap_or(DEFAULT_GEMINI_MODEL);
                let mut config = GeminiConfig::new(key, model);
                if let Some(endpoint) = &self.endpoint {
                    config = config.with_endpoint(endpoint);
                }
                create_gemini_backend(config)?
            }
            ProviderKind::Openai => {
                let key = self.openai_key.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("OpenAI API key required. Set OPENAI_API_KEY or use --openai-key")
                })?;
                let model = self.model.as_deref().unwrap_or("gpt-4o-mini");
                create_backend(OpenAIBackendConfig::openai(key, model))?
            }
            ProviderKind::Openrouter => {
                let key = self.openrouter_key.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("OpenRouter API key required. Set OPENROUTER_API_KEY or use --openrouter-key")
                })?;
                let model = self.model.as_deref().unwrap_or("openai/gpt-4o-mini");
                create_backend(OpenAIBackendConfig::openrouter(key, model))?
            }
            ProviderKind::Anthropic => {
                let key = self.anthropic_key.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("Anthropic API key required. Set ANTHROPIC_API_KEY or use --anthropic-key")
                })?;
                let model = self.model.as_deref().unwrap_or("claude-sonnet-4-20250514");
                create_anthropic_backend(AnthropicConfig::new(key, model))?
            }
        };

        Ok(AnalysisMode::Remote(create_fact_checker(backend, self.load_persona()?)))
    }

    fn detector(&self, max_concurrent: usize) -> Result<Detector> {
        let policy = if self.fallback_local {
            FailurePolicy::LocalFallback
        } else {
            FailurePolicy::Degrade
        };

        let config = DetectorConfig::default()
            .with_min_chars(self.min_chars)
            .with_max_concurrent(max_concurrent)
            .with_failure_policy(policy);

        let mut fetch = FetchConfig::default()
            .with_timeout(self.fetch_timeout)
            .with_max_chars(self.max_chars);
        if let Some(proxy) = &self.proxy {
            fetch = fetch.with_proxy(proxy);
        }

        Ok(Detector::with_http(config, self.analysis_mode()?, fetch))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match cli.command {
        Commands::Analyze {
            url,
            text,
            file,
            json,
            provider,
        } => {
            run_analyze(url, text, file, json, &provider).await?;
        }
        Commands::Batch {
            inputs,
            concurrency,
            output,
            provider,
        } => {
            run_batch(&inputs, concurrency, output, &provider).await?;
        }
        Commands::Status { provider } => {
            check_status(&provider)?;
        }
    }

    Ok(())
}

fn read_text_file(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read article text from stdin")?;
        return Ok(buffer);
    }

    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

async fn run_analyze(
    url: Option<String>,
    text: Option<String>,
    file: Option<PathBuf>,
    json: bool,
    provider: &ProviderArgs,
) -> Result<()> {
    let text = match (text, file) {
        (Some(text), _) => Some(text),
        (None, Some(path)) => Some(read_text_file(&path)?),
        (None, None) => None,
    };

    let request = AnalysisRequest { url, text };
    let detector = provider.detector(1)?;
    let report = detector.analyze(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

async fn run_batch(
    inputs: &[String],
    concurrency: usize,
    output: Option<PathBuf>,
    provider: &ProviderArgs,
) -> Result<()> {
    let requests = inputs
        .iter()
        .map(|input| {
            if input.starts_with("http://") || input.starts_with("https://") {
                Ok(AnalysisRequest::from_url(input))
            } else {
                read_text_file(&PathBuf::from(input)).map(|text| AnalysisRequest::from_text(&text))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let detector = provider.detector(concurrency)?;
    println!("🔍 Analyzing {} article(s) with {}", requests.len(), detector.mode().describe());

    let results = detector.analyze_batch(&requests).await;

    let mut reports = Vec::new();
    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(report) => {
                println!(
                    "✅ {} → {} ({:.2})",
                    input,
                    report.verdict.label.as_str().to_uppercase(),
                    report.verdict.confidence
                );
                reports.push(serde_json::json!({ "input": input, "report": report }));
            }
            Err(e) => {
                warn!("Skipping {}: {}", input, e);
                println!("❌ {} → {}", input, e);
                reports.push(serde_json::json!({ "input": input, "error": e.to_string() }));
            }
        }
    }

    let output_path = output.unwrap_or_else(|| {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
        PathBuf::from(format!("verdicts_{}.json", timestamp))
    });

    fs::write(&output_path, serde_json::to_string_pretty(&reports)?)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    println!("\n📄 Reports saved to: {}", output_path.display());

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    let verdict = &report.verdict;

    println!(
        "📰 Verdict: {} | confidence {:.2}",
        verdict.label.as_str().to_uppercase(),
        verdict.confidence
    );
    if let Some(provider) = &report.provider {
        println!("   via {} ({:?})", provider, report.source);
    }

    println!("\nSummary");
    println!("{}", verdict.summary);

    println!("\nWhy this verdict?");
    for reason in &verdict.explanation {
        println!("- {}", reason);
    }

    if !verdict.highlights.is_empty() {
        println!("\nFlagged sentences / claims");
        for highlight in &verdict.highlights {
            println!("• {}", highlight.sentence);
            println!("  Reason: {}", highlight.reason);
            println!("  Claim: {}", highlight.claim_text());
        }
    }

    println!("\n{}", "-".repeat(60));
    println!("Tip: cross-check with multiple trusted outlets and look for original sources.");
}

fn check_status(provider: &ProviderArgs) -> Result<()> {
    let detector = provider.detector(1)?;
    println!("🔌 Analysis path: {}", detector.mode().describe());
    println!(
        "   Minimum article length: {} chars",
        detector.config().min_chars
    );

    if let AnalysisMode::Remote(_) = detector.mode() {
        let persona = provider.load_persona()?;
        println!(
            "✅ Persona '{}' loaded ({} article chars max)",
            persona.persona.name, persona.output.max_article_chars
        );
        if detector.config().failure_policy == FailurePolicy::LocalFallback {
            println!("   Remote failures fall back to local heuristics");
        }
    } else {
        println!("   No API key configured; verdicts come from local heuristics.");
        println!("   Set GOOGLE_API_KEY to enable Gemini enrichment.");
    }

    Ok(())
}
