use anyhow::{Context, Result};
use atty::Stream;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use distil_ai::{LLMProvider, OpenAIConfig, OpenAIProvider, ProviderFactory};
use distil_core::{readability, ConfigManager, DistilConfig, Session, MAX_SIMPLIFY_PASSES};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, Registry};

#[derive(Parser)]
#[command(name = "distil")]
#[command(about = "Distil CLI - Refine web pages into readable summaries", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty)
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline against a URL
    Run {
        /// Page URL to distil
        url: String,

        /// Number of simplification passes to run (0-5)
        #[arg(short, long, default_value = "0")]
        passes: u8,

        /// Expand the summary with extra detail after simplifying
        #[arg(long)]
        expand: bool,

        /// Condense the final summary to at most this many words
        #[arg(long)]
        words: Option<usize>,

        /// Render the four-panel comic (requires at least 3 passes)
        #[arg(long)]
        comic: bool,

        /// Where to write the comic image
        #[arg(long, default_value = "comic.jpg")]
        comic_out: PathBuf,
    },

    /// Score text readability without calling any service
    Analyze {
        /// Text to analyze (reads stdin when omitted)
        text: Option<String>,

        /// Read the text from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show the resolved configuration
    Status,

    /// Write a default config file
    Init {
        /// Target path for the config file
        #[arg(long, default_value = ".distil.toml")]
        path: PathBuf,
    },
}

// Output structures
#[derive(Serialize)]
struct RunResult {
    session_id: String,
    url: String,
    passes: u8,
    summary: String,
    grade_level: f64,
    clarity: String,
    word_count: usize,
    comic_path: Option<String>,
    finished_at: String,
}

#[derive(Serialize)]
struct AnalyzeResult {
    sentence_count: usize,
    word_count: usize,
    syllable_count: usize,
    grade_level: f64,
    clarity: String,
}

#[derive(Serialize)]
struct StatusResult {
    config_file: String,
    extraction_url: String,
    llm_url: String,
    synthesis_model: String,
    simplify_model: String,
    image_model: String,
    firecrawl_key_present: bool,
    openai_key_present: bool,
    llm_available: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::load_from(path),
        None => ConfigManager::load(),
    }
    .context("Failed to load configuration")?;

    init_tracing(&cli, manager.config());

    match execute_command(&cli, &manager).await {
        Ok(output) => {
            print_output(&cli.output, &output)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(cli: &Cli, config: &DistilConfig) {
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn execute_command(cli: &Cli, manager: &ConfigManager) -> Result<serde_json::Value> {
    match &cli.command {
        Commands::Run {
            url,
            passes,
            expand,
            words,
            comic,
            comic_out,
        } => {
            execute_run(
                manager.config(),
                url,
                *passes,
                *expand,
                *words,
                *comic,
                comic_out,
                &cli.output,
            )
            .await
        }
        Commands::Analyze { text, file } => execute_analyze(text.as_deref(), file.as_deref()),
        Commands::Status => execute_status(manager).await,
        Commands::Init { path } => execute_init(path),
    }
}

async fn execute_run(
    config: &DistilConfig,
    url: &str,
    passes: u8,
    expand: bool,
    words: Option<usize>,
    comic: bool,
    comic_out: &Path,
    output: &OutputFormat,
) -> Result<serde_json::Value> {
    if passes > MAX_SIMPLIFY_PASSES {
        anyhow::bail!("--passes must be at most {}", MAX_SIMPLIFY_PASSES);
    }

    let pipeline = ProviderFactory::create_pipeline(config)?;
    let mut session = Session::new();
    let spinner = make_spinner(output);

    spinner.set_message("Retrieving content from the page...");
    pipeline.submit(&mut session, url).await?;

    for pass in 1..=passes {
        spinner.set_message(format!("Simplifying further... ({}/{})", pass, passes));
        pipeline.simplify(&mut session).await?;
    }

    if expand {
        spinner.set_message("Expanding with additional detail...");
        pipeline.expand(&mut session).await?;
    }

    if words.is_some() {
        spinner.set_message("Condensing summary...");
        pipeline.condense(&mut session, words).await?;
    }

    let comic_path = if comic {
        spinner.set_message("Interpreting content...");
        pipeline.visualize(&mut session).await?;

        let artifact = session
            .comic
            .as_ref()
            .context("Pipeline finished without a comic")?;
        std::fs::write(comic_out, &artifact.image)
            .with_context(|| format!("Failed to write comic to {}", comic_out.display()))?;
        Some(comic_out.display().to_string())
    } else {
        None
    };

    spinner.finish_and_clear();

    let summary = session
        .current_text
        .clone()
        .context("Pipeline finished without a summary")?;
    let metrics = readability::analyze(&summary)?;

    let result = RunResult {
        session_id: session.id.to_string(),
        url: url.to_string(),
        passes: session.simplify_passes,
        summary,
        grade_level: metrics.grade_level,
        clarity: metrics.clarity().label().to_string(),
        word_count: metrics.word_count,
        comic_path,
        finished_at: chrono::Utc::now().to_rfc3339(),
    };

    Ok(serde_json::to_value(result)?)
}

fn execute_analyze(text: Option<&str>, file: Option<&Path>) -> Result<serde_json::Value> {
    let content = match (text, file) {
        (Some(_), Some(_)) => anyhow::bail!("Provide either inline text or --file, not both"),
        (Some(text), None) => text.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };

    let metrics = readability::analyze(&content)?;
    let result = AnalyzeResult {
        sentence_count: metrics.sentence_count,
        word_count: metrics.word_count,
        syllable_count: metrics.syllable_count,
        grade_level: metrics.grade_level,
        clarity: metrics.clarity().label().to_string(),
    };

    Ok(serde_json::to_value(result)?)
}

async fn execute_status(manager: &ConfigManager) -> Result<serde_json::Value> {
    let config = manager.config();

    // Probe the chat endpoint only when a key is configured; a status call
    // with no key should stay offline.
    let llm_available = match &config.llm.api_key {
        Some(key) if !key.is_empty() => {
            let provider = OpenAIProvider::new(OpenAIConfig {
                api_key: key.clone(),
                base_url: config.llm.base_url.clone(),
                model: config.llm.simplify_model.clone(),
                timeout_secs: config.llm.timeout_secs,
            })?;
            Some(provider.is_available().await)
        }
        _ => None,
    };

    let result = StatusResult {
        config_file: manager
            .config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "NONE (using defaults)".to_string()),
        extraction_url: config.extraction.base_url.clone(),
        llm_url: config.llm.base_url.clone(),
        synthesis_model: config.llm.synthesis_model.clone(),
        simplify_model: config.llm.simplify_model.clone(),
        image_model: config.image.model.clone(),
        firecrawl_key_present: config.extraction.api_key.is_some(),
        openai_key_present: config.llm.api_key.is_some(),
        llm_available,
    };

    Ok(serde_json::to_value(result)?)
}

fn execute_init(path: &Path) -> Result<serde_json::Value> {
    if path.exists() {
        anyhow::bail!("Config file already exists: {}", path.display());
    }
    ConfigManager::create_default_config(path).context("Failed to write config file")?;

    Ok(serde_json::json!({
        "path": path.display().to_string(),
        "status": "created"
    }))
}

fn make_spinner(output: &OutputFormat) -> ProgressBar {
    // Spinners draw to stderr; keep them out of JSON pipelines and logs.
    if matches!(output, OutputFormat::Json) || !atty::is(Stream::Stderr) {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_output(format: &OutputFormat, value: &serde_json::Value) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Pretty => {
            print_pretty(value)?;
        }
    }
    Ok(())
}

fn print_pretty(value: &serde_json::Value) -> Result<()> {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                let key_colored = key.cyan().bold();
                match val {
                    serde_json::Value::String(s) => {
                        println!("{}: {}", key_colored, s.green());
                    }
                    serde_json::Value::Number(n) => {
                        println!("{}: {}", key_colored, n.to_string().yellow());
                    }
                    serde_json::Value::Bool(b) => {
                        let val_colored = if *b { "true".green() } else { "false".red() };
                        println!("{}: {}", key_colored, val_colored);
                    }
                    serde_json::Value::Null => {
                        println!("{}: {}", key_colored, "none".dimmed());
                    }
                    _ => {
                        println!("{}: {}", key_colored, val);
                    }
                }
            }
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}
