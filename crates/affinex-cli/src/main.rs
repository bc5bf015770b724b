use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::{Parser, ValueEnum};

mod output;

use affinex_core::provider::build_provider;
use affinex_core::{Config, ProviderKind, discover_jobs, run_batch};
use affinex_pdf_mupdf::MupdfBackend;
use output::ColorMode;

/// Scientific-literature affinity extractor - convert a directory of PDFs
/// into per-paper TSV tables of wet-lab affinity measurements
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory containing the PDFs to process
    #[arg(short = 'i', long = "input_dir")]
    input_dir: PathBuf,

    /// Accepted for compatibility and ignored; one TSV is always written
    /// next to each source PDF
    #[arg(short = 'o', long = "output_file", default_value = "results.tsv")]
    output_file: String,

    /// Extraction provider
    #[arg(long, value_enum, default_value_t = Provider::Anthropic)]
    provider: Provider,

    /// Override the provider's default model
    #[arg(long)]
    model: Option<String>,

    /// Number of concurrent extraction workers
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Per-request timeout in seconds for provider calls
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Cap the cleaned text at this many characters before prompting
    #[arg(long)]
    max_prompt_chars: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Provider {
    Anthropic,
    Gemini,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if !cli.input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", cli.input_dir.display());
    }
    if cli.output_file != "results.tsv" {
        eprintln!("note: --output_file is ignored; one TSV is written next to each PDF");
    }

    // Resolve configuration: CLI flags > env vars > defaults
    let (kind, key_var) = match cli.provider {
        Provider::Anthropic => (ProviderKind::Anthropic, "ANTHROPIC_API_KEY"),
        Provider::Gemini => (ProviderKind::Gemini, "GEMINI_API_KEY"),
    };
    let api_key = std::env::var(key_var).ok();
    if api_key.is_none() {
        anyhow::bail!("{} is not set; export it or add it to .env", key_var);
    }

    let config = Config {
        provider: kind,
        api_key,
        model: cli.model,
        num_workers: cli.workers,
        request_timeout_secs: cli.timeout,
        max_prompt_chars: cli.max_prompt_chars,
    };

    let provider = build_provider(&config)?;
    let backend = Arc::new(MupdfBackend::new());

    let jobs = discover_jobs(&cli.input_dir)?;

    let color = ColorMode(!cli.no_color);
    let writer: Arc<Mutex<Box<dyn Write + Send>>> =
        Arc::new(Mutex::new(Box::new(std::io::stdout())));

    {
        let mut w = writer.lock().unwrap();
        output::print_discovery(&mut **w, &cli.input_dir.display().to_string(), jobs.len())?;
    }

    if jobs.is_empty() {
        println!("Nothing to do.");
        return Ok(());
    }

    let progress_cb = {
        let pw = Arc::clone(&writer);
        move |event: affinex_core::ProgressEvent| {
            if let Ok(mut w) = pw.lock() {
                let _ = output::print_progress(&mut **w, &event, color);
                let _ = w.flush();
            }
        }
    };

    let stats = run_batch(jobs, config, backend, provider, progress_cb).await;

    // Per-job failures are reported above; the batch itself always
    // completes with exit code 0.
    let mut w = writer.lock().unwrap();
    output::print_summary(&mut **w, &stats, color)?;

    Ok(())
}
