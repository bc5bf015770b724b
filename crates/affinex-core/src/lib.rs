use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod backend;
pub mod batch;
pub mod pool;
pub mod preprocess;
pub mod prompt;
pub mod provider;
pub mod tsv;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use batch::{BatchError, discover_jobs, run_batch};
pub use preprocess::clean_text;
pub use prompt::build_prompt;
pub use provider::{ExtractionError, ExtractionProvider};

/// A single unit of batch work: one source PDF and its derived artifact path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionJob {
    pub source: PathBuf,
    pub output: PathBuf,
}

impl ExtractionJob {
    /// Build a job for a PDF, deriving the artifact path `<stem>.tsv`
    /// next to the source file.
    pub fn for_pdf(source: PathBuf) -> Self {
        let output = source.with_extension("tsv");
        Self { source, output }
    }

    /// File name of the source PDF, for log lines.
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }

    /// File name of the output artifact, for log lines.
    pub fn output_name(&self) -> String {
        self.output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.output.display().to_string())
    }
}

/// The terminal outcome of one extraction job. Produced exactly once per
/// job; a `Failure` never yields an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success { tsv_body: String },
    Failure { reason: String },
}

/// Progress events emitted while a batch runs.
///
/// `index` is the job's submission index; terminal events arrive in
/// completion order, which is nondeterministic across runs.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    JobStarted {
        index: usize,
        total: usize,
        file_name: String,
    },
    JobSucceeded {
        index: usize,
        total: usize,
        file_name: String,
        output_name: String,
    },
    JobFailed {
        index: usize,
        total: usize,
        file_name: String,
        reason: String,
    },
}

/// Summary counts for a complete batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Which model provider performs the field extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "Anthropic",
            ProviderKind::Gemini => "Gemini",
        }
    }
}

/// Configuration for a batch run.
#[derive(Clone)]
pub struct Config {
    pub provider: ProviderKind,
    /// API credential for the selected provider, sourced from the
    /// environment or a secret store. Never embedded in source.
    pub api_key: Option<String>,
    /// Override the provider's default model.
    pub model: Option<String>,
    pub num_workers: usize,
    /// Per-request timeout for provider calls.
    pub request_timeout_secs: u64,
    /// Cap the cleaned text at this many characters before prompting.
    /// `None` sends the full document text.
    pub max_prompt_chars: Option<usize>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("num_workers", &self.num_workers)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_prompt_chars", &self.max_prompt_chars)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Anthropic,
            api_key: None,
            model: None,
            num_workers: 4,
            request_timeout_secs: 120,
            max_prompt_chars: None,
        }
    }
}

/// Discover and process every PDF directly inside `input_dir`.
///
/// Convenience wrapper around [`discover_jobs`] + [`run_batch`]. Fails only
/// on batch-level errors (unreadable input directory); per-job failures are
/// reported through `progress` and counted in the returned stats.
pub async fn extract_directory(
    input_dir: &Path,
    config: Config,
    backend: Arc<dyn PdfBackend>,
    provider: Arc<dyn ExtractionProvider>,
    progress: impl Fn(ProgressEvent) + Send + Sync + 'static,
) -> Result<BatchStats, BatchError> {
    let jobs = batch::discover_jobs(input_dir)?;
    Ok(batch::run_batch(jobs, config, backend, provider, progress).await)
}
