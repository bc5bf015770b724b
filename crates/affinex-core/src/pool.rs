//! Fixed-size worker pool for per-file extraction jobs.
//!
//! Workers pull jobs from a shared channel and run the whole per-file
//! pipeline: page extraction, cleanup, prompting, provider call. Every
//! failure is converted to a `Failure` outcome at the job boundary, so one
//! bad file can never abort its siblings or the pool. Each worker runs a
//! job to completion before taking the next; there is no ordering guarantee
//! between job completions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::backend::PdfBackend;
use crate::preprocess::{clean_text, truncate_chars};
use crate::prompt::build_prompt;
use crate::provider::ExtractionProvider;
use crate::{Config, ExtractionJob, JobOutcome, ProgressEvent};

/// An extraction job submitted to the pool.
pub struct FileJob {
    pub job: ExtractionJob,
    pub result_tx: oneshot::Sender<JobOutcome>,
    pub job_index: usize,
    pub total: usize,
    /// Progress callback for this job (emits JobStarted).
    pub progress: Arc<dyn Fn(ProgressEvent) + Send + Sync>,
}

/// A pool of worker tasks that process extraction jobs.
///
/// Submit jobs via [`submit()`](ExtractionPool::submit), receive outcomes
/// via the oneshot receiver paired with each job.
pub struct ExtractionPool {
    job_tx: async_channel::Sender<FileJob>,
    pool_handle: JoinHandle<()>,
}

impl ExtractionPool {
    /// Create a new pool with `num_workers` worker tasks sharing one HTTP
    /// client and one provider.
    pub fn new(
        config: Arc<Config>,
        backend: Arc<dyn PdfBackend>,
        provider: Arc<dyn ExtractionProvider>,
        num_workers: usize,
    ) -> Self {
        let (job_tx, job_rx) = async_channel::unbounded::<FileJob>();
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let pool_handle = tokio::spawn(async move {
            let mut worker_handles = Vec::with_capacity(num_workers.max(1));

            for _ in 0..num_workers.max(1) {
                worker_handles.push(tokio::spawn(worker_loop(
                    job_rx.clone(),
                    config.clone(),
                    backend.clone(),
                    provider.clone(),
                    client.clone(),
                )));
            }

            // Drop our clone so workers are the last holders; they exit
            // when job_tx closes and the queue drains.
            drop(job_rx);

            for h in worker_handles {
                let _ = h.await;
            }
        });

        Self {
            job_tx,
            pool_handle,
        }
    }

    /// Submit a job to the pool.
    pub async fn submit(&self, job: FileJob) {
        let _ = self.job_tx.send(job).await;
    }

    /// Close the queue and wait for every worker to drain and exit.
    pub async fn shutdown(self) {
        self.job_tx.close();
        let _ = self.pool_handle.await;
    }
}

async fn worker_loop(
    rx: async_channel::Receiver<FileJob>,
    config: Arc<Config>,
    backend: Arc<dyn PdfBackend>,
    provider: Arc<dyn ExtractionProvider>,
    client: reqwest::Client,
) {
    while let Ok(job) = rx.recv().await {
        (job.progress)(ProgressEvent::JobStarted {
            index: job.job_index,
            total: job.total,
            file_name: job.job.file_name(),
        });

        let outcome = run_job(&job.job, &config, &backend, &provider, &client).await;
        let _ = job.result_tx.send(outcome);
    }
}

/// Run the per-file pipeline, converting every error to a Failure outcome.
async fn run_job(
    job: &ExtractionJob,
    config: &Config,
    backend: &Arc<dyn PdfBackend>,
    provider: &Arc<dyn ExtractionProvider>,
    client: &reqwest::Client,
) -> JobOutcome {
    // The PDF read is synchronous file I/O; keep it off the async workers.
    let path = job.source.clone();
    let backend = Arc::clone(backend);
    let pages = match tokio::task::spawn_blocking(move || backend.read_pages(&path)).await {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            return JobOutcome::Failure {
                reason: e.to_string(),
            };
        }
        // A panicking extraction surfaces as a JoinError; contain it here.
        Err(e) => {
            return JobOutcome::Failure {
                reason: format!("page extraction panicked: {e}"),
            };
        }
    };

    let raw = pages.join(" ");
    let cleaned = clean_text(&raw);
    let capped = match config.max_prompt_chars {
        Some(max) => truncate_chars(&cleaned, max),
        None => cleaned.as_str(),
    };
    let prompt = build_prompt(capped);

    let timeout = Duration::from_secs(config.request_timeout_secs);
    match provider.extract(&prompt, client, timeout).await {
        Ok(tsv_body) => JobOutcome::Success { tsv_body },
        Err(e) => {
            tracing::debug!(file = %job.source.display(), provider = provider.name(), error = %e, "extraction failed");
            JobOutcome::Failure {
                reason: e.to_string(),
            }
        }
    }
}
