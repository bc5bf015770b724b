//! Batch discovery and orchestration.
//!
//! The orchestrator discovers input PDFs, schedules one job per file onto
//! the worker pool, and handles outcomes in completion order: a success is
//! written as an artifact next to its source, a failure is reported and
//! writes nothing. The batch always runs to the end; per-job failures are
//! counted, never escalated.

use std::path::Path;
use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::backend::PdfBackend;
use crate::pool::{ExtractionPool, FileJob};
use crate::provider::ExtractionProvider;
use crate::tsv;
use crate::{BatchStats, Config, ExtractionJob, JobOutcome, ProgressEvent};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("input directory not found: {0}")]
    MissingInputDir(std::path::PathBuf),
    #[error("failed to list input directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Discover extraction jobs: immediate children of `dir` with a `.pdf`
/// extension (case-insensitive). Subdirectories are not recursed into.
/// Sorted by path for a stable submission order.
pub fn discover_jobs(dir: &Path) -> Result<Vec<ExtractionJob>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::MissingInputDir(dir.to_path_buf()));
    }

    let mut jobs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_pdf = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf {
            jobs.push(ExtractionJob::for_pdf(path));
        }
    }

    jobs.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(jobs)
}

/// Run every job through the pool and write one artifact per success.
///
/// Blocks until all submitted jobs have reported an outcome, then shuts the
/// pool down. Exactly one terminal progress event is emitted per job. A
/// failed artifact write downgrades that job to a reported failure; it does
/// not abort the batch.
pub async fn run_batch(
    jobs: Vec<ExtractionJob>,
    config: Config,
    backend: Arc<dyn PdfBackend>,
    provider: Arc<dyn ExtractionProvider>,
    progress: impl Fn(ProgressEvent) + Send + Sync + 'static,
) -> BatchStats {
    let total = jobs.len();
    if total == 0 {
        return BatchStats::default();
    }

    let num_workers = config.num_workers.max(1);
    let config = Arc::new(config);
    let progress = Arc::new(progress);

    let pool = ExtractionPool::new(config, backend, provider, num_workers);

    // Submit everything up front; workers bound the actual parallelism.
    let mut pending = FuturesUnordered::new();
    for (i, job) in jobs.into_iter().enumerate() {
        let (result_tx, result_rx) = oneshot::channel();
        pool.submit(FileJob {
            job: job.clone(),
            result_tx,
            job_index: i,
            total,
            progress: progress.clone(),
        })
        .await;
        pending.push(async move { (i, job, result_rx.await) });
    }

    // Handle outcomes as jobs finish, not in submission order.
    let mut stats = BatchStats {
        total,
        ..Default::default()
    };
    while let Some((i, job, received)) = pending.next().await {
        let outcome = received.unwrap_or_else(|_| JobOutcome::Failure {
            reason: "worker dropped the job before completion".into(),
        });

        match outcome {
            JobOutcome::Success { tsv_body } => match tsv::write_artifact(&job.output, &tsv_body)
            {
                Ok(()) => {
                    stats.succeeded += 1;
                    progress(ProgressEvent::JobSucceeded {
                        index: i,
                        total,
                        file_name: job.file_name(),
                        output_name: job.output_name(),
                    });
                }
                Err(e) => {
                    stats.failed += 1;
                    progress(ProgressEvent::JobFailed {
                        index: i,
                        total,
                        file_name: job.file_name(),
                        reason: format!("failed to write artifact: {e}"),
                    });
                }
            },
            JobOutcome::Failure { reason } => {
                stats.failed += 1;
                progress(ProgressEvent::JobFailed {
                    index: i,
                    total,
                    file_name: job.file_name(),
                    reason,
                });
            }
        }
    }

    pool.shutdown().await;
    stats
}
