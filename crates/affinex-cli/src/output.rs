use std::io::Write;

use affinex_core::{BatchStats, ProgressEvent};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the discovery line before the batch starts.
pub fn print_discovery(w: &mut dyn Write, dir: &str, count: usize) -> std::io::Result<()> {
    writeln!(w, "Found {} PDF file(s) in {}", count, dir)?;
    writeln!(w)?;
    Ok(())
}

/// Print a real-time progress event. One terminal line per job.
pub fn print_progress(
    w: &mut dyn Write,
    event: &ProgressEvent,
    color: ColorMode,
) -> std::io::Result<()> {
    match event {
        ProgressEvent::JobStarted {
            index,
            total,
            file_name,
        } => {
            writeln!(w, "[{}/{}] Extracting: {}", index + 1, total, file_name)?;
        }
        ProgressEvent::JobSucceeded {
            index,
            total,
            file_name,
            output_name,
        } => {
            if color.enabled() {
                writeln!(
                    w,
                    "[{}/{}] {} {} -> {}",
                    index + 1,
                    total,
                    "WRITTEN".green(),
                    file_name,
                    output_name
                )?;
            } else {
                writeln!(
                    w,
                    "[{}/{}] WRITTEN {} -> {}",
                    index + 1,
                    total,
                    file_name,
                    output_name
                )?;
            }
        }
        ProgressEvent::JobFailed {
            index,
            total,
            file_name,
            reason,
        } => {
            if color.enabled() {
                writeln!(
                    w,
                    "[{}/{}] {} {}: {}",
                    index + 1,
                    total,
                    "FAILED".red(),
                    file_name,
                    reason
                )?;
            } else {
                writeln!(
                    w,
                    "[{}/{}] FAILED {}: {}",
                    index + 1,
                    total,
                    file_name,
                    reason
                )?;
            }
        }
    }
    Ok(())
}

/// Print the end-of-run summary line.
pub fn print_summary(
    w: &mut dyn Write,
    stats: &BatchStats,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    let line = format!(
        "Batch complete: {}/{} succeeded, {} failed. TSV files were written next to their PDFs.",
        stats.succeeded, stats.total, stats.failed
    );
    if color.enabled() {
        if stats.failed > 0 {
            writeln!(w, "{}", line.yellow())?;
        } else {
            writeln!(w, "{}", line.green())?;
        }
    } else {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}
