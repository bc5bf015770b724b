//! Integration tests for the batch pipeline.
//!
//! A stub [`PdfBackend`] and tag-echoing provider stand in for mupdf and
//! the real network providers, so no PDF parsing or HTTP happens. Input
//! "PDFs" are empty placeholder files; the stub derives page text from the
//! file stem.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use affinex_core::provider::mock::{MockProvider, MockResponse};
use affinex_core::{
    BackendError, BatchStats, Config, ExtractionError, ExtractionProvider, PdfBackend,
    ProgressEvent, discover_jobs, extract_directory, run_batch, tsv,
};

/// Backend stub: page text carries a tag derived from the file stem so
/// tests can trace which input produced which artifact. Stems listed in
/// `fail_stems` simulate an unreadable PDF.
struct StubBackend {
    fail_stems: Vec<String>,
}

impl StubBackend {
    fn new() -> Self {
        Self { fail_stems: vec![] }
    }

    fn failing_on(stems: &[&str]) -> Self {
        Self {
            fail_stems: stems.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PdfBackend for StubBackend {
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.fail_stems.contains(&stem) {
            return Err(BackendError::Open("simulated unreadable PDF".into()));
        }
        Ok(vec![
            format!("SOURCE_TAG:{stem} binding affinity data."),
            "Second page of measurements.".into(),
        ])
    }
}

/// Provider that answers with a row naming the source tag it saw in the
/// prompt, or errors for listed tags.
struct EchoProvider {
    fail_stems: Vec<String>,
}

impl EchoProvider {
    fn new() -> Self {
        Self { fail_stems: vec![] }
    }

    fn failing_on(stems: &[&str]) -> Self {
        Self {
            fail_stems: stems.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ExtractionProvider for EchoProvider {
    fn name(&self) -> &str {
        "Echo"
    }

    fn extract<'a>(
        &'a self,
        prompt: &'a str,
        _client: &'a reqwest::Client,
        _timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, ExtractionError>> + Send + 'a>> {
        let stem = prompt
            .split("SOURCE_TAG:")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        let fail = self.fail_stems.contains(&stem);

        Box::pin(async move {
            if fail {
                Err(ExtractionError::Api {
                    status: 500,
                    message: format!("simulated outage for {stem}"),
                })
            } else {
                Ok(format!(
                    "Ligand-{stem}\tReceptor-{stem}\tHomo sapiens\tKd=1.2 nM\tSPR\t1ABC"
                ))
            }
        })
    }
}

fn touch_pdfs(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"").unwrap();
    }
}

fn collect_events() -> (
    Arc<Mutex<Vec<ProgressEvent>>>,
    impl Fn(ProgressEvent) + Send + Sync + 'static,
) {
    let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let events = events.clone();
        move |event: ProgressEvent| events.lock().unwrap().push(event)
    };
    (events, sink)
}

fn terminal_events(events: &[ProgressEvent]) -> (Vec<String>, Vec<String>) {
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for event in events {
        match event {
            ProgressEvent::JobSucceeded { file_name, .. } => succeeded.push(file_name.clone()),
            ProgressEvent::JobFailed { file_name, .. } => failed.push(file_name.clone()),
            ProgressEvent::JobStarted { .. } => {}
        }
    }
    (succeeded, failed)
}

#[tokio::test]
async fn end_to_end_two_files() {
    let dir = tempfile::tempdir().unwrap();
    touch_pdfs(dir.path(), &["paperA.pdf", "paperB.pdf"]);

    let (events, sink) = collect_events();
    let stats = extract_directory(
        dir.path(),
        Config::default(),
        Arc::new(StubBackend::new()),
        Arc::new(EchoProvider::failing_on(&["paperB"])),
        sink,
    )
    .await
    .unwrap();

    assert_eq!(
        stats,
        BatchStats {
            total: 2,
            succeeded: 1,
            failed: 1
        }
    );

    // paperA: header + one data row
    let content = std::fs::read_to_string(dir.path().join("paperA.tsv")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], tsv::HEADER);
    assert_eq!(
        lines[1],
        "Ligand-paperA\tReceptor-paperA\tHomo sapiens\tKd=1.2 nM\tSPR\t1ABC"
    );

    // paperB: no artifact, one failure event naming the file
    assert!(!dir.path().join("paperB.tsv").exists());
    let events = events.lock().unwrap();
    let (succeeded, failed) = terminal_events(&events);
    assert_eq!(succeeded, vec!["paperA.pdf"]);
    assert_eq!(failed, vec!["paperB.pdf"]);
}

#[tokio::test]
async fn one_bad_job_does_not_abort_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let names: Vec<String> = (0..6).map(|i| format!("paper{i}.pdf")).collect();
    let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
    touch_pdfs(dir.path(), &name_refs);

    // paper2 dies during page extraction, paper4 during the provider call
    let backend = Arc::new(StubBackend::failing_on(&["paper2"]));
    let provider = Arc::new(EchoProvider::failing_on(&["paper4"]));

    let (events, sink) = collect_events();
    let jobs = discover_jobs(dir.path()).unwrap();
    let stats = run_batch(jobs, Config::default(), backend, provider, sink).await;

    assert_eq!(
        stats,
        BatchStats {
            total: 6,
            succeeded: 4,
            failed: 2
        }
    );

    for i in [0usize, 1, 3, 5] {
        assert!(
            dir.path().join(format!("paper{i}.tsv")).exists(),
            "paper{i}.tsv should exist"
        );
    }
    assert!(!dir.path().join("paper2.tsv").exists());
    assert!(!dir.path().join("paper4.tsv").exists());

    // exactly one terminal event per job
    let events = events.lock().unwrap();
    let (succeeded, failed) = terminal_events(&events);
    assert_eq!(succeeded.len() + failed.len(), 6);
    assert!(failed.contains(&"paper2.pdf".to_string()));
    assert!(failed.contains(&"paper4.pdf".to_string()));
}

#[tokio::test]
async fn artifacts_never_cross_talk() {
    let dir = tempfile::tempdir().unwrap();
    touch_pdfs(dir.path(), &["alpha.pdf", "beta.pdf", "gamma.pdf"]);

    let (_, sink) = collect_events();
    let stats = extract_directory(
        dir.path(),
        Config {
            num_workers: 3,
            ..Config::default()
        },
        Arc::new(StubBackend::new()),
        Arc::new(EchoProvider::new()),
        sink,
    )
    .await
    .unwrap();
    assert_eq!(stats.succeeded, 3);

    for stem in ["alpha", "beta", "gamma"] {
        let content = std::fs::read_to_string(dir.path().join(format!("{stem}.tsv"))).unwrap();
        assert!(content.contains(&format!("Ligand-{stem}")));
        for other in ["alpha", "beta", "gamma"] {
            if other != stem {
                assert!(
                    !content.contains(&format!("Ligand-{other}")),
                    "{stem}.tsv contains rows for {other}"
                );
            }
        }
    }
}

#[tokio::test]
async fn header_is_invariant_over_model_output() {
    let dir = tempfile::tempdir().unwrap();
    touch_pdfs(dir.path(), &["weird.pdf"]);

    // Malformed model output passes through uninspected
    let provider = Arc::new(MockProvider::new(MockResponse::Text(
        "not\ttab\tseparated at all, just prose".into(),
    )));

    let (_, sink) = collect_events();
    let stats = extract_directory(
        dir.path(),
        Config::default(),
        Arc::new(StubBackend::new()),
        provider,
        sink,
    )
    .await
    .unwrap();
    assert_eq!(stats.succeeded, 1);

    let content = std::fs::read_to_string(dir.path().join("weird.tsv")).unwrap();
    assert_eq!(content.lines().next(), Some(tsv::HEADER));
}

#[tokio::test]
async fn empty_model_output_yields_header_only_artifact() {
    let dir = tempfile::tempdir().unwrap();
    touch_pdfs(dir.path(), &["hollow.pdf"]);

    let provider = Arc::new(MockProvider::new(MockResponse::Text(String::new())));
    let (_, sink) = collect_events();
    let stats = extract_directory(
        dir.path(),
        Config::default(),
        Arc::new(StubBackend::new()),
        provider,
        sink,
    )
    .await
    .unwrap();
    assert_eq!(stats.succeeded, 1);

    let content = std::fs::read_to_string(dir.path().join("hollow.tsv")).unwrap();
    assert_eq!(content, format!("{}\n", tsv::HEADER));
}

#[tokio::test]
async fn empty_directory_completes_with_zero_stats() {
    let dir = tempfile::tempdir().unwrap();

    let (events, sink) = collect_events();
    let stats = extract_directory(
        dir.path(),
        Config::default(),
        Arc::new(StubBackend::new()),
        Arc::new(EchoProvider::new()),
        sink,
    )
    .await
    .unwrap();

    assert_eq!(stats, BatchStats::default());
    assert!(events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn slow_jobs_all_report_before_return() {
    let dir = tempfile::tempdir().unwrap();
    let names: Vec<String> = (0..8).map(|i| format!("slow{i}.pdf")).collect();
    let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
    touch_pdfs(dir.path(), &name_refs);

    let provider = Arc::new(
        MockProvider::new(MockResponse::Text("a\tb\tc\td\te\tf".into()))
            .with_delay(Duration::from_millis(20)),
    );

    let (events, sink) = collect_events();
    let stats = extract_directory(
        dir.path(),
        Config {
            num_workers: 2,
            ..Config::default()
        },
        Arc::new(StubBackend::new()),
        provider.clone(),
        sink,
    )
    .await
    .unwrap();

    // run_batch blocks until every submitted job has an outcome
    assert_eq!(stats.total, 8);
    assert_eq!(stats.succeeded + stats.failed, 8);
    assert_eq!(provider.call_count(), 8);
    let events = events.lock().unwrap();
    let (succeeded, failed) = terminal_events(&events);
    assert_eq!(succeeded.len() + failed.len(), 8);
}

#[tokio::test]
async fn missing_input_dir_is_fatal() {
    let (_, sink) = collect_events();
    let result = extract_directory(
        Path::new("/nonexistent/affinex-batch-input"),
        Config::default(),
        Arc::new(StubBackend::new()),
        Arc::new(EchoProvider::new()),
        sink,
    )
    .await;
    assert!(result.is_err());
}
