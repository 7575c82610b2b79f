use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use clipbatch::adapters::acquire_ytdlp::SourceMetadata;
use clipbatch::adapters::{AutoSkipResolver, LocalFolderAcquirer};
use clipbatch::app::{
    BatchInteractor, BatchOutcome, ClipOrchestrator, FolderInteractor, OrchestratorSettings,
    RunReport,
};
use clipbatch::domain::model::*;
use clipbatch::domain::rules::{DurationLimits, RowValidator, SourceBinding};
use clipbatch::output::{ExistingClipIndex, OutputLayout};
use clipbatch::planner::{BatchParser, VideoGrouper};
use clipbatch::ports::*;
use clipbatch::DomainError;

/// Test doubles for the ports
mod test_utils {
    use super::*;

    /// Serves sources from a fixed table; ids listed in `existing` count as
    /// already downloaded
    pub struct FakeAcquirer {
        pub sources: HashMap<String, AcquiredSource>,
        pub existing: HashSet<String>,
        pub acquired: Mutex<Vec<String>>,
    }

    impl FakeAcquirer {
        pub fn new(root: &Path, ids: &[(&str, &str)]) -> Self {
            let sources = ids
                .iter()
                .map(|(id, discriminator)| {
                    (
                        id.to_string(),
                        AcquiredSource {
                            video_path: root.join(format!("{}_video.mp4", id)),
                            audio_path: root.join(format!("{}_audio.m4a", id)),
                            discriminator: discriminator.to_string(),
                        },
                    )
                })
                .collect();
            Self {
                sources,
                existing: HashSet::new(),
                acquired: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AcquirePort for FakeAcquirer {
        async fn find_existing(
            &self,
            source: &SourceRef,
        ) -> Result<Option<AcquiredSource>, DomainError> {
            if self.existing.contains(&source.id) {
                Ok(self.sources.get(&source.id).cloned())
            } else {
                Ok(None)
            }
        }

        async fn acquire(&self, source: &SourceRef) -> Result<AcquiredSource, DomainError> {
            self.acquired.lock().unwrap().push(source.id.clone());
            self.sources
                .get(&source.id)
                .cloned()
                .ok_or_else(|| DomainError::Unavailable(format!("video {} is private", source.id)))
        }
    }

    /// Writes empty output files; fails for listed start times
    #[derive(Default)]
    pub struct FakeTranscoder {
        pub fail_starts: Vec<f64>,
        pub fail_merge: bool,
        pub delay: Option<Duration>,
        pub jobs: Mutex<Vec<CutJob>>,
    }

    #[async_trait]
    impl TranscodePort for FakeTranscoder {
        async fn cut(&self, job: &CutJob) -> Result<CutReport, DomainError> {
            self.jobs.lock().unwrap().push(job.clone());
            if let Some(delay) = self.delay {
                fs::write(&job.video_output, b"partial").unwrap();
                tokio::time::sleep(delay).await;
            }
            if self.fail_starts.iter().any(|s| (s - job.start_seconds).abs() < 1e-9) {
                return Err(DomainError::ExecutionFailed("encoder crashed".to_string()));
            }

            fs::write(&job.video_output, b"video").unwrap();
            fs::write(&job.audio_output, b"audio").unwrap();

            let mut report = CutReport::default();
            if let Some(merged) = &job.merged_output {
                if self.fail_merge {
                    report.merge_warning = Some("mux failed".to_string());
                } else {
                    fs::write(merged, b"merged").unwrap();
                }
            }
            Ok(report)
        }
    }

    /// Records every event as a short line
    #[derive(Default)]
    pub struct RecordingSink {
        pub events: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        pub fn lines(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ClipEventSink for RecordingSink {
        fn on_source_failed(&self, source: &SourceRef, _message: &str) {
            self.events.lock().unwrap().push(format!("source_failed {}", source.id));
        }

        fn on_clip_created(&self, record: &ClipRecord, report: &CutReport) {
            let merged = if report.merge_warning.is_some() { " merge_warning" } else { "" };
            self.events
                .lock()
                .unwrap()
                .push(format!("created {}{}", record.filename, merged));
        }

        fn on_clip_skipped(&self, request: &ClipRequest, existing: &ClipRecord) {
            self.events
                .lock()
                .unwrap()
                .push(format!(
                    "skipped row {} as {}",
                    request.source_row_number, existing.filename
                ));
        }

        fn on_clip_failed(&self, request: &ClipRequest, message: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("failed row {}: {}", request.source_row_number, message));
        }
    }

    /// Always cuts duplicates again
    pub struct RecreateResolver;

    #[async_trait]
    impl DuplicateResolver for RecreateResolver {
        async fn decide(
            &self,
            _request: &ClipRequest,
            _existing: &ClipRecord,
        ) -> DuplicateDecision {
            DuplicateDecision::Recreate
        }
    }

    pub fn settings(root: &Path, merge: bool, continue_on_error: bool) -> OrchestratorSettings {
        OrchestratorSettings {
            layout: OutputLayout::new(root.join("clips"), merge),
            skip_existing_downloads: true,
            continue_on_error,
            encode_timeout: Duration::from_secs(5),
        }
    }

    pub fn orchestrator(
        acquirer: Arc<FakeAcquirer>,
        transcoder: Arc<FakeTranscoder>,
        sink: Arc<RecordingSink>,
        settings: OrchestratorSettings,
    ) -> ClipOrchestrator {
        ClipOrchestrator::new(acquirer, transcoder, Arc::new(AutoSkipResolver), sink, settings)
    }

    pub fn batch_parser() -> BatchParser {
        BatchParser::new(RowValidator::new(
            DurationLimits::new(5.0, 7.0).unwrap(),
            SourceBinding::UrlColumn,
        ))
    }

    pub fn request(id: &str, start: f64, end: f64, label: Label, row: u64) -> ClipRequest {
        ClipRequest {
            source: SourceRef::remote(id, format!("https://youtu.be/{}", id)),
            start_seconds: start,
            end_seconds: end,
            label,
            duration_seconds: end - start,
            source_row_number: row,
        }
    }

    pub fn created_names(report: &RunReport) -> Vec<String> {
        report.created.iter().map(|r| r.filename.clone()).collect()
    }
}

use test_utils::*;

const SAMPLE_CSV: &str = "\
url,start,end,label
https://youtu.be/aaaaaaaaaaa,10.5,16.2,f
https://youtu.be/aaaaaaaaaaa,10.5,11.0,f
https://youtu.be/aaaaaaaaaaa,20,26,maybe
https://youtu.be/bbbbbbbbbbb,1:00,1:06,n
https://youtu.be/aaaaaaaaaaa,30,36,n
";

async fn run_sample_batch(root: &Path, csv: &Path) -> BatchOutcome {
    let mut acquirer = FakeAcquirer::new(root, &[("aaaaaaaaaaa", "Cats"), ("bbbbbbbbbbb", "Dogs")]);
    acquirer.existing.insert("aaaaaaaaaaa".to_string());
    let interactor = BatchInteractor::new(
        batch_parser(),
        orchestrator(
            Arc::new(acquirer),
            Arc::new(FakeTranscoder::default()),
            Arc::new(RecordingSink::default()),
            settings(root, true, true),
        ),
    );
    interactor.execute(csv).await.unwrap()
}

#[tokio::test]
async fn test_second_run_creates_nothing() {
    let tmp = TempDir::new().unwrap();
    let csv = tmp.path().join("batch.csv");
    fs::write(&csv, SAMPLE_CSV).unwrap();

    let first = run_sample_batch(tmp.path(), &csv).await;
    assert_eq!(first.report.stats.created, 3);
    assert_eq!(first.report.stats.skipped_existing_download, 1);
    assert_eq!(first.report.stats.downloaded, 1);
    assert_eq!(first.rejected_rows(), 2);
    assert_eq!(
        created_names(&first.report),
        vec!["f_001_Cats_10.5_16.2.mp4", "n_001_Cats_30.0_36.0.mp4", "n_002_Dogs_60.0_66.0.mp4"]
    );
    assert!(tmp.path().join("clips/funny/merged/f_001_Cats_10.5_16.2.mp4").exists());
    assert!(tmp.path().join("clips/funny/audio/f_001_Cats_10.5_16.2.m4a").exists());

    let second = run_sample_batch(tmp.path(), &csv).await;
    assert_eq!(second.report.stats.created, 0);
    assert_eq!(second.report.stats.skipped_duplicate, 3);
    assert_eq!(second.report.stats.failed, 0);
}

#[tokio::test]
async fn test_near_duplicate_request_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let acquirer = Arc::new(FakeAcquirer::new(tmp.path(), &[("abc", "Cats")]));
    let transcoder = Arc::new(FakeTranscoder::default());
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = orchestrator(
        acquirer,
        transcoder.clone(),
        sink.clone(),
        settings(tmp.path(), false, true),
    );

    let first = orchestrator
        .run(VideoGrouper::group(vec![request("abc", 10.5, 16.2, Label::Funny, 2)]))
        .await
        .unwrap();
    assert_eq!(first.stats.created, 1);

    let second = orchestrator
        .run(VideoGrouper::group(vec![request("abc", 10.55, 16.25, Label::Funny, 2)]))
        .await
        .unwrap();
    assert_eq!(second.stats.created, 0);
    assert_eq!(second.stats.skipped_duplicate, 1);
    assert_eq!(transcoder.jobs.lock().unwrap().len(), 1);
    let lines = sink.lines();
    assert_eq!(
        lines.last().map(String::as_str),
        Some("skipped row 2 as f_001_Cats_10.5_16.2.mp4")
    );
}

#[tokio::test]
async fn test_duplicates_within_one_run_are_skipped() {
    let tmp = TempDir::new().unwrap();
    let acquirer = Arc::new(FakeAcquirer::new(tmp.path(), &[("abc", "Cats")]));
    let orchestrator = orchestrator(
        acquirer,
        Arc::new(FakeTranscoder::default()),
        Arc::new(RecordingSink::default()),
        settings(tmp.path(), false, true),
    );

    let report = orchestrator
        .run(VideoGrouper::group(vec![
            request("abc", 10.5, 16.2, Label::Funny, 2),
            request("abc", 10.52, 16.2, Label::Funny, 3),
            request("abc", 10.5, 16.2, Label::Normal, 4),
        ]))
        .await
        .unwrap();

    assert_eq!(report.stats.created, 2);
    assert_eq!(report.stats.skipped_duplicate, 1);
}

#[tokio::test]
async fn test_numbering_stays_monotonic_across_failures() {
    let tmp = TempDir::new().unwrap();
    let existing_dir = tmp.path().join("clips/funny/video");
    fs::create_dir_all(&existing_dir).unwrap();
    fs::write(existing_dir.join("f_004_Old_1.0_7.0.mp4"), b"").unwrap();

    let acquirer = Arc::new(FakeAcquirer::new(tmp.path(), &[("abc", "Cats")]));
    let transcoder = Arc::new(FakeTranscoder {
        fail_starts: vec![20.0],
        ..FakeTranscoder::default()
    });
    let sink = Arc::new(RecordingSink::default());
    let orchestrator =
        orchestrator(acquirer, transcoder, sink.clone(), settings(tmp.path(), false, true));

    let report = orchestrator
        .run(VideoGrouper::group(vec![
            request("abc", 10.0, 16.0, Label::Funny, 2),
            request("abc", 20.0, 26.0, Label::Funny, 3),
            request("abc", 30.0, 36.0, Label::Funny, 4),
        ]))
        .await
        .unwrap();

    assert_eq!(report.stats.created, 2);
    assert_eq!(report.stats.failed, 1);
    let numbers: Vec<u32> = report.created.iter().map(|r| r.sequence_number).collect();
    assert_eq!(numbers, vec![5, 6]);
    assert!(sink
        .lines()
        .contains(&"failed row 3: Execution failed: encoder crashed".to_string()));

    let index =
        ExistingClipIndex::rebuild(&OutputLayout::new(tmp.path().join("clips"), false)).unwrap();
    assert_eq!(index.next_sequence_number(Label::Funny), Some(7));
}

#[tokio::test]
async fn test_unavailable_source_is_skipped_by_default() {
    let tmp = TempDir::new().unwrap();
    let acquirer = Arc::new(FakeAcquirer::new(tmp.path(), &[("good", "Good")]));
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = orchestrator(
        acquirer,
        Arc::new(FakeTranscoder::default()),
        sink.clone(),
        settings(tmp.path(), false, true),
    );

    let report = orchestrator
        .run(VideoGrouper::group(vec![
            request("gone", 10.0, 16.0, Label::Funny, 2),
            request("good", 10.0, 16.0, Label::Funny, 3),
        ]))
        .await
        .unwrap();

    assert!(report.halted.is_none());
    assert_eq!(report.stats.acquisition_failed, 1);
    assert_eq!(report.stats.created, 1);
    assert_eq!(sink.lines()[0], "source_failed gone");
}

#[tokio::test]
async fn test_stop_on_first_failure_halts_run() {
    let tmp = TempDir::new().unwrap();
    let acquirer = Arc::new(FakeAcquirer::new(tmp.path(), &[("good", "Good")]));
    let orchestrator = orchestrator(
        acquirer.clone(),
        Arc::new(FakeTranscoder::default()),
        Arc::new(RecordingSink::default()),
        settings(tmp.path(), false, false),
    );

    let report = orchestrator
        .run(VideoGrouper::group(vec![
            request("gone", 10.0, 16.0, Label::Funny, 2),
            request("good", 10.0, 16.0, Label::Funny, 3),
        ]))
        .await
        .unwrap();

    let halt = report.halted.expect("run should halt");
    assert_eq!(halt.source_id, "gone");
    assert_eq!(report.stats.created, 0);
    assert_eq!(*acquirer.acquired.lock().unwrap(), vec!["gone".to_string()]);
}

#[tokio::test]
async fn test_merge_failure_keeps_clip() {
    let tmp = TempDir::new().unwrap();
    let acquirer = Arc::new(FakeAcquirer::new(tmp.path(), &[("abc", "Cats")]));
    let transcoder = Arc::new(FakeTranscoder {
        fail_merge: true,
        ..FakeTranscoder::default()
    });
    let sink = Arc::new(RecordingSink::default());
    let orchestrator =
        orchestrator(acquirer, transcoder, sink.clone(), settings(tmp.path(), true, true));

    let report = orchestrator
        .run(VideoGrouper::group(vec![request("abc", 10.0, 16.0, Label::Normal, 2)]))
        .await
        .unwrap();

    assert_eq!(report.stats.created, 1);
    assert_eq!(report.stats.failed, 0);
    assert_eq!(sink.lines(), vec!["created n_001_Cats_10.0_16.0.mp4 merge_warning".to_string()]);
    assert!(tmp.path().join("clips/normal/video/n_001_Cats_10.0_16.0.mp4").exists());
}

#[tokio::test]
async fn test_encode_timeout_counts_as_failure() {
    let tmp = TempDir::new().unwrap();
    let acquirer = Arc::new(FakeAcquirer::new(tmp.path(), &[("abc", "Cats")]));
    let transcoder = Arc::new(FakeTranscoder {
        delay: Some(Duration::from_secs(30)),
        ..FakeTranscoder::default()
    });
    let mut settings = settings(tmp.path(), false, true);
    settings.encode_timeout = Duration::from_millis(50);
    let orchestrator =
        orchestrator(acquirer, transcoder, Arc::new(RecordingSink::default()), settings);

    let report = orchestrator
        .run(VideoGrouper::group(vec![request("abc", 10.0, 16.0, Label::Funny, 2)]))
        .await
        .unwrap();

    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.stats.created, 0);
    assert!(!tmp.path().join("clips/funny/video/f_001_Cats_10.0_16.0.mp4").exists());
}

#[tokio::test]
async fn test_recreate_policy_allocates_fresh_number() {
    let tmp = TempDir::new().unwrap();
    let video_dir = tmp.path().join("clips/funny/video");
    fs::create_dir_all(&video_dir).unwrap();
    fs::write(video_dir.join("f_002_Cats_10.0_16.0.mp4"), b"").unwrap();

    let orchestrator = ClipOrchestrator::new(
        Arc::new(FakeAcquirer::new(tmp.path(), &[("abc", "Cats")])),
        Arc::new(FakeTranscoder::default()),
        Arc::new(RecreateResolver),
        Arc::new(RecordingSink::default()),
        settings(tmp.path(), false, true),
    );

    let report = orchestrator
        .run(VideoGrouper::group(vec![request("abc", 10.0, 16.0, Label::Funny, 2)]))
        .await
        .unwrap();

    assert_eq!(created_names(&report), vec!["f_003_Cats_10.0_16.0.mp4"]);
    assert_eq!(report.stats.skipped_duplicate, 0);
}

#[tokio::test]
async fn test_unreadable_csv_aborts_before_any_work() {
    let tmp = TempDir::new().unwrap();
    let acquirer = Arc::new(FakeAcquirer::new(tmp.path(), &[("abc", "Cats")]));
    let interactor = BatchInteractor::new(
        batch_parser(),
        orchestrator(
            acquirer.clone(),
            Arc::new(FakeTranscoder::default()),
            Arc::new(RecordingSink::default()),
            settings(tmp.path(), false, true),
        ),
    );

    let err = interactor.execute(&tmp.path().join("missing.csv")).await.unwrap_err();
    assert!(matches!(err, clipbatch::ClipBatchError::CsvUnreadable { .. }));
    assert!(acquirer.acquired.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_exhausted_label_fails_clip() {
    let tmp = TempDir::new().unwrap();
    let video_dir = tmp.path().join("clips/funny/video");
    fs::create_dir_all(&video_dir).unwrap();
    fs::write(video_dir.join("f_4294967295_Cats_1.0_7.0.mp4"), b"").unwrap();

    let acquirer = Arc::new(FakeAcquirer::new(tmp.path(), &[("abc", "Cats")]));
    let transcoder = Arc::new(FakeTranscoder::default());
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = orchestrator(
        acquirer,
        transcoder.clone(),
        sink.clone(),
        settings(tmp.path(), false, true),
    );

    let report = orchestrator
        .run(VideoGrouper::group(vec![
            request("abc", 10.0, 16.0, Label::Funny, 2),
            request("abc", 1.0, 7.0, Label::Funny, 3),
        ]))
        .await
        .unwrap();

    assert_eq!(report.stats.created, 0);
    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.stats.skipped_duplicate, 1);
    assert!(transcoder.jobs.lock().unwrap().is_empty());
    assert!(sink
        .lines()
        .contains(&"failed row 2: no sequence number left for label funny".to_string()));
}

/// Creates `downloads/<name>` with a media pair and the given timestamp file
fn source_folder(root: &Path, name: &str, timestamps: Option<&str>) -> std::path::PathBuf {
    let dir = root.join("downloads").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}_video.mp4", name)), b"v").unwrap();
    fs::write(dir.join(format!("{}_audio.m4a", name)), b"a").unwrap();
    if let Some(content) = timestamps {
        fs::write(dir.join("timestamps.csv"), content).unwrap();
    }
    dir
}

fn folder_interactor(root: &Path) -> FolderInteractor {
    let orchestrator = ClipOrchestrator::new(
        Arc::new(LocalFolderAcquirer::new(root.join("downloads"))),
        Arc::new(FakeTranscoder::default()),
        Arc::new(AutoSkipResolver),
        Arc::new(RecordingSink::default()),
        settings(root, false, true),
    );
    FolderInteractor::new(
        root.join("downloads"),
        DurationLimits::new(5.0, 7.0).unwrap(),
        orchestrator,
    )
}

#[tokio::test]
async fn test_folder_second_run_creates_nothing() {
    let tmp = TempDir::new().unwrap();
    source_folder(tmp.path(), "Cat_Video", Some("start,end,label\n10,16,f\n20,26,n\n"));

    let first = folder_interactor(tmp.path()).execute(&[]).await.unwrap();
    assert_eq!(
        created_names(&first.report),
        vec!["f_001_Cat_Video_10.0_16.0.mp4", "n_001_Cat_Video_20.0_26.0.mp4"]
    );
    assert!(tmp.path().join("clips/funny/video/f_001_Cat_Video_10.0_16.0.mp4").exists());

    let second = folder_interactor(tmp.path()).execute(&[]).await.unwrap();
    assert_eq!(second.report.stats.created, 0);
    assert_eq!(second.report.stats.skipped_duplicate, 2);
}

#[tokio::test]
async fn test_folder_with_unreadable_csv_does_not_stop_others() {
    let tmp = TempDir::new().unwrap();
    source_folder(tmp.path(), "Broken", None);
    source_folder(tmp.path(), "Good", Some("start,end,label\n10,16,f\n"));

    let names = vec!["Broken".to_string(), "Good".to_string()];
    let outcome = folder_interactor(tmp.path()).execute(&names).await.unwrap();

    assert_eq!(outcome.inputs.len(), 2);
    assert!(outcome.inputs[0].origin.ends_with("Broken/timestamps.csv"));
    assert!(outcome.inputs[0].error.is_some());
    assert!(outcome.inputs[1].error.is_none());
    assert_eq!(outcome.inputs[1].accepted, 1);
    assert_eq!(created_names(&outcome.report), vec!["f_001_Good_10.0_16.0.mp4"]);
}

#[tokio::test]
async fn test_folder_names_limit_the_run() {
    let tmp = TempDir::new().unwrap();
    source_folder(tmp.path(), "First", Some("start,end,label\n10,16,f\n"));
    source_folder(tmp.path(), "Second", Some("start,end,label\n10,16,f\n"));

    let outcome = folder_interactor(tmp.path())
        .execute(&["Second".to_string()])
        .await
        .unwrap();

    assert_eq!(outcome.inputs.len(), 1);
    assert_eq!(created_names(&outcome.report), vec!["f_001_Second_10.0_16.0.mp4"]);
    assert!(!tmp.path().join("clips/funny/video/f_001_First_10.0_16.0.mp4").exists());
}

#[tokio::test]
async fn test_folder_discriminator_prefers_source_metadata() {
    let tmp = TempDir::new().unwrap();
    let downloaded = source_folder(tmp.path(), "dQw4w9WgXcQ", Some("start,end,label\n10,16,n\n"));
    SourceMetadata {
        video_id: "dQw4w9WgXcQ".to_string(),
        url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
        title: "Never Gonna Give".to_string(),
        safe_title: "Never_Gonna_Give".to_string(),
        downloaded_at: chrono::Utc::now(),
    }
    .save(&downloaded)
    .unwrap();
    source_folder(tmp.path(), "Plain", Some("start,end,label\n10,16,n\n"));

    let outcome = folder_interactor(tmp.path()).execute(&[]).await.unwrap();

    assert_eq!(
        created_names(&outcome.report),
        vec!["n_001_Plain_10.0_16.0.mp4", "n_002_Never_Gonna_Give_10.0_16.0.mp4"]
    );
}
