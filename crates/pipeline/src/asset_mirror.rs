//! Incremental image mirror.
//!
//! Jobs whose destination already exists are skipped up front. The rest go
//! onto a shared queue drained by a fixed number of worker tasks. Each worker
//! sends one [`JobOutcome`] per finished job back to the caller, which is the
//! only place the [`MirrorReport`] is built.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pjsk_core::assets::AssetJob;
use pjsk_sekai::assets::AssetSource;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Default number of concurrent download workers.
pub const DEFAULT_MAX_CONCURRENCY: usize = 6;

/// Counts for one mirror run. `total` is the number of jobs handed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub saved: usize,
    pub skipped: usize,
    pub missed: usize,
    pub failed: usize,
    pub total: usize,
}

impl MirrorReport {
    fn record(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Saved => self.saved += 1,
            JobOutcome::Missed { .. } => self.missed += 1,
            JobOutcome::Failed => self.failed += 1,
        }
    }
}

/// Result of one dispatched job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Saved,
    /// No candidate yielded a usable body. `0` means the last attempt never
    /// got a status back.
    Missed { last_status: u16 },
    /// Downloaded, but the file could not be written.
    Failed,
}

/// A job with its absolute destination resolved.
struct PendingJob {
    dest: PathBuf,
    job: AssetJob,
}

/// Downloads missing assets into a local tree.
pub struct AssetMirror<S: AssetSource> {
    source: Arc<S>,
    root: PathBuf,
    max_concurrency: usize,
}

impl<S: AssetSource> AssetMirror<S> {
    /// `max_concurrency` below 1 is treated as 1.
    pub fn new(source: Arc<S>, root: impl Into<PathBuf>, max_concurrency: usize) -> Self {
        Self {
            source,
            root: root.into(),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Mirror every job not already present under the root.
    ///
    /// Never fails: misses and write errors are logged and counted. When
    /// `cancel` fires, workers stop taking jobs and the report covers what
    /// finished.
    pub async fn run(&self, jobs: Vec<AssetJob>, cancel: &CancellationToken) -> MirrorReport {
        let mut report = MirrorReport {
            total: jobs.len(),
            ..MirrorReport::default()
        };

        let mut pending = Vec::with_capacity(jobs.len());
        for job in jobs {
            let dest = self.root.join(&job.dest_rel);
            if is_regular_file(&dest).await {
                report.skipped += 1;
            } else {
                pending.push(PendingJob { dest, job });
            }
        }

        if pending.is_empty() {
            return report;
        }

        let worker_count = self.max_concurrency.min(pending.len());
        let (job_tx, job_rx) = mpsc::unbounded_channel();
        for job in pending {
            // The receiver is alive until the workers below drop it.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let job_rx = Arc::new(Mutex::new(job_rx));
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        let mut workers = JoinSet::new();

        for _ in 0..worker_count {
            let source = Arc::clone(&self.source);
            let job_rx = Arc::clone(&job_rx);
            let outcome_tx = outcome_tx.clone();
            let cancel = cancel.clone();
            workers.spawn(async move {
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let next = job_rx.lock().await.recv().await;
                    let Some(pending) = next else {
                        break;
                    };
                    let outcome = tokio::select! {
                        _ = cancel.cancelled() => break,
                        outcome = mirror_one(source.as_ref(), &pending) => outcome,
                    };
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
            });
        }
        drop(outcome_tx);

        while let Some(outcome) = outcome_rx.recv().await {
            report.record(outcome);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Asset worker task failed");
            }
        }

        report
    }
}

/// Try each candidate in order and write the first usable body.
async fn mirror_one<S: AssetSource>(source: &S, pending: &PendingJob) -> JobOutcome {
    let mut last_status = 0u16;
    let mut body = None;

    for url in &pending.job.urls {
        match source.get(url).await {
            Ok(response) => {
                last_status = response.status;
                if response.is_usable() {
                    body = Some(response.body);
                    break;
                }
            }
            Err(e) => {
                last_status = e.status.unwrap_or(0);
                tracing::debug!(url = %url, error = %e, "Asset candidate failed");
            }
        }
    }

    let Some(body) = body else {
        tracing::warn!(
            dest = %pending.job.dest_rel,
            last_status,
            "Asset miss (all candidates failed)",
        );
        return JobOutcome::Missed { last_status };
    };

    match write_file_atomic(&pending.dest, &body).await {
        Ok(()) => {
            tracing::debug!(dest = %pending.job.dest_rel, bytes = body.len(), "Asset saved");
            JobOutcome::Saved
        }
        Err(e) => {
            tracing::warn!(dest = %pending.job.dest_rel, error = %e, "Asset write failed");
            JobOutcome::Failed
        }
    }
}

async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// `<path>.tmp`, next to the destination.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `data` to `<path>.tmp`, then rename it onto `path`.
///
/// Parent directories are created as needed. On failure the temp file is
/// removed and `path` is left untouched.
pub async fn write_file_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = tmp_path(path);
    let written = match tokio::fs::write(&tmp, data).await {
        Ok(()) => tokio::fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };

    if written.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    written
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    use pjsk_core::assets::AssetSlot;
    use pjsk_sekai::assets::{AssetFetchError, AssetResponse};

    use super::*;

    enum Reply {
        Status(u16, &'static [u8]),
        Transport,
    }

    /// Scripted source; unknown URLs answer 404.
    #[derive(Default)]
    struct FakeSource {
        replies: HashMap<String, Reply>,
        calls: StdMutex<Vec<String>>,
    }

    impl FakeSource {
        fn reply(mut self, url: &str, reply: Reply) -> Self {
            self.replies.insert(url.to_string(), reply);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl AssetSource for FakeSource {
        async fn get(&self, url: &str) -> Result<AssetResponse, AssetFetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.replies.get(url) {
                Some(Reply::Status(status, body)) => Ok(AssetResponse {
                    status: *status,
                    body: body.to_vec(),
                }),
                Some(Reply::Transport) => Err(AssetFetchError::new(None, "connection reset")),
                None => Ok(AssetResponse {
                    status: 404,
                    body: b"not found".to_vec(),
                }),
            }
        }
    }

    fn job(dest_rel: &str, urls: &[&str]) -> AssetJob {
        AssetJob {
            slot: AssetSlot::GachaBanner,
            dest_rel: dest_rel.to_string(),
            urls: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    fn leftover_tmp_files(root: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in std::fs::read_dir(&dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path);
                } else if path.extension().is_some_and(|ext| ext == "tmp") {
                    found.push(path);
                }
            }
        }
        found
    }

    // -- candidate fallback --

    #[tokio::test]
    async fn second_candidate_used_after_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(
            FakeSource::default()
                .reply("http://a/1", Reply::Transport)
                .reply("http://b/1", Reply::Status(200, b"second"))
                .reply("http://c/1", Reply::Status(200, b"third")),
        );
        let mirror = AssetMirror::new(Arc::clone(&source), dir.path(), 2);

        let report = mirror
            .run(
                vec![job(
                    "sekai-gachas/gacha_1/banner.webp",
                    &["http://a/1", "http://b/1", "http://c/1"],
                )],
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(report.saved, 1);
        assert_eq!(report.total, 1);
        let written = std::fs::read(dir.path().join("sekai-gachas/gacha_1/banner.webp")).unwrap();
        assert_eq!(written, b"second");
        assert_eq!(source.calls(), vec!["http://a/1", "http://b/1"]);
    }

    #[tokio::test]
    async fn empty_body_falls_through_to_next_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(
            FakeSource::default()
                .reply("http://a/2", Reply::Status(200, b""))
                .reply("http://b/2", Reply::Status(200, b"png")),
        );
        let mirror = AssetMirror::new(source, dir.path(), 1);

        let report = mirror
            .run(vec![job("x/2.webp", &["http://a/2", "http://b/2"])], &CancellationToken::new())
            .await;

        assert_eq!(report.saved, 1);
        assert_eq!(std::fs::read(dir.path().join("x/2.webp")).unwrap(), b"png");
    }

    #[tokio::test]
    async fn all_candidates_failing_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default().reply("http://a/3", Reply::Transport));
        let mirror = AssetMirror::new(Arc::clone(&source), dir.path(), 3);

        let report = mirror
            .run(vec![job("x/3.webp", &["http://b/3", "http://a/3"])], &CancellationToken::new())
            .await;

        assert_eq!(
            report,
            MirrorReport {
                saved: 0,
                skipped: 0,
                missed: 1,
                failed: 0,
                total: 1,
            }
        );
        assert!(!dir.path().join("x/3.webp").exists());
        assert!(leftover_tmp_files(dir.path()).is_empty());
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn miss_reports_last_status() {
        let source = FakeSource::default()
            .reply("http://a/4", Reply::Transport)
            .reply("http://b/4", Reply::Status(403, b"denied"));
        let dir = tempfile::tempdir().unwrap();
        let pending = PendingJob {
            dest: dir.path().join("4.webp"),
            job: job("4.webp", &["http://a/4", "http://b/4"]),
        };
        assert_eq!(
            mirror_one(&source, &pending).await,
            JobOutcome::Missed { last_status: 403 }
        );

        let pending = PendingJob {
            dest: dir.path().join("4.webp"),
            job: job("4.webp", &["http://b/4", "http://a/4"]),
        };
        assert_eq!(
            mirror_one(&source, &pending).await,
            JobOutcome::Missed { last_status: 0 }
        );
    }

    // -- skip / idempotence --

    #[tokio::test]
    async fn second_run_skips_everything() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(
            FakeSource::default()
                .reply("http://a/5", Reply::Status(200, b"five"))
                .reply("http://a/6", Reply::Status(200, b"six")),
        );
        let mirror = AssetMirror::new(Arc::clone(&source), dir.path(), 4);
        let jobs = vec![
            job("card_thumbnails/5_normal.webp", &["http://a/5"]),
            job("card_thumbnails/6_normal.webp", &["http://a/6"]),
        ];

        let first = mirror.run(jobs.clone(), &CancellationToken::new()).await;
        assert_eq!(first.saved, 2);
        let calls_after_first = source.calls().len();

        let second = mirror.run(jobs, &CancellationToken::new()).await;
        assert_eq!(second.saved, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(second.total, 2);
        assert_eq!(source.calls().len(), calls_after_first);
    }

    #[tokio::test]
    async fn existing_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("x")).unwrap();
        std::fs::write(dir.path().join("x/7.webp"), b"original").unwrap();
        let source = Arc::new(FakeSource::default().reply("http://a/7", Reply::Status(200, b"new")));
        let mirror = AssetMirror::new(Arc::clone(&source), dir.path(), 1);

        let report = mirror
            .run(vec![job("x/7.webp", &["http://a/7"])], &CancellationToken::new())
            .await;

        assert_eq!(report.skipped, 1);
        assert_eq!(std::fs::read(dir.path().join("x/7.webp")).unwrap(), b"original");
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn directory_at_destination_is_not_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("x/8.webp")).unwrap();
        let source = Arc::new(FakeSource::default().reply("http://a/8", Reply::Status(200, b"eight")));
        let mirror = AssetMirror::new(source, dir.path(), 1);

        let report = mirror
            .run(vec![job("x/8.webp", &["http://a/8"])], &CancellationToken::new())
            .await;

        assert_eq!(report.skipped, 0);
        assert_eq!(report.failed, 1);
        assert!(leftover_tmp_files(dir.path()).is_empty());
    }

    // -- pool --

    #[tokio::test]
    async fn many_jobs_through_small_pool() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FakeSource::default();
        let mut jobs = Vec::new();
        for i in 0..25 {
            let url = format!("http://a/n{i}");
            source = source.reply(&url, Reply::Status(200, b"img"));
            jobs.push(job(&format!("many/{i}.webp"), &[url.as_str()]));
        }
        jobs.push(job("many/missing.webp", &["http://a/none"]));
        let mirror = AssetMirror::new(Arc::new(source), dir.path(), 3);

        let report = mirror.run(jobs, &CancellationToken::new()).await;

        assert_eq!(report.saved, 25);
        assert_eq!(report.missed, 1);
        assert_eq!(report.total, 26);
        assert!(leftover_tmp_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn zero_concurrency_still_runs() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default().reply("http://a/9", Reply::Status(200, b"nine")));
        let mirror = AssetMirror::new(source, dir.path(), 0);

        let report = mirror
            .run(vec![job("9.webp", &["http://a/9"])], &CancellationToken::new())
            .await;

        assert_eq!(report.saved, 1);
    }

    #[tokio::test]
    async fn cancelled_run_dispatches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default().reply("http://a/10", Reply::Status(200, b"ten")));
        let mirror = AssetMirror::new(Arc::clone(&source), dir.path(), 2);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = mirror.run(vec![job("10.webp", &["http://a/10"])], &cancel).await;

        assert_eq!(report.saved, 0);
        assert_eq!(report.total, 1);
        assert!(source.calls().is_empty());
        assert!(!dir.path().join("10.webp").exists());
    }

    #[tokio::test]
    async fn empty_job_list() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = AssetMirror::new(Arc::new(FakeSource::default()), dir.path(), 2);
        let report = mirror.run(Vec::new(), &CancellationToken::new()).await;
        assert_eq!(report, MirrorReport::default());
    }

    // -- write_file_atomic --

    #[tokio::test]
    async fn atomic_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c/file.webp");

        write_file_atomic(&path, b"bytes").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"bytes");
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("root/card_thumbnails/1_normal.webp")),
            PathBuf::from("root/card_thumbnails/1_normal.webp.tmp")
        );
    }
}
