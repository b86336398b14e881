//! Background diff worker.
//!
//! A single named thread runs every parse and render job in submission
//! order. Each request gets its own [`CancellationToken`] and answers through
//! a oneshot channel, so a cancelled request never leaks into the next one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::diff::{read_patch_with, FileData};
use crate::side_by_side::{assemble, DiffTheme, SideBySideOutput};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WorkerError {
    #[error("diff job was cancelled")]
    Cancelled,
    #[error("diff worker is not running")]
    Disconnected,
}

type Reply<T> = oneshot::Sender<Result<T, WorkerError>>;

enum Job {
    Parse {
        patch: String,
        token: CancellationToken,
        reply: Reply<Vec<FileData>>,
    },
    Render {
        files: Vec<FileData>,
        theme: DiffTheme,
        token: CancellationToken,
        reply: Reply<SideBySideOutput>,
    },
}

impl Job {
    fn run(self) {
        let started = Instant::now();
        match self {
            Job::Parse {
                patch,
                token,
                reply,
            } => {
                let result = read_patch_with(&patch, &token).ok_or(WorkerError::Cancelled);
                debug!(
                    elapsed = ?started.elapsed(),
                    files = result.as_ref().map_or(0, Vec::len),
                    cancelled = result.is_err(),
                    "parse finished"
                );
                // The requester may have given up waiting
                let _ = reply.send(result);
            }
            Job::Render {
                files,
                theme,
                token,
                reply,
            } => {
                let result = assemble(&files, &theme, &token).ok_or(WorkerError::Cancelled);
                debug!(
                    elapsed = ?started.elapsed(),
                    blocks = result.as_ref().map_or(0, SideBySideOutput::block_count),
                    cancelled = result.is_err(),
                    "render finished"
                );
                let _ = reply.send(result);
            }
        }
    }
}

/// Handle to one submitted job
#[derive(Debug)]
pub struct DiffTask<T> {
    rx: oneshot::Receiver<Result<T, WorkerError>>,
    token: CancellationToken,
}

impl<T> DiffTask<T> {
    /// Ask the worker to abandon this job at its next checkpoint
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub async fn wait(self) -> Result<T, WorkerError> {
        self.rx.await.unwrap_or(Err(WorkerError::Disconnected))
    }

    /// Blocking variant of [`DiffTask::wait`]; must not be called from
    /// inside an async runtime.
    pub fn blocking_wait(self) -> Result<T, WorkerError> {
        self.rx
            .blocking_recv()
            .unwrap_or(Err(WorkerError::Disconnected))
    }
}

pub struct DiffWorker {
    tx: Option<mpsc::UnboundedSender<Job>>,
    busy: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DiffWorker {
    /// Spawn the worker thread
    pub fn new() -> std::io::Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let busy = Arc::new(AtomicBool::new(false));
        let worker_busy = Arc::clone(&busy);

        let handle = thread::Builder::new()
            .name("diff-worker".into())
            .spawn(move || {
                while let Some(job) = rx.blocking_recv() {
                    worker_busy.store(true, Ordering::SeqCst);
                    job.run();
                    worker_busy.store(false, Ordering::SeqCst);
                }
                debug!("diff worker stopped");
            })?;

        Ok(Self {
            tx: Some(tx),
            busy,
            handle: Some(handle),
        })
    }

    /// Whether a job is being computed right now
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Parse patch text into files.
    ///
    /// An unparseable patch is not an error: the task resolves to an empty list.
    pub fn parse(&self, patch: impl Into<String>) -> DiffTask<Vec<FileData>> {
        self.parse_with_token(patch, CancellationToken::new())
    }

    pub fn parse_with_token(
        &self,
        patch: impl Into<String>,
        token: CancellationToken,
    ) -> DiffTask<Vec<FileData>> {
        let (reply, rx) = oneshot::channel();
        self.submit(Job::Parse {
            patch: patch.into(),
            token: token.clone(),
            reply,
        });
        DiffTask { rx, token }
    }

    /// Assemble parsed files into side-by-side output
    pub fn render(&self, files: Vec<FileData>, theme: DiffTheme) -> DiffTask<SideBySideOutput> {
        self.render_with_token(files, theme, CancellationToken::new())
    }

    pub fn render_with_token(
        &self,
        files: Vec<FileData>,
        theme: DiffTheme,
        token: CancellationToken,
    ) -> DiffTask<SideBySideOutput> {
        let (reply, rx) = oneshot::channel();
        self.submit(Job::Render {
            files,
            theme,
            token: token.clone(),
            reply,
        });
        DiffTask { rx, token }
    }

    fn submit(&self, job: Job) {
        // A rejected job drops its reply sender, which resolves the task as Disconnected
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(job).is_err() {
            debug!("diff worker channel closed, job dropped");
        }
    }
}

impl Drop for DiffWorker {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!("diff worker thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATCH: &str = "\
diff --git a/foo.txt b/foo.txt
index 1111111..2222222 100644
--- a/foo.txt
+++ b/foo.txt
@@ -1,3 +1,3 @@
 foo
-bar
+baz
 qux
";

    #[test]
    fn test_parse_then_render() {
        let worker = DiffWorker::new().unwrap();
        let files = worker.parse(PATCH).blocking_wait().unwrap();
        assert_eq!(files.len(), 1);

        let output = worker
            .render(files, DiffTheme::default())
            .blocking_wait()
            .unwrap();
        assert!(output.side.left.text.contains("bar"));
        assert!(output.side.right.text.contains("baz"));
    }

    #[tokio::test]
    async fn test_wait_async() {
        let worker = DiffWorker::new().unwrap();
        let files = worker.parse(PATCH).wait().await.unwrap();
        assert_eq!(files[0].file_info.right.file_name, "foo.txt");
    }

    #[test]
    fn test_unparseable_patch_is_empty_not_error() {
        let worker = DiffWorker::new().unwrap();
        let files = worker.parse("not a diff\n").blocking_wait().unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_cancelled_parse() {
        let worker = DiffWorker::new().unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let task = worker.parse_with_token(PATCH, token);
        assert_eq!(task.blocking_wait(), Err(WorkerError::Cancelled));
    }

    #[test]
    fn test_cancel_does_not_stick() {
        let worker = DiffWorker::new().unwrap();
        let files = worker.parse(PATCH).blocking_wait().unwrap();
        let reference = worker
            .render(files.clone(), DiffTheme::default())
            .blocking_wait()
            .unwrap();

        let cancelled = worker.render(files.clone(), DiffTheme::default());
        cancelled.cancel();
        // Either outcome is possible depending on timing, but never a partial one
        if let Ok(output) = cancelled.blocking_wait() {
            assert_eq!(output, reference);
        }

        let rerun = worker
            .render(files, DiffTheme::default())
            .blocking_wait()
            .unwrap();
        assert_eq!(rerun, reference);
    }

    #[test]
    fn test_requests_answer_in_order() {
        let worker = DiffWorker::new().unwrap();
        let first = worker.parse(PATCH);
        let second = worker.parse("");
        assert!(second.blocking_wait().unwrap().is_empty());
        assert_eq!(first.blocking_wait().unwrap().len(), 1);
    }

    #[test]
    fn test_dropped_reply_is_disconnected() {
        let (reply, rx) = oneshot::channel::<Result<(), WorkerError>>();
        drop(reply);
        let task = DiffTask {
            rx,
            token: CancellationToken::new(),
        };
        assert_eq!(task.blocking_wait(), Err(WorkerError::Disconnected));
    }

    #[test]
    fn test_idle_worker_is_not_busy() {
        let worker = DiffWorker::new().unwrap();
        assert!(!worker.is_busy());
    }
}
