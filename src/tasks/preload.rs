//! Preload Task
//!
//! Proactively populates caches by running a batch of memoized calls
//! concurrently, without the caller waiting on them.

use std::future::Future;

use futures::future::{join_all, BoxFuture};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Outcome of one preload batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub succeeded: usize,
    /// Names of the tasks that failed
    pub failed: Vec<String>,
}

/// A batch of named warm-up futures.
///
/// ```ignore
/// Preloader::new()
///     .task("stats", async move { stats.call(()).await.map(drop) })
///     .task("recent", async move { recent.call(1).await.map(drop) })
///     .spawn();
/// ```
#[derive(Default)]
pub struct Preloader {
    tasks: Vec<(String, BoxFuture<'static, anyhow::Result<()>>)>,
}

impl Preloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task. Any error type convertible into `anyhow::Error` works.
    pub fn task<F, E>(mut self, name: impl Into<String>, fut: F) -> Self
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<anyhow::Error> + Send + 'static,
    {
        let fut = async move { fut.await.map_err(Into::<anyhow::Error>::into) };
        self.tasks.push((name.into(), Box::pin(fut)));
        self
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Runs every task concurrently on the runtime. Failures are logged,
    /// never propagated; the handle may be dropped.
    pub fn spawn(self) -> JoinHandle<PreloadReport> {
        tokio::spawn(self.run())
    }

    /// Runs every task concurrently and waits for all of them.
    pub async fn run(self) -> PreloadReport {
        let (names, futures): (Vec<String>, Vec<_>) = self.tasks.into_iter().unzip();
        let results = join_all(futures).await;

        let mut report = PreloadReport::default();
        for (name, result) in names.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    debug!("Preloaded '{}'", name);
                    report.succeeded += 1;
                }
                Err(e) => {
                    warn!("Preload of '{}' failed: {:#}", name, e);
                    report.failed.push(name);
                }
            }
        }

        info!(
            "Preload finished: {} succeeded, {} failed",
            report.succeeded,
            report.failed.len()
        );
        report
    }
}
