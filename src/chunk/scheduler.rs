//! Bounded parallel execution of per-chunk render tasks.
//!
//! Each chunk becomes one task on a dedicated rayon pool sized
//! `min(pool_size, chunk_count)`. Tasks share nothing mutable; each sends
//! its own [`RenderResult`] back over a channel. Errors and panics are
//! caught at the task boundary and turned into failure results, so one bad
//! chunk never cancels its siblings. Progress is advanced on the calling
//! thread as results arrive.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Instant;

use crossbeam_channel::unbounded;

use super::progress::{ProgressConfig, ProgressEvent, ProgressSink, ProgressTracker};
use crate::error::{Error, Result};
use crate::model::{Chunk, RenderResult};

/// What a successful chunk task reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOutput {
    /// Path of the written document
    pub output_path: PathBuf,
    /// Number of layout elements placed
    pub element_count: usize,
}

/// Dispatches chunk tasks to a bounded worker pool.
#[derive(Debug, Clone)]
pub struct ChunkScheduler {
    pool_size: usize,
    progress: ProgressConfig,
}

impl ChunkScheduler {
    /// Create a scheduler with at most `pool_size` workers.
    pub fn new(pool_size: usize) -> Result<Self> {
        if pool_size == 0 {
            return Err(Error::InvalidConfig(
                "worker pool size must be greater than zero".into(),
            ));
        }
        Ok(Self {
            pool_size,
            progress: ProgressConfig::default(),
        })
    }

    /// Set progress throttling.
    pub fn with_progress(mut self, progress: ProgressConfig) -> Self {
        self.progress = progress;
        self
    }

    /// Configured upper bound on workers.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Number of workers used for `chunk_count` chunks.
    pub fn worker_count(&self, chunk_count: usize) -> usize {
        self.pool_size.min(chunk_count).max(1)
    }

    /// Render every chunk and return one result per chunk, ordered by index.
    ///
    /// Only pool construction can fail the whole run. Completion order is
    /// unspecified; `render` must not rely on it.
    pub fn run<F>(
        &self,
        chunks: &[Chunk],
        render: F,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<RenderResult>>
    where
        F: Fn(&Chunk) -> Result<ChunkOutput> + Sync,
    {
        let total = chunks.len();
        if total == 0 {
            sink.on_progress(&ProgressEvent {
                completed: 0,
                total: 0,
                percent: 100,
                timestamp: chrono::Utc::now(),
            });
            return Ok(Vec::new());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_count(total))
            .thread_name(|i| format!("txtpdf-chunk-{}", i))
            .build()
            .map_err(|e| Error::Pool(e.to_string()))?;

        log::debug!(
            "Scheduling {} chunk(s) on {} worker(s)",
            total,
            self.worker_count(total)
        );

        let (sender, receiver) = unbounded::<RenderResult>();
        let mut tracker = ProgressTracker::new(total, self.progress, Instant::now());
        let mut results = Vec::with_capacity(total);
        let render = &render;

        pool.in_place_scope(|scope| {
            for chunk in chunks {
                let sender = sender.clone();
                scope.spawn(move |_| {
                    let result = run_isolated(chunk, render);
                    // The receiver outlives every task in this scope.
                    let _ = sender.send(result);
                });
            }
            drop(sender);

            for result in receiver.iter() {
                results.push(result);
                if let Some(event) = tracker.record_completion(Instant::now()) {
                    sink.on_progress(&event);
                }
            }
        });

        results.sort_by_key(RenderResult::chunk_index);
        Ok(results)
    }
}

/// Run one task, converting errors and panics into a failure result.
fn run_isolated<F>(chunk: &Chunk, render: &F) -> RenderResult
where
    F: Fn(&Chunk) -> Result<ChunkOutput> + Sync,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| render(chunk)))
        .unwrap_or_else(|payload| Err(Error::TaskPanicked(panic_message(payload.as_ref()))));

    match outcome {
        Ok(output) => {
            RenderResult::success(chunk.index, output.output_path, output.element_count)
        }
        Err(err) => {
            log::error!("Chunk failed: {} | chunk={}", err, chunk.index);
            RenderResult::failure(chunk.index, &err)
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::progress::NoProgress;
    use crate::error::ErrorKind;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn chunks(n: usize) -> Vec<Chunk> {
        (0..n).map(|i| Chunk::new(i, i..i + 1, i..i + 1)).collect()
    }

    fn ok_output(chunk: &Chunk) -> ChunkOutput {
        ChunkOutput {
            output_path: PathBuf::from(format!("out_{}.pdf", chunk.index)),
            element_count: chunk.index,
        }
    }

    #[test]
    fn test_zero_pool_rejected() {
        assert!(matches!(ChunkScheduler::new(0), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_worker_count_clamped_to_chunks() {
        let scheduler = ChunkScheduler::new(8).unwrap();
        assert_eq!(scheduler.worker_count(3), 3);
        assert_eq!(scheduler.worker_count(20), 8);
        assert_eq!(scheduler.worker_count(0), 1);
    }

    #[test]
    fn test_all_success_ordered_by_index() {
        let scheduler = ChunkScheduler::new(4).unwrap();
        let input = chunks(10);
        let results = scheduler
            .run(&input, |c| Ok(ok_output(c)), &NoProgress)
            .unwrap();

        assert_eq!(results.len(), 10);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.chunk_index(), i);
            assert!(result.is_success());
        }
    }

    #[test]
    fn test_failures_partition_regardless_of_pool_size() {
        let failing: HashSet<usize> = [1, 4, 5, 9].into_iter().collect();
        let input = chunks(12);

        for pool_size in [1, 2, 3, 16] {
            let scheduler = ChunkScheduler::new(pool_size).unwrap();
            let results = scheduler
                .run(
                    &input,
                    |c| {
                        if failing.contains(&c.index) {
                            Err(Error::FontNotFound(PathBuf::from("missing.ttf")))
                        } else {
                            Ok(ok_output(c))
                        }
                    },
                    &NoProgress,
                )
                .unwrap();

            assert_eq!(results.len(), 12);
            let failed: HashSet<usize> = results
                .iter()
                .filter(|r| !r.is_success())
                .map(RenderResult::chunk_index)
                .collect();
            assert_eq!(failed, failing, "pool size {}", pool_size);
            assert!(results
                .iter()
                .filter_map(RenderResult::error_kind)
                .all(|k| k == ErrorKind::FontNotFound));
        }
    }

    #[test]
    fn test_panic_is_isolated() {
        let scheduler = ChunkScheduler::new(2).unwrap();
        let input = chunks(4);
        let results = scheduler
            .run(
                &input,
                |c| {
                    if c.index == 2 {
                        panic!("layout exploded");
                    }
                    Ok(ok_output(c))
                },
                &NoProgress,
            )
            .unwrap();

        assert_eq!(results.len(), 4);
        assert_eq!(results[2].error_kind(), Some(ErrorKind::TaskPanicked));
        match &results[2] {
            RenderResult::Failure { message, .. } => assert!(message.contains("layout exploded")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(results.iter().filter(|r| r.is_success()).count(), 3);
    }

    #[test]
    fn test_never_exceeds_pool_size() {
        let scheduler = ChunkScheduler::new(2).unwrap();
        let input = chunks(8);
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        scheduler
            .run(
                &input,
                |c| {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(10));
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok(ok_output(c))
                },
                &NoProgress,
            )
            .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_progress_monotonic_and_final() {
        let scheduler = ChunkScheduler::new(3).unwrap().with_progress(ProgressConfig {
            percent_threshold: 25,
            min_interval: Duration::from_secs(60),
        });
        let input = chunks(9);
        let seen = Mutex::new(Vec::new());
        let sink = |e: &ProgressEvent| seen.lock().unwrap().push((e.completed, e.percent));

        scheduler
            .run(
                &input,
                |c| {
                    if c.index % 4 == 0 {
                        Err(Error::Pdf("boom".into()))
                    } else {
                        Ok(ok_output(c))
                    }
                },
                &sink,
            )
            .unwrap();

        let events = seen.into_inner().unwrap();
        assert!(!events.is_empty());
        assert!(events.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(events.last(), Some(&(9, 100)));
    }

    #[test]
    fn test_empty_run_reports_complete() {
        let scheduler = ChunkScheduler::new(2).unwrap();
        let seen = Mutex::new(Vec::new());
        let sink = |e: &ProgressEvent| seen.lock().unwrap().push(e.percent);
        let results = scheduler
            .run(&[], |c| Ok(ok_output(c)), &sink)
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(*seen.lock().unwrap(), vec![100]);
    }
}
