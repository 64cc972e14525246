//! Orchestration: plan ranges, fetch them concurrently, merge in range
//! order, assign the payload exactly once.
//!
//! One worker thread per planned range (bounded by `max_concurrent` when
//! set) pulls work from a shared queue and reports over a channel. The
//! coordinator is the single synchronization point: it joins every worker
//! before touching the job, so the write-once payload slot has exactly one
//! writer and the invariant holds structurally, without a lock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::control::CancelToken;
use crate::error::{ChunkError, DownloadError, RangeFailure};
use crate::fetcher::{ChunkFetcher, ChunkResult, CurlChunkFetcher};
use crate::job::DownloadJob;
use crate::planner::{self, ByteRange};
use crate::probe;

/// Which job parameter drives range planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanStrategy {
    /// Split into `chunk_count` near-equal ranges.
    #[default]
    ByCount,
    /// Fixed `chunk_size` ranges, last truncated.
    BySize,
}

/// Runs download jobs: one concurrent fetch per planned range, ordered
/// merge, single payload assignment after a full join.
#[derive(Debug, Clone, Default)]
pub struct DownloadCoordinator {
    strategy: PlanStrategy,
    max_concurrent: Option<usize>,
    timeout: Option<Duration>,
    cancel: Option<CancelToken>,
}

impl DownloadCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan_strategy(mut self, strategy: PlanStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Cap on in-flight fetches. Without it, one worker runs per range.
    pub fn max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = Some(max.max(1));
        self
    }

    /// Deadline for the whole job. Elapsing yields `Timeout` and no payload.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Token the caller can fire to abort the job (`Cancelled`, no payload).
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Downloads `job`'s URL and assigns the merged payload.
    ///
    /// Probes the content length, plans ranges, fetches them concurrently
    /// with curl, and merges in range order. All-or-nothing: on any failure
    /// the payload slot stays empty.
    pub fn run(&self, job: &mut DownloadJob) -> Result<(), DownloadError> {
        if job.has_payload() {
            return Err(DownloadError::AlreadySet);
        }

        let probed = probe::probe(job.url()).map_err(DownloadError::Probe)?;
        let content_length = match probed.content_length {
            Some(n) if n > 0 => n,
            Some(_) => {
                return Err(DownloadError::InvalidConfig(
                    "content length is 0; nothing to download".to_string(),
                ))
            }
            None => {
                return Err(DownloadError::InvalidConfig(
                    "server did not report a content length".to_string(),
                ))
            }
        };
        if !probed.accept_ranges {
            tracing::warn!(
                url = job.url(),
                "server does not advertise range support; attempting range requests anyway"
            );
        }

        let token = self.cancel.clone().unwrap_or_default();
        let fetcher_token = token.clone();
        self.dispatch(
            job,
            content_length,
            move || CurlChunkFetcher::with_cancel_token(fetcher_token.clone()),
            token,
        )
    }

    /// Same pipeline as `run` minus the probe: plan, dispatch fetchers built
    /// by `make_fetcher`, join, merge, assign. Lets callers supply their own
    /// `ChunkFetcher` backend and a content length they already know.
    pub fn run_with<F, M>(
        &self,
        job: &mut DownloadJob,
        content_length: u64,
        make_fetcher: M,
    ) -> Result<(), DownloadError>
    where
        F: ChunkFetcher + 'static,
        M: Fn() -> F + Send + Sync + 'static,
    {
        if job.has_payload() {
            return Err(DownloadError::AlreadySet);
        }
        let token = self.cancel.clone().unwrap_or_default();
        self.dispatch(job, content_length, make_fetcher, token)
    }

    fn dispatch<F, M>(
        &self,
        job: &mut DownloadJob,
        content_length: u64,
        make_fetcher: M,
        token: CancelToken,
    ) -> Result<(), DownloadError>
    where
        F: ChunkFetcher + 'static,
        M: Fn() -> F + Send + Sync + 'static,
    {
        let ranges = match self.strategy {
            PlanStrategy::ByCount => planner::plan_by_count(content_length, job.chunk_count())?,
            PlanStrategy::BySize => planner::plan_by_size(content_length, job.chunk_size())?,
        };
        let count = ranges.len();
        tracing::info!(
            url = job.url(),
            ranges = count,
            content_length,
            "dispatching chunk fetches"
        );

        let deadline = self.timeout.map(|t| Instant::now() + t);
        let url = job.url().to_string();
        let work: Arc<Mutex<VecDeque<(usize, ByteRange)>>> =
            Arc::new(Mutex::new(ranges.iter().copied().enumerate().collect()));
        let stop = Arc::new(AtomicBool::new(false));
        let make_fetcher = Arc::new(make_fetcher);
        let (tx, rx) = mpsc::channel::<(usize, Result<Vec<u8>, ChunkError>)>();

        let num_workers = self.max_concurrent.unwrap_or(count).min(count).max(1);
        let mut handles = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let work = Arc::clone(&work);
            let stop = Arc::clone(&stop);
            let token = token.clone();
            let make = Arc::clone(&make_fetcher);
            let tx = tx.clone();
            let url = url.clone();
            handles.push(thread::spawn(move || loop {
                if stop.load(Ordering::Relaxed) || token.is_cancelled() {
                    break;
                }
                let (index, range) = match work.lock().unwrap().pop_front() {
                    Some(p) => p,
                    None => break,
                };
                let mut fetcher = make();
                fetcher.configure(&url, range);
                let res = match fetcher.execute() {
                    // execute succeeded but produced no data: contract violation
                    Ok(()) => fetcher.chunk_data().map_err(|_| ChunkError::ShortBody {
                        expected: range.len(),
                        received: 0,
                    }),
                    Err(e) => Err(e),
                };
                let _ = tx.send((index, res));
            }));
        }
        drop(tx);

        let mut slots: Vec<Option<ChunkResult>> = (0..count).map(|_| None).collect();
        let mut failures: Vec<RangeFailure> = Vec::new();
        let mut outcome: Option<DownloadError> = None;
        let mut received = 0usize;

        while received < count {
            let msg = match deadline {
                Some(d) => {
                    let now = Instant::now();
                    if now >= d {
                        Err(RecvTimeoutError::Timeout)
                    } else {
                        rx.recv_timeout(d - now)
                    }
                }
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match msg {
                Ok((index, res)) => {
                    received += 1;
                    match res {
                        Ok(data) => {
                            slots[index] = Some(ChunkResult {
                                range: ranges[index],
                                data,
                            })
                        }
                        Err(error) => {
                            let range = ranges[index];
                            tracing::warn!(
                                range = %range.range_value(),
                                error = %error,
                                "chunk fetch failed"
                            );
                            stop.store(true, Ordering::Relaxed);
                            failures.push(RangeFailure { range, error });
                        }
                    }
                    if token.is_cancelled() {
                        outcome = Some(DownloadError::Cancelled);
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    // arm the token so in-flight transfers stop too
                    token.cancel();
                    stop.store(true, Ordering::Relaxed);
                    outcome = Some(DownloadError::Timeout(
                        self.timeout.unwrap_or_default(),
                    ));
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        stop.store(true, Ordering::Relaxed);
        for h in handles {
            let _ = h.join();
        }

        if let Some(e) = outcome {
            return Err(e);
        }
        if token.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }
        if !failures.is_empty() {
            return Err(DownloadError::ChunkFetchFailed { failures });
        }

        let lost: Vec<RangeFailure> = ranges
            .iter()
            .enumerate()
            .filter(|(i, _)| slots[*i].is_none())
            .map(|(_, r)| RangeFailure {
                range: *r,
                error: ChunkError::WorkerLost,
            })
            .collect();
        if !lost.is_empty() {
            return Err(DownloadError::ChunkFetchFailed { failures: lost });
        }

        let mut merged = Vec::with_capacity(content_length as usize);
        for result in slots.into_iter().flatten() {
            if !result.length_matches() {
                return Err(DownloadError::ChunkFetchFailed {
                    failures: vec![RangeFailure {
                        range: result.range,
                        error: ChunkError::ShortBody {
                            expected: result.range.len(),
                            received: result.data.len() as u64,
                        },
                    }],
                });
            }
            merged.extend_from_slice(&result.data);
        }

        tracing::info!(bytes = merged.len(), "all ranges complete; assigning payload");
        job.set_payload(merged)
    }
}
