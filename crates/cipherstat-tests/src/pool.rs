//! Batch execution over independent samples.
//!
//! Workers pull the next sample index from a shared counter, run the whole
//! battery on it and keep their results locally; results are stitched back into
//! input order once every worker has joined. Samples share nothing mutable, so
//! the only synchronisation is the counter itself.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::battery::{BatteryConfig, BatteryReport, run_battery_with};
use crate::bits::BitSequence;
use crate::error::SequenceError;

/// Worker pool sizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker threads; 0 means one per available core.
    pub workers: usize,
}

impl PoolConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }

    /// Threads to start for `jobs` samples: never more than there are samples,
    /// never fewer than one.
    pub fn worker_count(&self, jobs: usize) -> usize {
        let requested = if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.workers
        };
        requested.min(jobs).max(1)
    }
}

/// How sample text is turned into a [`BitSequence`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Reject any character other than '0' and '1'.
    #[default]
    Strict,
    /// Drop any character other than '0' and '1'.
    Lenient,
}

impl ParsePolicy {
    pub fn parse(self, input: &str) -> Result<BitSequence, SequenceError> {
        match self {
            Self::Strict => BitSequence::parse(input),
            Self::Lenient => Ok(BitSequence::parse_lenient(input)),
        }
    }
}

/// Run the battery on every sample; reports come back in input order.
pub fn run_batch(
    samples: &[BitSequence],
    battery: &BatteryConfig,
    pool: &PoolConfig,
) -> Vec<BatteryReport> {
    parallel_map(samples, pool, |seq| run_battery_with(seq, battery))
}

/// Parse and test every sample. A malformed sample yields its own error and
/// does not affect the others.
pub fn run_batch_strings<S: AsRef<str> + Sync>(
    samples: &[S],
    policy: ParsePolicy,
    battery: &BatteryConfig,
    pool: &PoolConfig,
) -> Vec<Result<BatteryReport, SequenceError>> {
    parallel_map(samples, pool, |sample| {
        let seq = policy.parse(sample.as_ref())?;
        Ok(run_battery_with(&seq, battery))
    })
}

fn parallel_map<T, R, F>(items: &[T], pool: &PoolConfig, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = pool.worker_count(total);
    log::debug!("running {total} samples on {workers} workers");

    let next = AtomicUsize::new(0);
    let completed = AtomicUsize::new(0);
    let log_every = (total / 20).max(1);
    let (next, completed, f) = (&next, &completed, &f);

    let finished: Vec<Vec<(usize, R)>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                s.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let i = next.fetch_add(1, Ordering::Relaxed);
                        if i >= total {
                            break;
                        }
                        done.push((i, f(&items[i])));
                        let count = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        if count % log_every == 0 || count == total {
                            log::info!("processed {count}/{total} samples");
                        }
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    });

    let mut slots: Vec<Option<R>> = (0..total).map(|_| None).collect();
    for (i, result) in finished.into_iter().flatten() {
        slots[i] = Some(result);
    }
    slots.into_iter().flatten().collect()
}
