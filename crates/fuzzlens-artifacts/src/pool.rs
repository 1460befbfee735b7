//! A small scoped worker pool.
//!
//! Items are fed through a shared job queue to `jobs` scoped threads and the
//! results are put back in input order.

use crossbeam_channel::unbounded;
use std::num::NonZeroUsize;
use std::thread;

/// Number of workers used when the caller does not ask for a specific count.
pub fn default_jobs() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Applies `f` to every item on up to `jobs` threads, preserving order.
///
/// `jobs == 0` means [`default_jobs`]. A single job runs on the calling thread.
pub fn parallel_map<T, R, F>(items: &[T], jobs: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let jobs = if jobs == 0 { default_jobs() } else { jobs };
    let workers = jobs.min(items.len());
    if workers <= 1 {
        return items.iter().map(f).collect();
    }

    let (job_tx, job_rx) = unbounded::<(usize, &T)>();
    let (result_tx, result_rx) = unbounded::<(usize, R)>();
    for job in items.iter().enumerate() {
        // Receivers are alive until the scope below ends.
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    let f = &f;
    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (index, item) in job_rx {
                    if result_tx.send((index, f(item))).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(items.len()).collect();
    for (index, result) in result_rx {
        slots[index] = Some(result);
    }
    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_order_is_preserved() {
        let items: Vec<u64> = (0..200).collect();
        let squares = parallel_map(&items, 8, |n| n * n);
        assert_eq!(squares, items.iter().map(|n| n * n).collect::<Vec<_>>());
    }

    #[test]
    fn test_every_item_runs_once() {
        let calls = AtomicUsize::new(0);
        let items = vec!["a"; 37];
        let out = parallel_map(&items, 4, |s| {
            calls.fetch_add(1, Ordering::SeqCst);
            s.len()
        });
        assert_eq!(out.len(), 37);
        assert_eq!(calls.load(Ordering::SeqCst), 37);
    }

    #[test]
    fn test_sequential_and_empty() {
        assert_eq!(parallel_map(&[1, 2, 3], 1, |n| n + 1), vec![2, 3, 4]);
        assert!(parallel_map(&[] as &[i32], 0, |n| *n).is_empty());
        assert!(default_jobs() >= 1);
    }
}
