//! Aligning many queries in parallel
//!
//! Queries are distributed over a fixed number of worker threads through a
//! channel. Graphs and aligners are shared read-only, every worker allocates its
//! own lattice, queue, distances and predecessors per alignment.

use std::thread;

use tracing::{debug, trace};

/// Apply `work` to every item using `num_threads` worker threads
///
/// Results are returned in the order of `items`.
pub fn process_parallel<T, R, F>(items: &[T], num_threads: usize, work: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let num_threads = num_threads.clamp(1, items.len().max(1));
    debug!(items = items.len(), num_threads, "starting workers");

    let (tx, rx) = crossbeam_channel::unbounded();
    let (tx_out, rx_out) = crossbeam_channel::unbounded();

    for job in items.iter().enumerate() {
        // The receiving end is alive until all workers are done
        let _ = tx.send(job);
    }
    drop(tx);

    thread::scope(|scope| {
        for worker in 0..num_threads {
            let thread_rx = rx.clone();
            let tx_out_thread = tx_out.clone();
            let work = &work;

            scope.spawn(move || {
                while let Ok((ix, item)) = thread_rx.recv() {
                    trace!(worker, ix, "processing");

                    if tx_out_thread.send((ix, work(item))).is_err() {
                        break;
                    }
                }
            });
        }

        drop(tx_out);
    });

    let mut results: Vec<(usize, R)> = rx_out.into_iter().collect();
    results.sort_unstable_by_key(|(ix, _)| *ix);

    results.into_iter()
        .map(|(_, result)| result)
        .collect()
}
