//! History normaliser: filters and globally time-orders per-process events.
//!
//! Buckets events by `thread = process mod concurrency`, then runs a
//! bounded K-way merge (K <= concurrency) across the per-thread heads to
//! produce a single sequence monotonically non-decreasing in `time`, ties
//! broken by the smaller thread id. Each thread is consumed strictly in its
//! original order, so a tie between two events of the same thread can never
//! occur at the merge point -- only cross-thread ties need a tiebreak.

use alloc::vec::Vec;

use crate::error::InvalidHistory;
use crate::event::Event;

/// Merge per-process event slices into one time-ordered sequence.
///
/// `events` need not be grouped by process already; this function buckets
/// them by `process % concurrency` internally. Each bucket is assumed to
/// already be time-sorted (the harness contract); this is not itself
/// verified, but the merged output's monotonicity is.
///
/// # Errors
///
/// Returns [`InvalidHistory::NonMonotonicTime`] if the merged output is not
/// monotonically non-decreasing in `time` -- which can only happen if a
/// per-thread bucket was not actually time-sorted, i.e. a harness bug.
///
/// # Panics
///
/// Panics if `concurrency` is zero.
pub fn normalize<WriteId, Value>(
    events: &[Event<WriteId, Value>],
    concurrency: usize,
) -> Result<Vec<Event<WriteId, Value>>, InvalidHistory<WriteId>>
where
    WriteId: Clone,
    Value: Clone,
{
    assert!(concurrency > 0, "concurrency bound must be positive");

    tracing::debug!(
        events = events.len(),
        concurrency,
        "normalizing history"
    );

    let mut buckets: Vec<Vec<&Event<WriteId, Value>>> = vec![Vec::new(); concurrency];
    for event in events {
        let thread = (event.process() as usize) % concurrency;
        buckets[thread].push(event);
    }

    let mut cursors = vec![0usize; concurrency];
    let mut merged = Vec::with_capacity(events.len());

    loop {
        let mut chosen: Option<usize> = None;
        for (thread, bucket) in buckets.iter().enumerate() {
            let Some(head) = bucket.get(cursors[thread]) else {
                continue;
            };
            chosen = Some(match chosen {
                None => thread,
                Some(best) => {
                    let best_head = buckets[best][cursors[best]];
                    if head.time() < best_head.time() {
                        thread
                    } else {
                        best
                    }
                }
            });
        }

        let Some(thread) = chosen else { break };
        let event = buckets[thread][cursors[thread]].clone();
        cursors[thread] += 1;

        if let Some(last) = merged.last() {
            let last_time: u64 = last.time();
            if event.time() < last_time {
                return Err(InvalidHistory::NonMonotonicTime {
                    last: last_time,
                    current: event.time(),
                });
            }
        }
        merged.push(event);
    }

    tracing::trace!(merged = merged.len(), "normalized history produced");
    Ok(merged)
}

/// `BinaryHeap`-backed merge, O(n log C) instead of the default O(n * C).
///
/// Produces identical output to [`normalize`] for the same input; prefer
/// this when `concurrency` is large enough that the linear per-event scan
/// over thread heads becomes the bottleneck.
///
/// # Errors
///
/// Same as [`normalize`].
///
/// # Panics
///
/// Panics if `concurrency` is zero.
#[cfg(feature = "heap-merge")]
pub fn normalize_with_heap<WriteId, Value>(
    events: &[Event<WriteId, Value>],
    concurrency: usize,
) -> Result<Vec<Event<WriteId, Value>>, InvalidHistory<WriteId>>
where
    WriteId: Clone,
    Value: Clone,
{
    use alloc::collections::BinaryHeap;
    use core::cmp::Reverse;

    assert!(concurrency > 0, "concurrency bound must be positive");

    let mut buckets: Vec<Vec<&Event<WriteId, Value>>> = vec![Vec::new(); concurrency];
    for event in events {
        let thread = (event.process() as usize) % concurrency;
        buckets[thread].push(event);
    }

    // Heap key: (time, thread). Reverse makes it a min-heap.
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = BinaryHeap::with_capacity(concurrency);
    let mut cursors = vec![0usize; concurrency];
    for (thread, bucket) in buckets.iter().enumerate() {
        if let Some(head) = bucket.first() {
            heap.push(Reverse((head.time(), thread)));
        }
    }

    let mut merged = Vec::with_capacity(events.len());
    while let Some(Reverse((_, thread))) = heap.pop() {
        let event = buckets[thread][cursors[thread]].clone();
        cursors[thread] += 1;

        if let Some(last) = merged.last() {
            let last_time: u64 = last.time();
            if event.time() < last_time {
                return Err(InvalidHistory::NonMonotonicTime {
                    last: last_time,
                    current: event.time(),
                });
            }
        }
        merged.push(event);

        if let Some(next) = buckets[thread].get(cursors[thread]) {
            heap.push(Reverse((next.time(), thread)));
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(time: u64, process: u64, write_id: u64, prev: u64) -> Event<u64, u64> {
        Event::InvokeWrite {
            time,
            process,
            write_id,
            prev_write_id: prev,
            value: write_id,
        }
    }

    #[test]
    fn merges_two_threads_in_time_order() {
        let events = vec![w(1, 0, 1, 0), w(3, 0, 2, 1), w(2, 1, 3, 0)];
        let merged = normalize(&events, 2).unwrap();
        let times: Vec<u64> = merged.iter().map(Event::time).collect();
        assert_eq!(times, vec![1, 2, 3]);
    }

    #[test]
    fn ties_favor_smaller_thread() {
        let events = vec![w(1, 1, 1, 0), w(1, 0, 2, 0)];
        let merged = normalize(&events, 2).unwrap();
        assert_eq!(merged[0].process(), 0);
        assert_eq!(merged[1].process(), 1);
    }

    #[test]
    fn buckets_by_process_modulo_concurrency() {
        // processes 0 and 2 fall in the same thread under concurrency=2.
        let events = vec![w(1, 0, 1, 0), w(2, 2, 2, 1)];
        let merged = normalize(&events, 2).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn rejects_non_monotonic_thread_bucket() {
        // A single thread whose own bucket is not actually time-sorted.
        let events = vec![w(5, 0, 1, 0), w(1, 0, 2, 1)];
        let err = normalize(&events, 1).unwrap_err();
        assert_eq!(
            err,
            InvalidHistory::NonMonotonicTime {
                last: 5,
                current: 1
            }
        );
    }

    #[cfg(feature = "heap-merge")]
    #[test]
    fn heap_merge_matches_linear_merge() {
        let events = vec![w(1, 0, 1, 0), w(3, 0, 2, 1), w(2, 1, 3, 0), w(2, 2, 4, 0)];
        let linear = normalize(&events, 3).unwrap();
        let heap = normalize_with_heap(&events, 3).unwrap();
        assert_eq!(
            linear.iter().map(Event::time).collect::<Vec<_>>(),
            heap.iter().map(Event::time).collect::<Vec<_>>()
        );
    }
}
