//! The checker state machine: the core acceptance procedure for a CAS chain.
//!
//! [`Checker`] consumes a normalized event sequence one event at a time,
//! dispatching on `(type, f)` into four transitions (`start_write`,
//! `end_write`, `start_read`, `end_read`). `end_write` and the write-arm of
//! `end_read` both funnel into [`Checker::observe_write`], the core
//! procedure that promotes a pending write -- and transitively, any
//! unaccepted predecessors it depends on -- into the accepted chain, or
//! detects that doing so would branch the chain.

use hashbrown::{HashMap, HashSet};

use alloc::vec::Vec;
use core::hash::Hash;

use crate::error::InvalidHistory;
use crate::event::Event;
use crate::normalize::normalize;
use crate::verdict::{Verdict, Violation};

/// An accepted write: its value, its place in the chain, and when it landed.
#[derive(Debug, Clone)]
struct WriteRecord<WriteId, Value> {
    value: Value,
    prev_write_id: Option<WriteId>,
    next_write_id: Option<WriteId>,
    lts: u64,
    observed_at: u64,
}

/// A write whose `invoke` has been observed but whose `ok` has not (nor has
/// any read yet observed it).
#[derive(Debug, Clone)]
struct PendingWrite<WriteId, Value> {
    prev_write_id: WriteId,
    value: Value,
}

/// A read in flight, tagged with the chain head at its start.
#[derive(Debug, Clone)]
struct PendingRead<WriteId> {
    started_at: u64,
    snapshot_latest: WriteId,
}

/// Incremental linearizability checker for a single CAS register.
///
/// Created with a seeded genesis `(write_id, value)` pair -- the chain's
/// root, with `lts = 0` and no predecessor -- and fed events one at a time
/// via [`Checker::apply`] until either the input is exhausted or a
/// violation is recorded.
pub struct Checker<WriteId, Value> {
    write_ids: HashSet<WriteId>,
    accepted_writes: HashMap<WriteId, WriteRecord<WriteId, Value>>,
    accepted_latest: WriteId,
    pending_writes: HashMap<WriteId, PendingWrite<WriteId, Value>>,
    pending_reads: HashMap<u64, PendingRead<WriteId>>,
    violation: Option<Violation<WriteId, Value>>,
    last_ts: u64,
}

impl<WriteId, Value> Checker<WriteId, Value>
where
    WriteId: Eq + Hash + Clone,
    Value: Eq + Clone,
{
    /// Create a checker seeded with the genesis write.
    #[must_use]
    pub fn new(genesis_write_id: WriteId, genesis_value: Value) -> Self {
        let mut accepted_writes = HashMap::new();
        accepted_writes.insert(
            genesis_write_id.clone(),
            WriteRecord {
                value: genesis_value,
                prev_write_id: None,
                next_write_id: None,
                lts: 0,
                observed_at: 0,
            },
        );
        let mut write_ids = HashSet::new();
        write_ids.insert(genesis_write_id.clone());

        Self {
            write_ids,
            accepted_writes,
            accepted_latest: genesis_write_id,
            pending_writes: HashMap::new(),
            pending_reads: HashMap::new(),
            violation: None,
            last_ts: 0,
        }
    }

    /// Whether a violation has already been recorded. Once true, further
    /// calls to [`Checker::apply`] are a no-op -- the caller should stop
    /// feeding events (see [`check`]).
    #[must_use]
    pub const fn has_violation(&self) -> bool {
        self.violation.is_some()
    }

    /// The chain head's write-id, for tests inspecting chain integrity (P3).
    #[must_use]
    pub const fn accepted_latest(&self) -> &WriteId {
        &self.accepted_latest
    }

    /// Number of accepted writes, including the genesis write (P3/P4).
    #[must_use]
    pub fn accepted_count(&self) -> usize {
        self.accepted_writes.len()
    }

    /// Whether `write_id` is accepted, pending, or neither (P4).
    #[must_use]
    pub fn is_accepted(&self, write_id: &WriteId) -> bool {
        self.accepted_writes.contains_key(write_id)
    }

    #[must_use]
    pub fn is_pending(&self, write_id: &WriteId) -> bool {
        self.pending_writes.contains_key(write_id)
    }

    /// Consume the checker and produce its final verdict.
    #[must_use]
    pub fn into_verdict(self) -> Verdict<WriteId, Value> {
        match self.violation {
            None => Verdict::valid(),
            Some(violation) => Verdict::invalid(violation),
        }
    }

    /// Apply one normalized event to the state machine.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHistory`] if the event violates the harness
    /// contract (out-of-order time, duplicate write-id, a second pending
    /// read on the same process, or an `ok` with no matching `invoke`).
    /// Linearizability violations are *not* errors here; they are recorded
    /// internally and surfaced via [`Checker::into_verdict`].
    pub fn apply(&mut self, event: &Event<WriteId, Value>) -> Result<(), InvalidHistory<WriteId>> {
        if self.violation.is_some() {
            return Ok(());
        }

        match event {
            Event::InvokeWrite {
                time,
                write_id,
                prev_write_id,
                value,
                ..
            } => self.start_write(*time, prev_write_id.clone(), write_id.clone(), value.clone()),
            Event::OkWrite { time, write_id, .. } => self.end_write(*time, write_id.clone()),
            Event::InvokeRead { time, process } => self.start_read(*time, *process),
            Event::OkRead {
                time,
                process,
                write_id,
                value,
            } => self.end_read(*time, *process, write_id.clone(), value.clone()),
        }
    }

    fn check_monotonic(&mut self, ts: u64) -> Result<(), InvalidHistory<WriteId>> {
        if ts < self.last_ts {
            return Err(InvalidHistory::NonMonotonicTime {
                last: self.last_ts,
                current: ts,
            });
        }
        Ok(())
    }

    /// `invoke :write` -- §4.2.1.
    fn start_write(
        &mut self,
        ts: u64,
        prev: WriteId,
        wid: WriteId,
        value: Value,
    ) -> Result<(), InvalidHistory<WriteId>> {
        self.check_monotonic(ts)?;
        if self.write_ids.contains(&wid) {
            return Err(InvalidHistory::DuplicateWriteId(wid));
        }
        self.write_ids.insert(wid.clone());
        self.pending_writes.insert(
            wid,
            PendingWrite {
                prev_write_id: prev,
                value,
            },
        );
        self.last_ts = ts;
        Ok(())
    }

    /// `ok :write` -- §4.2.2.
    fn end_write(&mut self, ts: u64, wid: WriteId) -> Result<(), InvalidHistory<WriteId>> {
        self.check_monotonic(ts)?;
        if !self.accepted_writes.contains_key(&wid) {
            self.observe_write(ts, wid);
        }
        self.last_ts = ts;
        Ok(())
    }

    /// The core acceptance procedure -- §4.2.3.
    ///
    /// Walks backwards from `wid` through `pending_writes`, collecting the
    /// unaccepted tail, until it reaches a token that is already accepted
    /// (or neither pending nor accepted). If that base is the current chain
    /// head, promotes the whole tail; if it is an interior node, records a
    /// [`Violation::BranchingChain`]; if it is unknown, records
    /// [`Violation::UnknownWrite`] naming the unresolved token.
    fn observe_write(&mut self, ts: u64, wid: WriteId) {
        if self.accepted_writes.contains_key(&wid) {
            return;
        }

        // successor-to-predecessor order: tail[0] is `wid` itself.
        let mut tail: Vec<(WriteId, PendingWrite<WriteId, Value>)> = Vec::new();
        let mut cur = wid;
        let base = loop {
            match self.pending_writes.remove(&cur) {
                Some(pending) => {
                    let prev = pending.prev_write_id.clone();
                    tail.push((cur, pending));
                    cur = prev;
                }
                None => break cur,
            }
        };
        // predecessor-to-successor order, matching the chain direction.
        tail.reverse();

        if !self.accepted_writes.contains_key(&base) {
            self.violation = Some(Violation::UnknownWrite(base));
            return;
        }

        if base == self.accepted_latest {
            let mut lts = self.accepted_writes[&base].lts;
            let mut prev_tok = base;
            for (tok, pending) in tail {
                lts += 1;
                if let Some(prev_record) = self.accepted_writes.get_mut(&prev_tok) {
                    prev_record.next_write_id = Some(tok.clone());
                }
                self.accepted_writes.insert(
                    tok.clone(),
                    WriteRecord {
                        value: pending.value,
                        prev_write_id: Some(prev_tok.clone()),
                        next_write_id: None,
                        lts,
                        observed_at: ts,
                    },
                );
                prev_tok = tok;
            }
            self.accepted_latest = prev_tok;
        } else {
            let opponent = self.accepted_writes[&base]
                .next_write_id
                .clone()
                .expect("an accepted non-head write always has a successor");
            self.violation = Some(Violation::BranchingChain {
                base,
                chain: tail.into_iter().map(|(tok, _)| tok).collect(),
                opponent,
            });
        }
    }

    /// `invoke :read` -- §4.2.4.
    fn start_read(&mut self, ts: u64, process: u64) -> Result<(), InvalidHistory<WriteId>> {
        self.check_monotonic(ts)?;
        if self.pending_reads.contains_key(&process) {
            return Err(InvalidHistory::DuplicatePendingRead { process });
        }
        self.pending_reads.insert(
            process,
            PendingRead {
                started_at: ts,
                snapshot_latest: self.accepted_latest.clone(),
            },
        );
        self.last_ts = ts;
        Ok(())
    }

    /// `ok :read` -- §4.2.5.
    fn end_read(
        &mut self,
        ts: u64,
        process: u64,
        wid: WriteId,
        value: Value,
    ) -> Result<(), InvalidHistory<WriteId>> {
        self.check_monotonic(ts)?;
        let pending = self
            .pending_reads
            .remove(&process)
            .ok_or(InvalidHistory::MissingInvoke { process })?;
        self.last_ts = ts;

        if self.accepted_writes.contains_key(&wid) {
            self.check_read(&pending, wid, value);
        } else if self.pending_writes.contains_key(&wid) {
            self.observe_write(ts, wid.clone());
            // `observe_write` either promotes `wid` to the chain head or
            // records a violation; either way it is safe to fall through.
            if self.violation.is_none() {
                self.check_read(&pending, wid, value);
            }
        } else {
            self.violation = Some(Violation::UnknownWrite(wid));
        }
        Ok(())
    }

    /// §4.2.6 -- staleness and value checks against the read's snapshot.
    fn check_read(&mut self, pending: &PendingRead<WriteId>, wid: WriteId, value: Value) {
        let known = &self.accepted_writes[&pending.snapshot_latest];
        let seen = &self.accepted_writes[&wid];

        if known.lts > seen.lts {
            let fresher_chain = self.chain_between(&pending.snapshot_latest, &wid);
            self.violation = Some(Violation::StaleRead {
                write_id: wid,
                fresher_chain,
                observed_at: known.observed_at,
                read_started_at: pending.started_at,
            });
        } else if seen.value != value {
            self.violation = Some(Violation::ValueMismatch {
                write_id: wid,
                expected: seen.value.clone(),
                got: value,
            });
        }
    }

    /// Walk `prev_write_id` from `from` down to (and including) `until`.
    fn chain_between(&self, from: &WriteId, until: &WriteId) -> Vec<WriteId> {
        let mut chain = Vec::new();
        let mut cur = from.clone();
        loop {
            chain.push(cur.clone());
            if cur == *until {
                break;
            }
            cur = self.accepted_writes[&cur]
                .prev_write_id
                .clone()
                .expect("chain from the head reaches every ancestor, including `until`");
        }
        chain
    }
}

/// Normalize `events` under `concurrency` and run them through a fresh
/// [`Checker`] seeded with `genesis`, stopping at the first violation.
///
/// # Errors
///
/// Returns [`InvalidHistory`] if the history is malformed -- either the
/// normaliser's monotonicity check fails, or the checker rejects an event
/// as a harness-contract violation.
pub fn check<WriteId, Value>(
    events: &[Event<WriteId, Value>],
    concurrency: usize,
    genesis: (WriteId, Value),
) -> Result<Verdict<WriteId, Value>, InvalidHistory<WriteId>>
where
    WriteId: Eq + Hash + Clone,
    Value: Eq + Clone,
{
    let merged = normalize(events, concurrency)?;

    let (genesis_write_id, genesis_value) = genesis;
    let mut checker = Checker::new(genesis_write_id, genesis_value);

    for event in &merged {
        checker.apply(event)?;
        if checker.has_violation() {
            break;
        }
    }

    Ok(checker.into_verdict())
}
