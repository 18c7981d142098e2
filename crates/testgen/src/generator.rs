use chrono::{DateTime, Duration, Local};
use rand::distr::{Distribution, Uniform};
use rand::RngExt;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use register_check_core::Event;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

#[derive(Clone, Debug, Default, Deserialize, Serialize, TypedBuilder)]
pub struct HistParams {
    pub id: u64,
    pub n_process: u64,
    pub n_write: u64,
    pub n_read: u64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct History {
    params: HistParams,
    info: String,
    start: DateTime<Local>,
    end: DateTime<Local>,
    data: Vec<Event<u64, u64>>,
}

impl History {
    #[must_use]
    pub const fn new(
        params: HistParams,
        info: String,
        start: DateTime<Local>,
        end: DateTime<Local>,
        data: Vec<Event<u64, u64>>,
    ) -> Self {
        Self {
            params,
            info,
            start,
            end,
            data,
        }
    }

    #[must_use]
    pub const fn get_id(&self) -> u64 {
        self.params.id
    }

    #[must_use]
    pub const fn get_data(&self) -> &Vec<Event<u64, u64>> {
        &self.data
    }

    #[must_use]
    pub const fn get_params(&self) -> &HistParams {
        &self.params
    }

    #[must_use]
    pub fn get_cloned_params(&self) -> HistParams {
        self.params.clone()
    }

    #[must_use]
    pub fn get_duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Genesis write-id and value every generated history is seeded with;
/// `register_check_core::check` must be called with this same pair.
pub const GENESIS: (u64, u64) = (0, 0);

/// Generate a single valid CAS-chain history: `n_write` writes extending
/// the genesis write in sequence, round-robined across `n_process`
/// processes, plus `n_read` reads of already-accepted writes.
///
/// # Coherence invariant
///
/// Every generated read observes a write-id that is, at the moment the
/// read's `ok` is emitted, already accepted -- sampled from a running
/// `latest_writes`-style tracker of the chain built so far, mirroring the
/// reference generator's approach for its own read/write histories.
///
/// # Panics
///
/// Panics if `n_write` is zero (there would be no non-genesis write for
/// reads to observe).
#[must_use]
pub fn generate_single_history(n_process: u64, n_write: u64, n_read: u64) -> Vec<Event<u64, u64>> {
    assert!(n_write > 0, "n_write must be positive");

    let mut rng = rand::rng();
    let process_range = Uniform::new(0, n_process.max(1)).unwrap();

    let mut events = Vec::with_capacity(((n_write + n_read) * 2) as usize);
    let mut accepted: Vec<u64> = vec![GENESIS.0];
    let mut time = 1u64;
    let mut prev = GENESIS.0;

    for wid in 1..=n_write {
        let process = process_range.sample(&mut rng);
        events.push(Event::InvokeWrite {
            time,
            process,
            write_id: wid,
            prev_write_id: prev,
            value: wid,
        });
        time += 1;
        events.push(Event::OkWrite {
            time,
            process,
            write_id: wid,
        });
        time += 1;
        accepted.push(wid);
        prev = wid;

        if n_read > 0 && rng.random::<bool>() {
            emit_read(&mut events, &mut time, &process_range, &mut rng, &accepted);
        }
    }

    let remaining_reads = n_read.saturating_sub(
        u64::try_from(events.iter().filter(|e| matches!(e, Event::OkRead { .. })).count())
            .unwrap_or(0),
    );
    for _ in 0..remaining_reads {
        emit_read(&mut events, &mut time, &process_range, &mut rng, &accepted);
    }

    events
}

fn emit_read(
    events: &mut Vec<Event<u64, u64>>,
    time: &mut u64,
    process_range: &Uniform<u64>,
    rng: &mut impl rand::Rng,
    accepted: &[u64],
) {
    let process = process_range.sample(rng);
    let index_range = Uniform::new(0, accepted.len()).unwrap();
    let write_id = accepted[index_range.sample(rng)];
    events.push(Event::InvokeRead {
        time: *time,
        process,
    });
    *time += 1;
    events.push(Event::OkRead {
        time: *time,
        process,
        write_id,
        value: write_id,
    });
    *time += 1;
}

/// Generate a history that violates `BranchingChain`: two processes both
/// extend the genesis write and both succeed.
#[must_use]
pub fn generate_branching_chain(n_process: u64) -> Vec<Event<u64, u64>> {
    let p0 = 0;
    let p1 = n_process.max(2) - 1;
    vec![
        Event::InvokeWrite {
            time: 1,
            process: p0,
            write_id: 1,
            prev_write_id: GENESIS.0,
            value: 1,
        },
        Event::OkWrite {
            time: 2,
            process: p0,
            write_id: 1,
        },
        Event::InvokeWrite {
            time: 3,
            process: p1,
            write_id: 2,
            prev_write_id: GENESIS.0,
            value: 2,
        },
        Event::OkWrite {
            time: 4,
            process: p1,
            write_id: 2,
        },
    ]
}

/// Generate a history that violates `StaleRead`: a read returns the
/// genesis write after a fresher write has already been accepted.
#[must_use]
pub fn generate_stale_read() -> Vec<Event<u64, u64>> {
    vec![
        Event::InvokeWrite {
            time: 1,
            process: 0,
            write_id: 1,
            prev_write_id: GENESIS.0,
            value: 1,
        },
        Event::OkWrite {
            time: 2,
            process: 0,
            write_id: 1,
        },
        Event::InvokeRead { time: 3, process: 1 },
        Event::OkRead {
            time: 4,
            process: 1,
            write_id: GENESIS.0,
            value: GENESIS.1,
        },
    ]
}

/// Generate a history that violates `ValueMismatch`: a read attributes a
/// value to an accepted write-id that does not match what was proposed.
#[must_use]
pub fn generate_value_mismatch() -> Vec<Event<u64, u64>> {
    vec![
        Event::InvokeWrite {
            time: 1,
            process: 0,
            write_id: 1,
            prev_write_id: GENESIS.0,
            value: 1,
        },
        Event::OkWrite {
            time: 2,
            process: 0,
            write_id: 1,
        },
        Event::InvokeRead { time: 3, process: 1 },
        Event::OkRead {
            time: 4,
            process: 1,
            write_id: 1,
            value: 999,
        },
    ]
}

/// Generate a history that violates `UnknownWrite`: a read attributes a
/// value to a write-id that was never proposed.
#[must_use]
pub fn generate_unknown_write() -> Vec<Event<u64, u64>> {
    vec![
        Event::InvokeRead { time: 1, process: 0 },
        Event::OkRead {
            time: 2,
            process: 0,
            write_id: 404,
            value: 0,
        },
    ]
}

#[must_use]
pub fn generate_mult_histories(n_hist: u64, n_process: u64, n_write: u64, n_read: u64) -> Vec<History> {
    (0..n_hist)
        .into_par_iter()
        .map(|i_hist| {
            let start_time = Local::now();
            let data = generate_single_history(n_process, n_write, n_read);
            let end_time = Local::now();
            History {
                params: HistParams {
                    id: i_hist,
                    n_process,
                    n_write,
                    n_read,
                },
                info: "generated".to_string(),
                start: start_time,
                end: end_time,
                data,
            }
        })
        .collect()
}
