//! Integration tests against the public `register_check_core` API, as
//! distinct from the checker's internal unit tests.

use register_check_core::{check, Event, InvalidHistory, Violation};

fn genesis() -> (&'static str, &'static str) {
    ("w0", "v0")
}

/// A longer chain spanning three writers, with reads interleaved both
/// before and after their write's `ok`.
#[test]
fn multi_writer_chain_is_valid() {
    let events = vec![
        Event::InvokeWrite {
            time: 1,
            process: 0,
            write_id: "w1",
            prev_write_id: "w0",
            value: "v1",
        },
        Event::OkWrite {
            time: 2,
            process: 0,
            write_id: "w1",
        },
        Event::InvokeWrite {
            time: 3,
            process: 1,
            write_id: "w2",
            prev_write_id: "w1",
            value: "v2",
        },
        Event::InvokeRead { time: 4, process: 2 },
        Event::OkRead {
            time: 5,
            process: 2,
            write_id: "w2",
            value: "v2",
        },
        Event::OkWrite {
            time: 6,
            process: 1,
            write_id: "w2",
        },
        Event::InvokeRead { time: 7, process: 0 },
        Event::OkRead {
            time: 8,
            process: 0,
            write_id: "w2",
            value: "v2",
        },
    ];

    let verdict = check(&events, 3, genesis()).unwrap();
    assert!(verdict.is_valid(), "{:?}", verdict.violation());
}

/// A CAS race: two processes both attempt to extend `w0` after observing
/// it as the latest write; exactly one should win, and the history as
/// given here has both succeed, which is impossible.
#[test]
fn concurrent_cas_race_is_a_branching_chain() {
    let events = vec![
        Event::InvokeWrite {
            time: 1,
            process: 0,
            write_id: "wa",
            prev_write_id: "w0",
            value: "va",
        },
        Event::InvokeWrite {
            time: 2,
            process: 1,
            write_id: "wb",
            prev_write_id: "w0",
            value: "vb",
        },
        Event::OkWrite {
            time: 3,
            process: 0,
            write_id: "wa",
        },
        Event::OkWrite {
            time: 4,
            process: 1,
            write_id: "wb",
        },
    ];

    let verdict = check(&events, 2, genesis()).unwrap();
    assert!(!verdict.is_valid());
    assert!(matches!(
        verdict.violation(),
        Some(Violation::BranchingChain { base: "w0", .. })
    ));
}

/// A read that returns a write-id nobody ever invoked is `UnknownWrite`,
/// not a crash or panic.
#[test]
fn phantom_write_id_is_rejected() {
    let events = vec![
        Event::InvokeRead { time: 1, process: 0 },
        Event::OkRead {
            time: 2,
            process: 0,
            write_id: "nonexistent",
            value: "v",
        },
    ];

    let verdict = check(&events, 1, genesis()).unwrap();
    assert!(!verdict.is_valid());
    assert_eq!(
        verdict.violation(),
        Some(&Violation::UnknownWrite("nonexistent"))
    );
}

/// Time must be non-decreasing across the merged history; a process whose
/// own events run backwards in time is a harness bug, not a checker verdict.
#[test]
fn backwards_time_is_invalid_history_not_a_violation() {
    let events = vec![
        Event::InvokeWrite {
            time: 5,
            process: 0,
            write_id: "w1",
            prev_write_id: "w0",
            value: "v1",
        },
        Event::OkWrite {
            time: 1,
            process: 0,
            write_id: "w1",
        },
    ];

    let err = check(&events, 1, genesis()).unwrap_err();
    assert!(matches!(err, InvalidHistory::NonMonotonicTime { .. }));
}
