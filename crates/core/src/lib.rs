//! Incremental linearizability checking for a single CAS register.
//!
//! `register_check_core` decides whether a history of concurrent `read`,
//! `write`, and compare-and-set `write` operations against a single
//! key/value register is linearizable with respect to a last-writer-wins
//! register whose writes form a chain (each write names its predecessor).
//!
//! The check runs in a single left-to-right pass over a causally-ordered
//! history: [`normalize::normalize`] turns the per-process event streams
//! into one globally time-ordered sequence via a bounded K-way merge, and
//! [`checker::Checker`] consumes that sequence event by event, maintaining
//! an accepted write-chain, the set of in-flight writes, and the set of
//! in-flight reads. A violation (stale read, impossible value, branching
//! chain, unknown write) is detected as soon as the evidence for it is
//! complete -- there is no backtracking and no exhaustive search.
//!
//! # Entry point
//!
//! The main entry point is [`check()`], which normalizes a raw event slice
//! and runs it through the checker, returning a [`Verdict`] or an
//! [`InvalidHistory`] error if the input itself is malformed (out-of-order
//! timestamps, duplicate write-ids, a second `invoke :read` on a process
//! that already has one outstanding).
//!
//! ```rust
//! use register_check_core::{check, Event};
//!
//! let events = vec![
//!     Event::InvokeWrite { time: 1, process: 0, write_id: "w1", prev_write_id: "w0", value: "v1" },
//!     Event::OkWrite { time: 2, process: 0, write_id: "w1" },
//!     Event::InvokeRead { time: 3, process: 1 },
//!     Event::OkRead { time: 4, process: 1, write_id: "w1", value: "v1" },
//! ];
//!
//! let verdict = check(&events, 2, ("w0", "v0")).unwrap();
//! assert!(verdict.is_valid());
//! ```
//!
//! # Crate features
//!
//! - **`serde`** -- enables `Serialize`/`Deserialize` derives on [`Event`].
//! - **`std`** -- enables `std::error::Error` impls on [`InvalidHistory`] and
//!   [`Violation`]; without it the crate is `no_std` (requires `alloc`).
//! - **`heap-merge`** -- enables [`normalize::normalize_with_heap`], a
//!   `BinaryHeap`-backed O(n log C) merge for large concurrency bounds,
//!   alongside the default O(n * C) linear-scan merge.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
extern crate alloc;

pub mod checker;
pub mod error;
pub mod event;
pub mod normalize;
pub mod verdict;

pub use checker::{check, Checker};
pub use error::InvalidHistory;
pub use event::Event;
pub use normalize::normalize;
pub use verdict::{Verdict, Violation};
