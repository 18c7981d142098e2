//! Harness/protocol errors -- malformed input, not linearizability violations.
//!
//! These are assertion-style failures: the history could not have been
//! produced by a well-behaved test harness talking to *any* register, let
//! alone a linearizable one. They are raised as a distinct `Result::Err`,
//! never folded into a [`Verdict`](crate::verdict::Verdict).

use core::fmt::{self, Debug, Display, Formatter};

/// The input history is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidHistory<WriteId> {
    /// An event's `time` is strictly less than the last processed `time`.
    NonMonotonicTime { last: u64, current: u64 },
    /// A write-id was proposed via `invoke :write` more than once.
    DuplicateWriteId(WriteId),
    /// A process issued `invoke :read` while it already had one outstanding.
    DuplicatePendingRead { process: u64 },
    /// An `ok` event arrived on a process with no matching prior `invoke`.
    MissingInvoke { process: u64 },
}

impl<WriteId: Debug> Display for InvalidHistory<WriteId> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonMonotonicTime { last, current } => write!(
                f,
                "non-monotonic time: event at {current} follows event at {last}"
            ),
            Self::DuplicateWriteId(wid) => write!(f, "write-id {wid:?} proposed more than once"),
            Self::DuplicatePendingRead { process } => {
                write!(f, "process {process} has a read already in flight")
            }
            Self::MissingInvoke { process } => {
                write!(f, "process {process} completed an operation with no matching invoke")
            }
        }
    }
}

#[cfg(feature = "std")]
impl<WriteId: Debug> std::error::Error for InvalidHistory<WriteId> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_non_monotonic() {
        let e: InvalidHistory<u64> = InvalidHistory::NonMonotonicTime {
            last: 5,
            current: 3,
        };
        assert_eq!(
            format!("{e}"),
            "non-monotonic time: event at 3 follows event at 5"
        );
    }

    #[test]
    fn display_duplicate_write_id() {
        let e: InvalidHistory<&str> = InvalidHistory::DuplicateWriteId("w1");
        assert_eq!(format!("{e}"), "write-id \"w1\" proposed more than once");
    }
}
