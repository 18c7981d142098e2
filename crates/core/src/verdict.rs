//! Linearizability violations and the final checker verdict.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Debug, Display, Formatter};

/// A detected linearizability violation, naming the conflicting write-ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation<WriteId, Value> {
    /// A read or `ok :write` referenced a write-id never proposed via `invoke :write`.
    UnknownWrite(WriteId),
    /// A pending write's predecessor is an interior (non-head) node of the
    /// accepted chain, whose successor slot is already occupied by `opponent`.
    BranchingChain {
        /// The accepted write both chains descend from.
        base: WriteId,
        /// The rejected chain of (formerly pending) writes attempting to
        /// extend `base`, in predecessor-to-successor order.
        chain: Vec<WriteId>,
        /// The write that already occupies `base`'s successor slot.
        opponent: WriteId,
    },
    /// A read returned a write older than the chain head snapshotted at read start.
    StaleRead {
        /// The write-id the read actually returned.
        write_id: WriteId,
        /// The chain from the read's snapshot down to `write_id`, inclusive of both ends.
        fresher_chain: Vec<WriteId>,
        /// When the fresher write was accepted.
        observed_at: u64,
        /// When the read started.
        read_started_at: u64,
    },
    /// The read's value disagrees with the value proposed with that write-id.
    ValueMismatch {
        write_id: WriteId,
        expected: Value,
        got: Value,
    },
}

impl<WriteId, Value> Display for Violation<WriteId, Value>
where
    WriteId: Display,
    Value: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownWrite(wid) => write!(f, "unknown write {wid}"),
            Self::BranchingChain {
                base,
                chain,
                opponent,
            } => {
                write!(f, "branching chain at {base}: ")?;
                write_chain(f, core::iter::once(base).chain(chain.iter()))?;
                write!(f, " conflicts with {base} -> {opponent}")
            }
            Self::StaleRead {
                write_id,
                fresher_chain,
                observed_at,
                read_started_at,
            } => {
                write!(
                    f,
                    "stale read of {write_id}: a fresher write was accepted at {observed_at} \
                     before the read (started at {read_started_at}) returned; fresher chain: "
                )?;
                write_chain(f, fresher_chain.iter())
            }
            Self::ValueMismatch {
                write_id,
                expected,
                got,
            } => write!(
                f,
                "value mismatch for {write_id}: expected {expected}, got {got}"
            ),
        }
    }
}

fn write_chain<'a, W: Display + 'a>(
    f: &mut Formatter<'_>,
    chain: impl Iterator<Item = &'a W>,
) -> fmt::Result {
    for (i, wid) in chain.enumerate() {
        if i > 0 {
            write!(f, " -> ")?;
        }
        write!(f, "{wid}")?;
    }
    Ok(())
}

/// The outcome of checking a history: either valid, or invalid with a
/// [`Violation`] naming the conflicting write-ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict<WriteId, Value> {
    violation: Option<Violation<WriteId, Value>>,
}

impl<WriteId, Value> Verdict<WriteId, Value> {
    /// A verdict for a history with no detected violation.
    #[must_use]
    pub const fn valid() -> Self {
        Self { violation: None }
    }

    /// A verdict for a history with a detected violation.
    #[must_use]
    pub const fn invalid(violation: Violation<WriteId, Value>) -> Self {
        Self {
            violation: Some(violation),
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.violation.is_none()
    }

    /// The structured violation, if any.
    #[must_use]
    pub const fn violation(&self) -> Option<&Violation<WriteId, Value>> {
        self.violation.as_ref()
    }

    /// A human-readable diagnostic, or `None` if the history is valid.
    #[must_use]
    pub fn details(&self) -> Option<String>
    where
        WriteId: Display,
        Value: Display,
    {
        self.violation.as_ref().map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_has_no_details() {
        let v: Verdict<u64, u64> = Verdict::valid();
        assert!(v.is_valid());
        assert_eq!(v.details(), None);
    }

    #[test]
    fn branching_chain_renders_both_arms() {
        let v: Verdict<&str, &str> = Verdict::invalid(Violation::BranchingChain {
            base: "w0",
            chain: alloc::vec!["w2"],
            opponent: "w1",
        });
        assert_eq!(
            v.details().unwrap(),
            "branching chain at w0: w0 -> w2 conflicts with w0 -> w1"
        );
    }

    #[test]
    fn stale_read_renders_chain() {
        let v: Verdict<&str, &str> = Verdict::invalid(Violation::StaleRead {
            write_id: "w0",
            fresher_chain: alloc::vec!["w1", "w0"],
            observed_at: 2,
            read_started_at: 3,
        });
        let details = v.details().unwrap();
        assert!(details.contains("w1 -> w0"));
        assert!(details.contains("accepted at 2"));
        assert!(details.contains("started at 3"));
    }

    #[test]
    fn value_mismatch_names_expected_and_got() {
        let v: Verdict<&str, &str> = Verdict::invalid(Violation::ValueMismatch {
            write_id: "w1",
            expected: "v1",
            got: "v2",
        });
        assert_eq!(
            v.details().unwrap(),
            "value mismatch for w1: expected v1, got v2"
        );
    }
}
