//! The four event shapes the checker dispatches on.
//!
//! A raw history carries many more event kinds (`:fail`, `:info`, other
//! operations) than the checker cares about; those are filtered out before
//! reaching this crate (by the parser or by whatever produced the event
//! slice). `Event` represents only what survives that filter: `invoke`/`ok`
//! events for `read`/`write`, which is exactly the four-arm shape below.

use core::fmt::{self, Debug, Display, Formatter};

/// A single filtered history event.
///
/// `WriteId` and `Value` are opaque to the checker: they require only
/// `Eq + Clone` (and, for write-ids used as map keys, `Hash`). The crate
/// never interprets their contents.
///
/// Serialization format (feature `serde`):
/// - Write: tagged enum, e.g. `{"InvokeWrite":{"time":1,"process":0,...}}`.
/// - Deserialize always also accepts the compact array form
///   `["iR", time, process]` / `["oR", time, process, write_id, value]` /
///   `["iW", time, process, write_id, prev_write_id, value]` /
///   `["oW", time, process, write_id]`, so a history file can use either.
#[cfg_attr(feature = "serde", derive(::serde::Serialize))]
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Event<WriteId, Value> {
    /// `invoke :read` -- a process begins a read.
    InvokeRead { time: u64, process: u64 },
    /// `ok :read` -- a process' read returns, attributing `value` to `write_id`.
    OkRead {
        time: u64,
        process: u64,
        write_id: WriteId,
        value: Value,
    },
    /// `invoke :write` -- a process proposes `write_id`, naming its CAS predecessor.
    InvokeWrite {
        time: u64,
        process: u64,
        write_id: WriteId,
        prev_write_id: WriteId,
        value: Value,
    },
    /// `ok :write` -- a process' write completes.
    OkWrite {
        time: u64,
        process: u64,
        write_id: WriteId,
    },
}

impl<WriteId, Value> Event<WriteId, Value> {
    /// The logical timestamp this event was observed at.
    #[must_use]
    pub const fn time(&self) -> u64 {
        match self {
            Self::InvokeRead { time, .. }
            | Self::OkRead { time, .. }
            | Self::InvokeWrite { time, .. }
            | Self::OkWrite { time, .. } => *time,
        }
    }

    /// The client/process this event belongs to.
    #[must_use]
    pub const fn process(&self) -> u64 {
        match self {
            Self::InvokeRead { process, .. }
            | Self::OkRead { process, .. }
            | Self::InvokeWrite { process, .. }
            | Self::OkWrite { process, .. } => *process,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, WriteId, Value> ::serde::Deserialize<'de> for Event<WriteId, Value>
where
    WriteId: ::serde::Deserialize<'de>,
    Value: ::serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: ::serde::Deserializer<'de>,
    {
        use ::serde::de::{self, MapAccess, SeqAccess, Visitor};

        struct EventVisitor<W, V>(core::marker::PhantomData<(W, V)>);

        impl<'de, W, V> Visitor<'de> for EventVisitor<W, V>
        where
            W: ::serde::Deserialize<'de>,
            V: ::serde::Deserialize<'de>,
        {
            type Value = Event<W, V>;

            fn expecting(&self, f: &mut Formatter) -> fmt::Result {
                f.write_str("an Event as tagged enum or compact array")
            }

            // Compact array: ["iR", t, p] / ["oR", t, p, wid, val] /
            // ["iW", t, p, wid, prev, val] / ["oW", t, p, wid]
            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let tag: alloc::string::String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &"at least 3"))?;
                let time: u64 = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &"at least 3"))?;
                let process: u64 = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(2, &"at least 3"))?;

                match tag.as_str() {
                    "iR" => Ok(Event::InvokeRead { time, process }),
                    "oR" => {
                        let write_id: W = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::invalid_length(3, &"5"))?;
                        let value: V = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::invalid_length(4, &"5"))?;
                        Ok(Event::OkRead {
                            time,
                            process,
                            write_id,
                            value,
                        })
                    }
                    "iW" => {
                        let write_id: W = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::invalid_length(3, &"6"))?;
                        let prev_write_id: W = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::invalid_length(4, &"6"))?;
                        let value: V = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::invalid_length(5, &"6"))?;
                        Ok(Event::InvokeWrite {
                            time,
                            process,
                            write_id,
                            prev_write_id,
                            value,
                        })
                    }
                    "oW" => {
                        let write_id: W = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::invalid_length(3, &"4"))?;
                        Ok(Event::OkWrite {
                            time,
                            process,
                            write_id,
                        })
                    }
                    other => Err(de::Error::custom(alloc::format!(
                        "unknown tag '{other}', expected one of iR/oR/iW/oW"
                    ))),
                }
            }

            // Tagged enum: {"InvokeRead": {...}}, {"OkRead": {...}}, etc.
            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let key: alloc::string::String = map
                    .next_key()?
                    .ok_or_else(|| de::Error::custom("expected an Event variant key"))?;

                match key.as_str() {
                    "InvokeRead" => {
                        #[derive(::serde::Deserialize)]
                        struct Fields {
                            time: u64,
                            process: u64,
                        }
                        let fields: Fields = map.next_value()?;
                        Ok(Event::InvokeRead {
                            time: fields.time,
                            process: fields.process,
                        })
                    }
                    "OkRead" => {
                        #[derive(::serde::Deserialize)]
                        struct Fields<W, V> {
                            time: u64,
                            process: u64,
                            write_id: W,
                            value: V,
                        }
                        let fields: Fields<W, V> = map.next_value()?;
                        Ok(Event::OkRead {
                            time: fields.time,
                            process: fields.process,
                            write_id: fields.write_id,
                            value: fields.value,
                        })
                    }
                    "InvokeWrite" => {
                        #[derive(::serde::Deserialize)]
                        struct Fields<W, V> {
                            time: u64,
                            process: u64,
                            write_id: W,
                            prev_write_id: W,
                            value: V,
                        }
                        let fields: Fields<W, V> = map.next_value()?;
                        Ok(Event::InvokeWrite {
                            time: fields.time,
                            process: fields.process,
                            write_id: fields.write_id,
                            prev_write_id: fields.prev_write_id,
                            value: fields.value,
                        })
                    }
                    "OkWrite" => {
                        #[derive(::serde::Deserialize)]
                        struct Fields<W> {
                            time: u64,
                            process: u64,
                            write_id: W,
                        }
                        let fields: Fields<W> = map.next_value()?;
                        Ok(Event::OkWrite {
                            time: fields.time,
                            process: fields.process,
                            write_id: fields.write_id,
                        })
                    }
                    other => Err(de::Error::unknown_variant(
                        other,
                        &["InvokeRead", "OkRead", "InvokeWrite", "OkWrite"],
                    )),
                }
            }
        }

        deserializer.deserialize_any(EventVisitor(core::marker::PhantomData))
    }
}

impl<WriteId, Value> Debug for Event<WriteId, Value>
where
    WriteId: Debug,
    Value: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvokeRead { time, process } => {
                write!(f, "{time}:invoke p{process} read")
            }
            Self::OkRead {
                time,
                process,
                write_id,
                value,
            } => write!(f, "{time}:ok p{process} read {write_id:?}={value:?}"),
            Self::InvokeWrite {
                time,
                process,
                write_id,
                prev_write_id,
                value,
            } => write!(
                f,
                "{time}:invoke p{process} write {prev_write_id:?}->{write_id:?}={value:?}"
            ),
            Self::OkWrite {
                time,
                process,
                write_id,
            } => write!(f, "{time}:ok p{process} write {write_id:?}"),
        }
    }
}

impl<WriteId, Value> Display for Event<WriteId, Value>
where
    WriteId: Display,
    Value: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvokeRead { time, process } => write!(f, "{time} p{process} invoke read"),
            Self::OkRead {
                time,
                process,
                write_id,
                value,
            } => write!(f, "{time} p{process} ok read {write_id}={value}"),
            Self::InvokeWrite {
                time,
                process,
                write_id,
                prev_write_id,
                value,
            } => write!(
                f,
                "{time} p{process} invoke write {write_id}<-{prev_write_id}={value}"
            ),
            Self::OkWrite {
                time,
                process,
                write_id,
            } => write!(f, "{time} p{process} ok write {write_id}"),
        }
    }
}
