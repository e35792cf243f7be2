use std::fmt;
use std::io;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{whole_minutes, StationId, TruckId};

/// The kind of activity an [`Event`] records.
///
/// The five variant names are exactly the strings used on the wire.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::ToString,
)]
pub enum EventKind {
    /// A truck is loading at the mining site.
    Mine,
    /// A truck is driving from the mine towards the stations.
    TravelToStation,
    /// A truck is waiting for its station to become free.
    Queue,
    /// A truck is unloading at a station.
    Unload,
    /// A truck is driving back to the mine.
    TravelToMine,
}

/// One recorded occurrence of an activity.
///
/// Immutable once created; `station_id` is present only for [`Queue`] and
/// [`Unload`] events. `start_time <= end_time` always holds, and activities
/// of a single truck never overlap.
///
/// [`Queue`]: EventKind::Queue
/// [`Unload`]: EventKind::Unload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// What happened.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// The truck performing the activity.
    pub truck_id: TruckId,
    /// The station involved, if any.
    pub station_id: Option<StationId>,
    /// When the activity started.
    #[serde(with = "minute_repr")]
    pub start_time: Duration,
    /// When the activity ended.
    #[serde(with = "minute_repr")]
    pub end_time: Duration,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [Truck {}]",
            self.kind.to_string(),
            self.truck_id
        )?;
        if let Some(station_id) = self.station_id {
            write!(f, " [Station {}]", station_id)?;
        }
        write!(
            f,
            " Start: {}m End: {}m",
            whole_minutes(self.start_time),
            whole_minutes(self.end_time)
        )
    }
}

/// Serializes durations as whole minutes, the granularity of the simulation.
pub(crate) mod minute_repr {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::{minutes, whole_minutes};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(whole_minutes(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(minutes)
    }
}

/// Failure to read back a persisted event log.
#[derive(Debug, Error)]
pub enum ReadEventsError {
    /// The underlying reader failed.
    #[error("failed to read event log")]
    Io(#[from] io::Error),
    /// A line did not parse as an event record.
    #[error("malformed event record")]
    Malformed(#[from] serde_json::Error),
}

/// Writes `events` as JSON Lines: one object per event, in the given order.
///
/// # Errors
///
/// Returns an error if the writer fails or an event cannot be serialized.
pub fn write_events<W: io::Write>(mut writer: W, events: &[Event]) -> io::Result<()> {
    for event in events {
        serde_json::to_writer(&mut writer, event)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Reads a JSON Lines event log back, skipping blank lines.
///
/// # Errors
///
/// Returns an error if the reader fails or a non-blank line is not a valid
/// event record.
pub fn read_events<R: io::BufRead>(reader: R) -> Result<Vec<Event>, ReadEventsError> {
    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        events.push(serde_json::from_str(&line)?);
    }
    Ok(events)
}
