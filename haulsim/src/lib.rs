//! Haul truck cycle simulation.
//!
//! A closed-loop fleet of trucks cycles between a mining site and a shared
//! bank of unload stations: **Mine → TravelToStation → (Queue) → Unload →
//! TravelToMine → Mine → …**. The [`Controller`] drives a deterministic
//! discrete-event loop over a fixed horizon, appending every scheduled
//! activity to an [`EventLog`]; [`metrics`] derives per-entity utilization
//! and queueing delay from the finished log.

#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::default_trait_access)]

use std::time::Duration;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

mod controller;
pub use controller::Controller;

mod event;
pub use event::{read_events, write_events, Event, EventKind, ReadEventsError};

mod event_log;
pub use event_log::EventLog;

pub mod metrics;
pub use metrics::{StationMetrics, TruckMetrics};

mod resource;
pub use resource::{ResourceError, ResourceQueue};

mod sampler;
pub use sampler::{FixedDurations, MiningDurations, UniformDurations};

/// Truck ID.
#[derive(
    From,
    Into,
    Debug,
    PartialEq,
    PartialOrd,
    Eq,
    Ord,
    Serialize,
    Deserialize,
    Copy,
    Clone,
    Hash,
    Display,
)]
pub struct TruckId(usize);

/// Station ID.
#[derive(
    From,
    Into,
    Debug,
    PartialEq,
    PartialOrd,
    Eq,
    Ord,
    Serialize,
    Deserialize,
    Copy,
    Clone,
    Hash,
    Display,
)]
pub struct StationId(usize);

/// Time of one travel leg, either towards the stations or back to the mine.
pub const TRAVEL_TIME: Duration = Duration::from_secs(30 * 60);

/// Time a truck occupies a station while unloading.
pub const UNLOAD_TIME: Duration = Duration::from_secs(5 * 60);

/// Shortest possible mining operation.
pub const MIN_MINING_TIME: Duration = Duration::from_secs(60 * 60);

/// Longest possible mining operation.
pub const MAX_MINING_TIME: Duration = Duration::from_secs(300 * 60);

/// Seed used for the mining duration stream unless one is given explicitly.
pub const DEFAULT_SEED: u64 = 0xBEEF;

/// Converts a number of whole minutes into a [`Duration`].
#[must_use]
pub fn minutes(count: u64) -> Duration {
    Duration::from_secs(count * 60)
}

/// Converts a [`Duration`] back into whole minutes.
#[must_use]
pub fn whole_minutes(duration: Duration) -> u64 {
    duration.as_secs() / 60
}
