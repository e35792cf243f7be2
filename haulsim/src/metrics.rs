//! Derives per-entity utilization and queueing metrics from a finished
//! event log.
//!
//! This is a pure consumer of the simulation core: it folds over the log
//! once and never feeds anything back into scheduling. Idle time is pinned
//! as `sim_time - (mining + travel + unloading)`; queueing delay is tracked
//! separately and does not subtract from idle.

use std::time::Duration;

use serde::Serialize;

use crate::event::minute_repr;
use crate::{whole_minutes, EventKind, EventLog, StationId, TruckId};

/// Aggregated performance stats for a single truck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TruckMetrics {
    /// The truck this entry describes.
    pub id: TruckId,
    /// Percentage of the horizon spent mining, traveling, or unloading.
    pub utilization: f64,
    /// Horizon time not covered by any productive activity.
    #[serde(with = "minute_repr")]
    pub idle_time: Duration,
    /// Completed unloads.
    pub trips_completed: usize,
    /// Completed mining operations.
    pub mines_completed: usize,
    /// Times the truck waited in line at a station.
    pub queues_completed: usize,
    /// Total time spent mining.
    #[serde(with = "minute_repr")]
    pub mining_time: Duration,
    /// Total time spent traveling, in either direction.
    #[serde(with = "minute_repr")]
    pub travel_time: Duration,
    /// Total time spent unloading.
    #[serde(with = "minute_repr")]
    pub unloading_time: Duration,
    /// Total time spent waiting to unload.
    #[serde(with = "minute_repr")]
    pub queueing_time: Duration,
    /// Mean productive minutes per completed trip.
    pub avg_trip_time: f64,
    /// Mean wait in minutes per queue event.
    pub avg_queueing_time: f64,
}

impl TruckMetrics {
    fn new(id: TruckId) -> Self {
        Self {
            id,
            utilization: 0.0,
            idle_time: Duration::default(),
            trips_completed: 0,
            mines_completed: 0,
            queues_completed: 0,
            mining_time: Duration::default(),
            travel_time: Duration::default(),
            unloading_time: Duration::default(),
            queueing_time: Duration::default(),
            avg_trip_time: 0.0,
            avg_queueing_time: 0.0,
        }
    }
}

/// Aggregated performance stats for a single unload station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMetrics {
    /// The station this entry describes.
    pub id: StationId,
    /// Percentage of the horizon spent unloading trucks.
    pub utilization: f64,
    /// Horizon time not spent unloading.
    #[serde(with = "minute_repr")]
    pub idle_time: Duration,
    /// Trucks unloaded.
    pub throughput: usize,
    /// Trucks that waited for this station.
    pub queues_completed: usize,
    /// Total time spent unloading.
    #[serde(with = "minute_repr")]
    pub unloading_time: Duration,
    /// Total time trucks waited for this station.
    #[serde(with = "minute_repr")]
    pub queueing_time: Duration,
    /// Mean wait in minutes per queued truck.
    pub avg_queueing_time: f64,
}

impl StationMetrics {
    fn new(id: StationId) -> Self {
        Self {
            id,
            utilization: 0.0,
            idle_time: Duration::default(),
            throughput: 0,
            queues_completed: 0,
            unloading_time: Duration::default(),
            queueing_time: Duration::default(),
            avg_queueing_time: 0.0,
        }
    }
}

/// Full metrics report, serializable as the JSON output of the `sim`
/// binary.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// Length of the simulated horizon in minutes.
    pub simulation_minutes: u64,
    /// One entry per truck, in id order.
    pub trucks: &'a [TruckMetrics],
    /// One entry per station, in id order.
    pub stations: &'a [StationMetrics],
}

impl<'a> Report<'a> {
    /// Assembles a report over already-computed metrics.
    #[must_use]
    pub fn new(
        sim_time: Duration,
        trucks: &'a [TruckMetrics],
        stations: &'a [StationMetrics],
    ) -> Self {
        Self {
            simulation_minutes: whole_minutes(sim_time),
            trucks,
            stations,
        }
    }
}

fn as_minutes_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() / 60.0
}

fn percentage(part: Duration, whole: Duration) -> f64 {
    if whole == Duration::default() {
        0.0
    } else {
        part.as_secs_f64() / whole.as_secs_f64() * 100.0
    }
}

/// Computes per-truck and per-station metrics from a finished event log.
///
/// `num_trucks` and `num_stations` size the result vectors so that entities
/// that never appear in the log still get a (fully idle) entry.
///
/// # Panics
///
/// Panics if the log contains a `Queue` or `Unload` event without a station
/// id, or ids outside the given ranges — both impossible for logs produced
/// by a [`Controller`](crate::Controller) over the same configuration.
#[must_use]
pub fn compute(
    sim_time: Duration,
    log: &EventLog,
    num_trucks: usize,
    num_stations: usize,
) -> (Vec<TruckMetrics>, Vec<StationMetrics>) {
    let mut trucks: Vec<_> = (0..num_trucks)
        .map(|id| TruckMetrics::new(TruckId::from(id)))
        .collect();
    let mut stations: Vec<_> = (0..num_stations)
        .map(|id| StationMetrics::new(StationId::from(id)))
        .collect();

    for event in log {
        let span = event.end_time - event.start_time;
        let truck = &mut trucks[usize::from(event.truck_id)];
        match event.kind {
            EventKind::Mine => {
                truck.mining_time += span;
                truck.mines_completed += 1;
            }
            EventKind::TravelToStation | EventKind::TravelToMine => {
                truck.travel_time += span;
            }
            EventKind::Queue => {
                truck.queueing_time += span;
                truck.queues_completed += 1;
                let station_id = event.station_id.expect("queue event without a station");
                let station = &mut stations[usize::from(station_id)];
                station.queueing_time += span;
                station.queues_completed += 1;
            }
            EventKind::Unload => {
                truck.unloading_time += span;
                truck.trips_completed += 1;
                let station_id = event.station_id.expect("unload event without a station");
                let station = &mut stations[usize::from(station_id)];
                station.unloading_time += span;
                station.throughput += 1;
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    for truck in &mut trucks {
        let busy = truck.mining_time + truck.travel_time + truck.unloading_time;
        truck.idle_time = sim_time.saturating_sub(busy);
        truck.utilization = percentage(busy, sim_time);
        if truck.trips_completed > 0 {
            truck.avg_trip_time = as_minutes_f64(busy) / truck.trips_completed as f64;
        }
        if truck.queues_completed > 0 {
            truck.avg_queueing_time =
                as_minutes_f64(truck.queueing_time) / truck.queues_completed as f64;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    for station in &mut stations {
        station.idle_time = sim_time.saturating_sub(station.unloading_time);
        station.utilization = percentage(station.unloading_time, sim_time);
        if station.queues_completed > 0 {
            station.avg_queueing_time =
                as_minutes_f64(station.queueing_time) / station.queues_completed as f64;
        }
    }

    (trucks, stations)
}
