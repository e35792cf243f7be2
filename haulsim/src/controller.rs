use std::cmp::{self, Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::event::{Event, EventKind};
use crate::event_log::EventLog;
use crate::resource::{ResourceError, ResourceQueue};
use crate::sampler::{MiningDurations, UniformDurations};
use crate::{whole_minutes, StationId, TruckId, TRAVEL_TIME, UNLOAD_TIME};

/// A scheduled transition waiting in the global event queue.
///
/// Ordered by `(end_time, seq)` where `seq` is the insertion sequence
/// number. The pair is a total order, so equal completion times never fall
/// back to unspecified heap behavior and repeated runs with the same seed
/// pop in the same order.
#[derive(Debug)]
struct Pending {
    end_time: Reverse<Duration>,
    seq: Reverse<u64>,
    event: Event,
}

impl Pending {
    fn key(&self) -> (Reverse<Duration>, Reverse<u64>) {
        (self.end_time, self.seq)
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Drives the simulation: owns the global event queue and both resource
/// queues, dispatches state transitions, enforces the horizon cutoff, and
/// emits events into the log.
///
/// Each truck cycles **Mine → TravelToStation → (Queue) → Unload →
/// TravelToMine → Mine**. Queueing is not a scheduled state of its own; it
/// is recorded as a side event whenever a truck reaches the stations before
/// one is free. A transition whose end time would exceed the horizon is
/// dropped and the truck's participation silently ends — intentional
/// truncation, not an error.
pub struct Controller {
    num_trucks: usize,
    num_stations: usize,
    horizon: Duration,
    sampler: Box<dyn MiningDurations>,
    trucks: ResourceQueue,
    stations: ResourceQueue,
    pending: BinaryHeap<Pending>,
    next_seq: u64,
}

impl Controller {
    /// Creates a controller over the given fleet with the default seed.
    ///
    /// Zero trucks or zero stations are legal degenerate configurations:
    /// the former produces an empty log, the latter a log in which trucks
    /// mine and travel but never unload.
    #[must_use]
    pub fn new(num_trucks: usize, num_stations: usize) -> Self {
        Self::with_sampler(num_trucks, num_stations, UniformDurations::default())
    }

    /// Creates a controller whose mining durations are drawn from a stream
    /// seeded with `seed`. Two controllers built with the same arguments
    /// produce identical event logs.
    #[must_use]
    pub fn with_seed(num_trucks: usize, num_stations: usize, seed: u64) -> Self {
        Self::with_sampler(num_trucks, num_stations, UniformDurations::new(seed))
    }

    /// Creates a controller with an explicit duration source.
    #[must_use]
    pub fn with_sampler<S: MiningDurations + 'static>(
        num_trucks: usize,
        num_stations: usize,
        sampler: S,
    ) -> Self {
        Self {
            num_trucks,
            num_stations,
            horizon: Duration::default(),
            sampler: Box::new(sampler),
            trucks: ResourceQueue::new(0),
            stations: ResourceQueue::new(0),
            pending: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Number of trucks in the fleet.
    #[must_use]
    pub fn num_trucks(&self) -> usize {
        self.num_trucks
    }

    /// Number of unload stations.
    #[must_use]
    pub fn num_stations(&self) -> usize {
        self.num_stations
    }

    /// Runs the simulation for `sim_time` of logical time, appending every
    /// scheduled activity to `log`, and returns once the global event queue
    /// is drained.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if a resource queue invariant breaks.
    /// That indicates a scheduling bug; no partial results should be
    /// trusted afterwards.
    pub fn run(&mut self, sim_time: Duration, log: &mut EventLog) -> Result<(), ResourceError> {
        self.horizon = sim_time;
        self.trucks = ResourceQueue::new(self.num_trucks);
        self.stations = ResourceQueue::new(self.num_stations);
        self.pending.clear();
        self.next_seq = 0;

        if self.num_trucks == 0 {
            log::warn!("no trucks configured; nothing to simulate");
            return Ok(());
        }
        if self.num_stations == 0 {
            log::warn!("no unload stations configured; trucks will never unload");
        }

        for _ in 0..self.num_trucks {
            let (time, id) = self.trucks.pop_next()?;
            self.mine(TruckId::from(id), time, log)?;
        }
        while let Some(entry) = self.pending.pop() {
            self.dispatch(entry.event, log)?;
        }
        log::info!(
            "simulation drained after {} events over a {}m horizon",
            log.len(),
            whole_minutes(sim_time)
        );
        Ok(())
    }

    fn dispatch(&mut self, event: Event, log: &mut EventLog) -> Result<(), ResourceError> {
        let truck_id = event.truck_id;
        let completed_at = event.end_time;
        match event.kind {
            EventKind::Mine => self.travel_to_station(truck_id, completed_at, log),
            EventKind::TravelToStation => {
                if self.num_stations == 0 {
                    log::warn!(
                        "truck {} arrived at the unload area but no stations exist",
                        truck_id
                    );
                    return self.park_truck(truck_id, completed_at);
                }
                self.unload(truck_id, completed_at, log)
            }
            EventKind::Unload => self.travel_to_mine(truck_id, completed_at, log),
            EventKind::TravelToMine => self.mine(truck_id, completed_at, log),
            EventKind::Queue => {
                // Queue events are side records and are never scheduled.
                log::error!("queue event reached the dispatcher: {}", event);
                Ok(())
            }
        }
    }

    fn mine(
        &mut self,
        truck_id: TruckId,
        start: Duration,
        log: &mut EventLog,
    ) -> Result<(), ResourceError> {
        // Draw unconditionally so the stream stays aligned across runs
        // regardless of where trucks get truncated.
        let duration = self.sampler.next_duration();
        let end = start + duration;
        if self.exceeds_horizon(end) {
            return self.park_truck(truck_id, start);
        }
        self.schedule(
            Event {
                kind: EventKind::Mine,
                truck_id,
                station_id: None,
                start_time: start,
                end_time: end,
            },
            log,
        );
        Ok(())
    }

    fn travel_to_station(
        &mut self,
        truck_id: TruckId,
        start: Duration,
        log: &mut EventLog,
    ) -> Result<(), ResourceError> {
        let end = start + TRAVEL_TIME;
        if self.exceeds_horizon(end) {
            return self.park_truck(truck_id, start);
        }
        self.schedule(
            Event {
                kind: EventKind::TravelToStation,
                truck_id,
                station_id: None,
                start_time: start,
                end_time: end,
            },
            log,
        );
        Ok(())
    }

    fn unload(
        &mut self,
        truck_id: TruckId,
        arrival: Duration,
        log: &mut EventLog,
    ) -> Result<(), ResourceError> {
        let (free_at, station) = self.stations.pop_next()?;
        let station_id = StationId::from(station);
        let start = cmp::max(arrival, free_at);
        let end = start + UNLOAD_TIME;
        if self.exceeds_horizon(end) {
            // The station goes back unchanged; the truck is done.
            self.stations.release(free_at, station)?;
            return self.park_truck(truck_id, arrival);
        }
        if free_at > arrival {
            let queued = Event {
                kind: EventKind::Queue,
                truck_id,
                station_id: Some(station_id),
                start_time: arrival,
                end_time: free_at,
            };
            log::debug!("{}", queued);
            log.append(queued);
        }
        self.schedule(
            Event {
                kind: EventKind::Unload,
                truck_id,
                station_id: Some(station_id),
                start_time: start,
                end_time: end,
            },
            log,
        );
        self.stations.release(end, station)?;
        Ok(())
    }

    fn travel_to_mine(
        &mut self,
        truck_id: TruckId,
        start: Duration,
        log: &mut EventLog,
    ) -> Result<(), ResourceError> {
        let end = start + TRAVEL_TIME;
        if self.exceeds_horizon(end) {
            return self.park_truck(truck_id, start);
        }
        self.schedule(
            Event {
                kind: EventKind::TravelToMine,
                truck_id,
                station_id: None,
                start_time: start,
                end_time: end,
            },
            log,
        );
        Ok(())
    }

    /// Ends a truck's participation, returning it to the truck queue at its
    /// last completed time.
    fn park_truck(&mut self, truck_id: TruckId, time: Duration) -> Result<(), ResourceError> {
        log::trace!("truck {} parked at {}m", truck_id, whole_minutes(time));
        self.trucks.release(time, truck_id.into())
    }

    fn exceeds_horizon(&self, time: Duration) -> bool {
        if time <= self.horizon {
            return false;
        }
        log::trace!(
            "time limit exceeded: {}m > {}m",
            whole_minutes(time),
            whole_minutes(self.horizon)
        );
        true
    }

    fn schedule(&mut self, event: Event, log: &mut EventLog) {
        log::debug!("{}", event);
        log.append(event.clone());
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            end_time: Reverse(event.end_time),
            seq: Reverse(seq),
            event,
        });
    }
}
