use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use thiserror::Error;

/// Violations of the resource queue's checkout discipline.
///
/// Both variants indicate a scheduling bug rather than a recoverable
/// simulation condition; callers are expected to propagate them and abort
/// the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceError {
    /// Popped from a queue with no remaining entries.
    #[error("no entities remain in the resource queue")]
    Empty,
    /// Returned an id that is still sitting idle in the queue.
    #[error("entity {id} returned to the resource queue while already idle")]
    DoubleReturn {
        /// The offending entity id.
        id: usize,
    },
    /// Returned an id the queue was never initialized with.
    #[error("entity {id} does not belong to this resource queue")]
    UnknownId {
        /// The offending entity id.
        id: usize,
    },
}

/// Availability schedule for a set of interchangeable entities (trucks or
/// stations), keyed by the time each one becomes free for its next
/// assignment.
///
/// Entries pop in ascending `(available_at, id)` order, so ties always
/// resolve by the lower id and repeated runs stay deterministic. Every id is
/// either idle (in the queue) or checked out (popped), never both;
/// [`release`](Self::release) rejects a second return of the same id loudly
/// instead of corrupting the schedule.
pub struct ResourceQueue {
    heap: BinaryHeap<Reverse<(Duration, usize)>>,
    idle: Vec<bool>,
}

impl ResourceQueue {
    /// Creates a queue of `count` entities, all idle at time zero.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            heap: (0..count)
                .map(|id| Reverse((Duration::default(), id)))
                .collect(),
            idle: vec![true; count],
        }
    }

    /// Number of currently idle entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if no entity is currently idle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Checks out the entity that becomes free the earliest.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Empty`] if all entities are checked out (or
    /// the queue was created empty).
    pub fn pop_next(&mut self) -> Result<(Duration, usize), ResourceError> {
        let Reverse((time, id)) = self.heap.pop().ok_or(ResourceError::Empty)?;
        self.idle[id] = false;
        Ok((time, id))
    }

    /// Returns a checked-out entity with a new availability time.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::DoubleReturn`] if the id is already idle,
    /// and [`ResourceError::UnknownId`] if it was never part of this queue.
    pub fn release(&mut self, time: Duration, id: usize) -> Result<(), ResourceError> {
        match self.idle.get(id) {
            None => Err(ResourceError::UnknownId { id }),
            Some(true) => Err(ResourceError::DoubleReturn { id }),
            Some(false) => {
                self.idle[id] = true;
                self.heap.push(Reverse((time, id)));
                Ok(())
            }
        }
    }
}
