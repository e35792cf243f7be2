use crate::Event;

/// Append-only log of simulation events in emission order.
///
/// Emission order is scheduling order, not time order: the controller
/// appends an event the moment the transition is scheduled, which can
/// precede the completion of earlier-appended events. No event is ever
/// mutated or removed after append; [`clear`](Self::clear) resets the log
/// between independent runs.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event, preserving emission order.
    pub fn append(&mut self, event: Event) {
        self.events.push(event);
    }

    /// The ordered sequence of all appended events.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Iterates over the appended events in emission order.
    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Number of appended events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Removes all events, readying the log for another run.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
