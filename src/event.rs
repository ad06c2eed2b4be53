use std::{
    fmt,
    sync::{Arc, Mutex},
    time::SystemTime,
};

/// Something that happened to a network, e.g. a layer being added.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    description: String,
    date: SystemTime,
}

impl Event {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            date: SystemTime::now(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> SystemTime {
        self.date
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self
            .date
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        write!(f, "[{}] {}", secs, self.description)
    }
}

/// Receiver of network events.
pub trait EventSink: Send {
    fn log_event(&mut self, event: Event);
}

impl<F> EventSink for F
where
    F: FnMut(Event) + Send,
{
    fn log_event(&mut self, event: Event) {
        self(event)
    }
}

/// In-memory event sink. Clones share the same storage, so one handle can be
/// given to a network while another is kept to read the events back.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events logged so far, oldest first.
    pub fn events(&self) -> Vec<Event> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        match self.events.lock() {
            Ok(mut events) => events.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl EventSink for EventLog {
    fn log_event(&mut self, event: Event) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
