//! The event store: the single owner of the event collection.
//!
//! Every mutation is applied in memory, flushed to the slot, and then
//! broadcast to subscribers. Readers get an immutable [`Snapshot`] and never
//! observe a half-applied mutation.

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{CalendarError, CalendarResult};
use crate::event::{Event, EventDraft};
use crate::storage::{SlotLock, Storage};

/// Read-only view of the collection at one point in time.
pub type Snapshot = Arc<Vec<Event>>;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// What changed in the store. Subscribers re-read the snapshot on any change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Added(String),
    Updated(String),
    Deleted(String),
    /// The collection was replaced from storage after an outside write.
    Reloaded,
}

struct State {
    events: Snapshot,
    /// Fingerprint of the slot contents last read or written by this store.
    fingerprint: Option<u64>,
}

pub struct EventStore {
    storage: Arc<dyn Storage>,
    state: RwLock<State>,
    changes: broadcast::Sender<StoreChange>,
}

impl EventStore {
    /// Load the collection from storage.
    ///
    /// A missing, unreadable or corrupt slot yields an empty collection; the
    /// problem is logged and never fails startup.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let (events, fingerprint) = match storage.read() {
            Ok(Some(content)) => {
                let events = parse_events(&content).unwrap_or_else(|e| {
                    warn!(error = %e, "Stored events are corrupt, starting empty");
                    Vec::new()
                });
                (events, Some(fingerprint(&content)))
            }
            Ok(None) => (Vec::new(), None),
            Err(e) => {
                warn!(error = %e, "Could not read stored events, starting empty");
                (Vec::new(), None)
            }
        };

        debug!(count = events.len(), "Loaded events");

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        EventStore {
            storage,
            state: RwLock::new(State {
                events: Arc::new(events),
                fingerprint,
            }),
            changes,
        }
    }

    /// Current collection.
    pub fn snapshot(&self) -> Snapshot {
        self.state.read().expect("event store lock poisoned").events.clone()
    }

    pub fn get(&self, id: &str) -> Option<Event> {
        self.snapshot().iter().find(|e| e.id == id).cloned()
    }

    /// Receive a [`StoreChange`] after every mutation or reload.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    /// Exclusive lock over the backing slot, for read-modify-write sequences
    /// that may race with another process.
    pub fn lock(&self) -> CalendarResult<SlotLock> {
        self.storage.lock()
    }

    /// Store a new event and return its id.
    ///
    /// On a failed flush the event stays in memory and `Persist` is returned,
    /// carrying the new id.
    pub fn add(&self, draft: EventDraft) -> CalendarResult<String> {
        let mut state = self.write_state();

        let id = fresh_id(&state.events);
        Arc::make_mut(&mut state.events).push(Event::from_draft(id.clone(), draft));
        debug!(id = %id, "Event added");

        let flushed = self.flush(&mut state, Some(&id));
        drop(state);

        self.emit(StoreChange::Added(id.clone()));
        flushed.map(|_| id)
    }

    /// Replace the event with the same id.
    ///
    /// Returns `Ok(false)` without touching storage when no event has that id.
    /// A stored `notified = true` is never cleared.
    pub fn update(&self, mut event: Event) -> CalendarResult<bool> {
        let mut state = self.write_state();

        let Some(index) = state.events.iter().position(|e| e.id == event.id) else {
            debug!(id = %event.id, "Update for unknown event ignored");
            return Ok(false);
        };

        let events = Arc::make_mut(&mut state.events);
        event.notified |= events[index].notified;
        let id = event.id.clone();
        events[index] = event;
        debug!(id = %id, "Event updated");

        let flushed = self.flush(&mut state, Some(&id));
        drop(state);

        self.emit(StoreChange::Updated(id));
        flushed.map(|_| true)
    }

    /// Remove the event with that id. Returns `Ok(false)` when none exists.
    pub fn delete(&self, id: &str) -> CalendarResult<bool> {
        let mut state = self.write_state();

        let Some(index) = state.events.iter().position(|e| e.id == id) else {
            debug!(id = %id, "Delete for unknown event ignored");
            return Ok(false);
        };

        Arc::make_mut(&mut state.events).remove(index);
        debug!(id = %id, "Event deleted");

        let flushed = self.flush(&mut state, Some(id));
        drop(state);

        self.emit(StoreChange::Deleted(id.to_string()));
        flushed.map(|_| true)
    }

    /// Pick up a slot written by someone else since this store last saw it.
    ///
    /// Returns whether the collection was replaced. Corrupt contents keep the
    /// current collection. A `notified` latch set here but never saved is
    /// carried into the reloaded events and written back.
    pub fn refresh(&self) -> CalendarResult<bool> {
        let mut state = self.write_state();

        let content = self.storage.read()?;
        let current = content.as_deref().map(fingerprint);
        if current == state.fingerprint {
            return Ok(false);
        }

        let mut events = match content.as_deref().map(parse_events) {
            None => Vec::new(),
            Some(Ok(events)) => events,
            Some(Err(e)) => {
                warn!(error = %e, "Stored events are corrupt, keeping current events");
                state.fingerprint = current;
                return Ok(false);
            }
        };

        let carried = carry_latches(&state.events, &mut events);
        debug!(count = events.len(), carried, "Reloaded events from storage");
        state.events = Arc::new(events);
        state.fingerprint = current;

        if carried > 0 {
            // A failure is logged by flush; the latches stay in memory.
            let _ = self.flush(&mut state, None);
        }
        drop(state);

        self.emit(StoreChange::Reloaded);
        Ok(true)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().expect("event store lock poisoned")
    }

    /// Write the whole collection. `id` names the event whose change is being
    /// saved, for the `Persist` error.
    fn flush(&self, state: &mut State, id: Option<&str>) -> CalendarResult<()> {
        let content = serde_json::to_string_pretty(state.events.as_slice())
            .map_err(|e| CalendarError::Serialization(e.to_string()))?;

        self.storage.write(&content).map_err(|e| {
            warn!(error = %e, "Could not save events, keeping them in memory");
            CalendarError::Persist {
                id: id.map(str::to_string),
                message: e.to_string(),
            }
        })?;

        state.fingerprint = Some(fingerprint(&content));
        Ok(())
    }

    fn emit(&self, change: StoreChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}

/// Set `notified` on reloaded events that are already notified in `current`.
/// Returns how many were changed.
fn carry_latches(current: &[Event], reloaded: &mut [Event]) -> usize {
    let fired: HashSet<&str> = current
        .iter()
        .filter(|e| e.notified)
        .map(|e| e.id.as_str())
        .collect();

    let mut carried = 0;
    for event in reloaded
        .iter_mut()
        .filter(|e| !e.notified && fired.contains(e.id.as_str()))
    {
        event.notified = true;
        carried += 1;
    }
    carried
}

fn parse_events(content: &str) -> Result<Vec<Event>, serde_json::Error> {
    serde_json::from_str(content)
}

fn fingerprint(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

fn fresh_id(events: &[Event]) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !events.iter().any(|e| e.id == id) {
            return id;
        }
    }
}
