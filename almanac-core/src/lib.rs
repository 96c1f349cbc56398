//! Core of the almanac calendar.
//!
//! - `store`: the event store, sole owner and writer of the event collection
//! - `scheduler`: turns "an event's start time has passed" into one notification
//! - `validate`: form-level rules applied before anything reaches the store
//! - `query` and `month`: read-side helpers for list and month views

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod month;
pub mod notify;
pub mod query;
pub mod scheduler;
pub mod storage;
pub mod store;
pub mod validate;

pub use error::{CalendarError, CalendarResult};
pub use event::{Event, EventDraft, EventKind};
pub use store::{EventStore, Snapshot, StoreChange};
