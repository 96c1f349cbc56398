//! Notification scheduler.
//!
//! Periodically scans the store for events whose start time has passed and
//! which have not been notified yet, shows one notification for each, and
//! flips their `notified` latch through the store.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, HostClock};
use crate::error::CalendarResult;
use crate::event::Event;
use crate::notify::{Notification, Notifier, Permission};
use crate::store::EventStore;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// When a due event gets its `notified` latch set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkPolicy {
    /// As soon as it is due, whether or not a notification could be shown.
    #[default]
    Always,
    /// Only after a notification was actually shown. Due events are retried
    /// on later ticks while permission is missing or delivery fails.
    OnDelivery,
}

/// Outcome of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Unnotified events whose start time had passed.
    pub due: usize,
    /// Ids of events a notification was shown for.
    pub delivered: Vec<String>,
    /// Due events left unnotified for a later tick.
    pub unmarked: usize,
}

pub struct Scheduler {
    store: Arc<EventStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    policy: MarkPolicy,
    icon: Option<String>,
}

impl Scheduler {
    pub fn new(store: Arc<EventStore>, notifier: Arc<dyn Notifier>) -> Self {
        Scheduler {
            store,
            notifier,
            clock: Arc::new(HostClock),
            policy: MarkPolicy::default(),
            icon: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: MarkPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = icon;
        self
    }

    /// Ask for notification permission if it has never been asked for.
    pub fn ensure_permission(&self) -> Permission {
        match self.notifier.permission() {
            Permission::Default => {
                let permission = self.notifier.request_permission();
                info!(?permission, "Requested notification permission");
                permission
            }
            permission => permission,
        }
    }

    /// Run one scan.
    pub fn tick(&self) -> CalendarResult<TickReport> {
        let _lock = self.store.lock()?;

        if let Err(e) = self.store.refresh() {
            warn!(error = %e, "Could not refresh events before scanning");
        }

        let now = self.clock.now();
        let allowed = self.notifier.permission() == Permission::Granted;
        let mut report = TickReport::default();

        for event in self.store.snapshot().iter().filter(|e| !e.notified) {
            let Some(starts_at) = self.clock.resolve_local(event.local_start()) else {
                warn!(id = %event.id, "Event start does not exist in local time, skipping");
                continue;
            };

            if now < starts_at {
                continue;
            }

            report.due += 1;

            let shown = allowed && self.deliver(event);
            if shown {
                report.delivered.push(event.id.clone());
            }

            if shown || self.policy == MarkPolicy::Always {
                self.mark_notified(event);
            } else {
                report.unmarked += 1;
            }
        }

        debug!(
            due = report.due,
            delivered = report.delivered.len(),
            unmarked = report.unmarked,
            "Scheduler tick"
        );

        Ok(report)
    }

    /// Run [`tick`](Self::tick) every `period` on the tokio runtime, starting
    /// immediately. The returned handle stops the task.
    pub fn spawn(self, period: Duration) -> SchedulerHandle {
        let period = period.max(MIN_PERIOD);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let scheduler = Arc::new(self);

        let task = tokio::spawn(async move {
            let permission = scheduler.ensure_permission();
            info!(?period, ?permission, "Scheduler started");

            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let scheduler = scheduler.clone();
                        match tokio::task::spawn_blocking(move || scheduler.tick()).await {
                            Ok(Ok(_)) => {}
                            Ok(Err(e)) => warn!(error = %e, "Scheduler tick failed"),
                            Err(e) => error!(error = %e, "Scheduler tick panicked"),
                        }
                    }
                }
            }

            info!("Scheduler stopped");
        });

        SchedulerHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    fn deliver(&self, event: &Event) -> bool {
        let notification = Notification::for_event(event, self.icon.as_deref());

        match self.notifier.notify(&notification) {
            Ok(()) => {
                info!(id = %event.id, title = %event.title, "Notification shown");
                true
            }
            Err(e) => {
                warn!(id = %event.id, error = %e, "Could not show notification");
                false
            }
        }
    }

    fn mark_notified(&self, event: &Event) {
        let mut fired = event.clone();
        fired.notified = true;

        // A failed flush still flips the in-memory latch, so nothing fires twice.
        if let Err(e) = self.store.update(fired) {
            warn!(id = %event.id, error = %e, "Could not save notified flag");
        }
    }
}

/// Handle to a spawned scheduler. Dropping it also stops the task.
pub struct SchedulerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the scheduler and wait for an in-flight tick to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            warn!(error = %e, "Scheduler task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
