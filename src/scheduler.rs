//! Delayed task scheduling
//!
//! Scheduled tasks never run a callback directly. When a task comes due it is
//! posted back onto the serialized event queue as a `ScheduledTask`, so a
//! repeat tick is ordered with button events like any other event.
//!
//! ## Implementations:
//! - **TokioScheduler**: sleeps on the runtime, then sends into a channel
//! - **ManualScheduler**: virtual clock driven explicitly (tests, replays)

use crate::view::ViewId;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::trace;

/// What a scheduled task does when it comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Next step of a held tempo button
    TempoRepeat,
    /// Next step of a held rewind/forward button
    WindRepeat,
}

/// A task delivered back to its owning view when due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub owner: ViewId,
    pub kind: TaskKind,
    /// Arming generation; ticks from an older generation are stale
    pub generation: u64,
}

/// Fire-once delayed task scheduler
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> TaskHandle;
}

enum HandleInner {
    Tokio(AbortHandle),
    Manual {
        id: u64,
        queue: Arc<Mutex<ManualQueue>>,
    },
}

/// Handle to a pending task; cancelling after it fired is a no-op
pub struct TaskHandle {
    inner: HandleInner,
}

impl TaskHandle {
    /// Cancel the task if it has not fired yet
    pub fn cancel(self) {
        match self.inner {
            HandleInner::Tokio(handle) => handle.abort(),
            HandleInner::Manual { id, queue } => {
                queue.lock().pending.retain(|p| p.id != id);
            },
        }
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            HandleInner::Tokio(_) => f.write_str("TaskHandle(tokio)"),
            HandleInner::Manual { id, .. } => write!(f, "TaskHandle(manual #{})", id),
        }
    }
}

/// Scheduler backed by the tokio timer
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<ScheduledTask>,
    runtime: tokio::runtime::Handle,
}

impl TokioScheduler {
    /// Create a scheduler and the receiver its due tasks arrive on
    pub fn new(runtime: tokio::runtime::Handle) -> (Self, mpsc::UnboundedReceiver<ScheduledTask>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, runtime }, rx)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> TaskHandle {
        let tx = self.tx.clone();
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the event loop is shutting down
            let _ = tx.send(task);
        });
        TaskHandle {
            inner: HandleInner::Tokio(join.abort_handle()),
        }
    }
}

struct PendingTask {
    id: u64,
    due: Duration,
    task: ScheduledTask,
}

#[derive(Default)]
struct ManualQueue {
    now: Duration,
    next_id: u64,
    pending: Vec<PendingTask>,
}

/// Scheduler with a virtual clock
///
/// Time only moves through `pop_due` and `advance_to`.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Arc<Mutex<ManualQueue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.queue.lock().now
    }

    /// Number of tasks not yet fired
    pub fn pending(&self) -> usize {
        self.queue.lock().pending.len()
    }

    /// Due time of the earliest pending task
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.lock().pending.iter().map(|p| p.due).min()
    }

    /// Remove the earliest task due at or before `deadline`
    ///
    /// The clock moves to the task's due time so tasks it schedules are
    /// measured from the moment it fired.
    pub fn pop_due(&self, deadline: Duration) -> Option<ScheduledTask> {
        let mut queue = self.queue.lock();
        let position = queue
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= deadline)
            .min_by_key(|(_, p)| (p.due, p.id))
            .map(|(i, _)| i)?;
        let pending = queue.pending.remove(position);
        queue.now = queue.now.max(pending.due);
        Some(pending.task)
    }

    /// Move the clock forward without firing anything
    pub fn advance_to(&self, time: Duration) {
        let mut queue = self.queue.lock();
        queue.now = queue.now.max(time);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> TaskHandle {
        let mut queue = self.queue.lock();
        let id = queue.next_id;
        queue.next_id += 1;
        let due = queue.now + delay;
        trace!("Scheduled {:?} #{} at {:?}", task.kind, id, due);
        queue.pending.push(PendingTask { id, due, task });
        TaskHandle {
            inner: HandleInner::Manual {
                id,
                queue: self.queue.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(generation: u64) -> ScheduledTask {
        ScheduledTask {
            owner: ViewId::Control,
            kind: TaskKind::TempoRepeat,
            generation,
        }
    }

    #[test]
    fn test_manual_fires_in_due_order() {
        let scheduler = ManualScheduler::new();
        scheduler.schedule(Duration::from_millis(300), task(1));
        scheduler.schedule(Duration::from_millis(100), task(2));

        assert_eq!(scheduler.pop_due(Duration::from_millis(50)), None);
        assert_eq!(scheduler.pop_due(Duration::from_millis(500)), Some(task(2)));
        assert_eq!(scheduler.now(), Duration::from_millis(100));
        assert_eq!(scheduler.pop_due(Duration::from_millis(500)), Some(task(1)));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_manual_cancel() {
        let scheduler = ManualScheduler::new();
        let handle = scheduler.schedule(Duration::from_millis(200), task(1));

        handle.cancel();

        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.pop_due(Duration::from_secs(1)), None);
    }

    #[test]
    fn test_manual_delay_measured_from_now() {
        let scheduler = ManualScheduler::new();
        scheduler.advance_to(Duration::from_millis(400));
        scheduler.schedule(Duration::from_millis(200), task(1));

        assert_eq!(scheduler.next_due(), Some(Duration::from_millis(600)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_delivers_after_delay() {
        let (scheduler, mut rx) = TokioScheduler::new(tokio::runtime::Handle::current());
        let start = tokio::time::Instant::now();

        scheduler.schedule(Duration::from_millis(200), task(7));

        let delivered = rx.recv().await.unwrap();
        assert_eq!(delivered, task(7));
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_cancel() {
        let (scheduler, mut rx) = TokioScheduler::new(tokio::runtime::Handle::current());

        let handle = scheduler.schedule(Duration::from_millis(200), task(1));
        handle.cancel();
        scheduler.schedule(Duration::from_millis(400), task(2));

        assert_eq!(rx.recv().await.unwrap(), task(2));
    }
}
