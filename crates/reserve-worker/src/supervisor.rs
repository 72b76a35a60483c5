//! Task supervisor: spawns and tracks per-user background tasks.
//!
//! Each task is registered under a [`TaskKey`]; a second spawn for a key that
//! is still registered is skipped. A task leaves the registry either by
//! calling [`TaskContext::release`] (done under the user's lock when its
//! target state empties, so a concurrent restart is never lost) or when it
//! finishes, fails or panics.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{Notify, watch};

use reserve_core::result::AppResult;
use reserve_core::types::UserId;

/// The kinds of per-user background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Cools the heat counter down.
    HeatDecay,
    /// Evicts stale pooled reserves.
    PoolExpiration,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeatDecay => write!(f, "heat_decay"),
            Self::PoolExpiration => write!(f, "pool_expiration"),
        }
    }
}

/// Identity of a supervised task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskKey {
    /// What the task does.
    pub kind: TaskKind,
    /// Whose state it works on.
    pub user_id: UserId,
}

impl TaskKey {
    /// Key of the user's heat decay task.
    pub fn heat_decay(user_id: UserId) -> Self {
        Self {
            kind: TaskKind::HeatDecay,
            user_id,
        }
    }

    /// Key of the user's pool expiration task.
    pub fn pool_expiration(user_id: UserId) -> Self {
        Self {
            kind: TaskKind::PoolExpiration,
            user_id,
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.user_id)
    }
}

/// One registered task. Releasing only removes the registry entry if it
/// still belongs to this task, so a stale release never evicts a successor.
#[derive(Debug)]
struct Registration {
    key: TaskKey,
    id: u64,
    registered: Arc<DashMap<TaskKey, u64>>,
    idle: Arc<Notify>,
}

impl Registration {
    fn release(&self) {
        let removed = self
            .registered
            .remove_if(&self.key, |_, owner| *owner == self.id)
            .is_some();

        if removed {
            tracing::trace!(task = %self.key, "Task deregistered");
            if self.registered.is_empty() {
                self.idle.notify_waiters();
            }
        }
    }
}

/// Deregisters the task when its future completes or unwinds.
#[derive(Debug)]
struct RegistrationGuard(Arc<Registration>);

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// Handle given to a running task.
#[derive(Debug)]
pub struct TaskContext {
    registration: Arc<Registration>,
    shutdown: watch::Receiver<bool>,
}

impl TaskContext {
    /// Sleep for `duration`. Returns `false` when shutdown is requested
    /// before or during the sleep.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);

        loop {
            if *self.shutdown.borrow() {
                return false;
            }

            tokio::select! {
                _ = &mut deadline => return !*self.shutdown.borrow(),
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        // Sender gone: nobody can request shutdown anymore.
                        deadline.as_mut().await;
                        return true;
                    }
                }
            }
        }
    }

    /// Deregister this task so the next spawn for its key starts a new one.
    pub fn release(&self) {
        self.registration.release();
    }
}

/// Supervisor of all per-user background tasks.
#[derive(Debug)]
pub struct TaskSupervisor {
    /// Key → id of the task currently owning it.
    registered: Arc<DashMap<TaskKey, u64>>,
    /// Source of task ids.
    next_id: AtomicU64,
    /// Signalled whenever the registry becomes empty.
    idle: Arc<Notify>,
    /// Shared shutdown signal.
    shutdown: watch::Receiver<bool>,
}

impl TaskSupervisor {
    /// Create a supervisor observing `shutdown`.
    pub fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self {
            registered: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(1),
            idle: Arc::new(Notify::new()),
            shutdown,
        }
    }

    /// Spawn `job` under `key` unless a task already owns that key or
    /// shutdown was requested. Returns whether a task was started.
    ///
    /// The job's error is logged; it never reaches other tasks or callers.
    pub fn spawn<F, Fut>(&self, key: TaskKey, job: F) -> bool
    where
        F: FnOnce(TaskContext) -> Fut,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        if *self.shutdown.borrow() {
            tracing::debug!(task = %key, "Shutdown in progress, task not started");
            return false;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        match self.registered.entry(key) {
            Entry::Occupied(_) => {
                tracing::trace!(task = %key, "Task already running");
                return false;
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let registration = Arc::new(Registration {
            key,
            id,
            registered: Arc::clone(&self.registered),
            idle: Arc::clone(&self.idle),
        });
        let guard = RegistrationGuard(Arc::clone(&registration));
        let context = TaskContext {
            registration,
            shutdown: self.shutdown.clone(),
        };
        let task = job(context);

        tokio::spawn(async move {
            let _guard = guard;
            tracing::debug!(task = %key, "Background task started");

            match task.await {
                Ok(()) => tracing::debug!(task = %key, "Background task finished"),
                Err(e) => tracing::error!(task = %key, error = %e, "Background task failed"),
            }
        });

        true
    }

    /// Whether a task currently owns `key`.
    pub fn is_running(&self, key: TaskKey) -> bool {
        self.registered.contains_key(&key)
    }

    /// Number of registered tasks.
    pub fn active_tasks(&self) -> usize {
        self.registered.len()
    }

    /// Wait until every task has deregistered or `grace` elapses.
    /// Returns whether the registry drained in time.
    pub async fn drain(&self, grace: Duration) -> bool {
        let wait_idle = async {
            loop {
                let notified = self.idle.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();

                if self.registered.is_empty() {
                    return;
                }
                notified.await;
            }
        };

        let drained = tokio::time::timeout(grace, wait_idle).await.is_ok();
        if !drained {
            tracing::warn!(
                remaining = self.registered.len(),
                "Background tasks still running after grace period"
            );
        }
        drained
    }
}
