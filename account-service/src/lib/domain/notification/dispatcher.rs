//! Fire-and-forget execution of side effects outside the request path.
//!
//! Every task runs on its own Tokio task behind a fault boundary: returned
//! errors and panics are logged and never reach the code that dispatched them.

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;

use crate::domain::notification::models::Notification;
use crate::domain::notification::ports::Mailer;

/// Default cap on accepted tasks, running or waiting.
pub const DEFAULT_MAX_QUEUED: usize = 1024;

/// Schedules background tasks with a cap on how many run at once and on how
/// many may be outstanding in total.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    permits: Arc<Semaphore>,
    slots: Arc<Semaphore>,
}

impl NotificationDispatcher {
    /// Create a dispatcher allowing `max_in_flight` concurrent tasks (at least one).
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            slots: Arc::new(Semaphore::new(DEFAULT_MAX_QUEUED)),
        }
    }

    /// Cap the number of accepted tasks, running or waiting (at least one).
    pub fn with_max_queued(mut self, max_queued: usize) -> Self {
        self.slots = Arc::new(Semaphore::new(max_queued.max(1)));
        self
    }

    /// Run `task` in the background and return immediately.
    ///
    /// Tasks wait for a permit once `max_in_flight` are running. When
    /// `max_queued` tasks are already outstanding the new task is dropped and
    /// logged. Nothing is awaited on shutdown, so queued or running tasks may
    /// be lost.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch<F, Fut, E>(&self, task_name: &'static str, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let slot = match Arc::clone(&self.slots).try_acquire_owned() {
            Ok(slot) => slot,
            Err(_) => {
                tracing::warn!(task = task_name, "Background queue full, task dropped");
                return;
            }
        };
        let permits = Arc::clone(&self.permits);

        tokio::spawn(async move {
            let _slot = slot;
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(task = task_name, error = %e, "Background task dropped");
                    return;
                }
            };

            match AssertUnwindSafe(async move { task().await })
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {
                    tracing::debug!(task = task_name, "Background task completed");
                }
                Ok(Err(e)) => {
                    tracing::error!(task = task_name, error = %e, "Background task failed");
                }
                Err(panic) => {
                    tracing::error!(
                        task = task_name,
                        panic = %panic_message(panic.as_ref()),
                        "Background task panicked"
                    );
                }
            }
        });
    }

    /// Send `notification` through `mailer` in the background.
    pub fn notify<M>(&self, mailer: Arc<M>, notification: Notification)
    where
        M: Mailer + ?Sized,
    {
        tracing::debug!(
            recipient = %notification.recipient,
            template = %notification.template,
            "Dispatching notification"
        );

        self.dispatch("send_email", move || async move {
            mailer
                .send(
                    &notification.recipient,
                    notification.template.id(),
                    &notification.data,
                )
                .await
        });
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
