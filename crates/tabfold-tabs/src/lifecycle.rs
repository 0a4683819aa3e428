//! Lifecycle polling
//!
//! The activation predicate has no change notification, so the controller
//! rechecks it on a timer: once after a short settle delay, then at a fixed
//! period. The loop only holds a weak reference and ends on its own once
//! the controller is gone.

use std::rc::Rc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::controller::TabController;

/// Running poll loop. Dropping the handle stops it.
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl TabController {
    /// Start rechecking the predicate on the schedule from the config.
    ///
    /// Must be called from within a `tokio::task::LocalSet`: the document
    /// is not `Send`, so the loop runs on the current thread.
    pub fn start_polling(&self) -> PollHandle {
        let weak = Rc::downgrade(&self.inner);
        let schedule = self.config().poll();

        let task = tokio::task::spawn_local(async move {
            time::sleep(schedule.initial_delay()).await;

            let period = schedule.interval();
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let Some(inner) = weak.upgrade() else {
                    tracing::debug!("Tab controller dropped, polling stopped");
                    return;
                };

                let transition = TabController { inner }.refresh();
                tracing::trace!(?transition, "Tab recheck");

                ticker.tick().await;
            }
        });

        tracing::debug!(
            initial_delay_ms = schedule.initial_delay_ms,
            interval_ms = schedule.interval_ms,
            "Tab polling started"
        );

        PollHandle { task }
    }
}
