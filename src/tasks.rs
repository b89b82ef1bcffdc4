use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

/// One slot for a delayed task. Scheduling into an occupied slot aborts
/// the pending task before its timer can fire, so a superseded request
/// is never issued at all.
pub(crate) struct Debounce {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debounce {
    pub(crate) fn new() -> Self {
        Self {
            pending: Mutex::new(None),
        }
    }

    /// Run `task` after `delay`, cancelling whatever was pending here.
    /// Must be called from within a tokio runtime.
    pub(crate) fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        if let Some(prev) = self.pending.lock().unwrap().replace(handle) {
            prev.abort();
        }
    }

    pub(crate) fn cancel(&self) {
        if let Some(prev) = self.pending.lock().unwrap().take() {
            prev.abort();
        }
    }
}

impl Drop for Debounce {
    fn drop(&mut self) {
        self.cancel();
    }
}
