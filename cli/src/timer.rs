use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// One-shot timer that moves the wizard from the risk screen to the advice
/// screen. Aborted on `cancel` and on drop, so it never outlives its screen.
pub struct AutoAdvance {
    handle: Option<JoinHandle<()>>,
    fired: oneshot::Receiver<()>,
    done: Option<bool>,
}

impl AutoAdvance {
    pub fn start(delay: Duration) -> Self {
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(());
        });
        Self {
            handle: Some(handle),
            fired: rx,
            done: None,
        }
    }

    /// Resolves once the timer finishes: true if the delay elapsed, false if
    /// it was cancelled first. Safe to call again after it resolved.
    pub async fn fired(&mut self) -> bool {
        if let Some(done) = self.done {
            return done;
        }
        let elapsed = (&mut self.fired).await.is_ok();
        self.done = Some(elapsed);
        self.handle = None;
        elapsed
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for AutoAdvance {
    fn drop(&mut self) {
        self.cancel();
    }
}
