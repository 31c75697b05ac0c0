use std::future::Future;
use std::sync::Arc;

use medagent_core::advisory::{AdvisoryResult, AdvisoryState};
use medagent_core::intake::PatientRecord;
use medagent_core::risk::RiskCategory;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Source of advisory text for a classified record. Implementations resolve
/// to a fallback instead of failing.
pub trait Advisor: Send + Sync + 'static {
    fn advise(
        &self,
        record: &PatientRecord,
        risk: RiskCategory,
    ) -> impl Future<Output = AdvisoryResult> + Send;
}

/// Advisory state for one interactive session.
///
/// Each `request` bumps a generation counter and aborts the call it
/// supersedes. Results carry the generation they were issued under and are
/// dropped unless it is still current, so a late answer never overwrites a
/// newer one.
pub struct AdvisorySession<A> {
    advisor: Arc<A>,
    generation: u64,
    state: AdvisoryState,
    in_flight: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<(u64, AdvisoryResult)>,
    rx: mpsc::UnboundedReceiver<(u64, AdvisoryResult)>,
}

impl<A: Advisor> AdvisorySession<A> {
    pub fn new(advisor: Arc<A>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            advisor,
            generation: 0,
            state: AdvisoryState::Idle,
            in_flight: None,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &AdvisoryState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a fresh advisory call, superseding any call still running.
    /// Returns the generation the result will be tagged with.
    pub fn request(&mut self, record: PatientRecord, risk: RiskCategory) -> u64 {
        self.abort_in_flight();
        self.generation += 1;
        self.state = AdvisoryState::Pending;

        let generation = self.generation;
        let advisor = Arc::clone(&self.advisor);
        let tx = self.tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = advisor.advise(&record, risk).await;
            let _ = tx.send((generation, result));
        }));

        generation
    }

    /// Abandon whatever is pending and go back to `Idle`.
    pub fn restart(&mut self) {
        self.abort_in_flight();
        self.generation += 1;
        self.state = AdvisoryState::Idle;
    }

    /// Apply a result tagged with `generation`. Returns false when the result
    /// is stale and was discarded.
    pub fn accept(&mut self, generation: u64, result: AdvisoryResult) -> bool {
        if generation != self.generation || self.state != AdvisoryState::Pending {
            tracing::debug!(
                stale = generation,
                current = self.generation,
                "Discarding superseded advisory result"
            );
            return false;
        }
        self.in_flight = None;
        self.state = AdvisoryState::Resolved(result);
        true
    }

    /// Wait for the current request to resolve.
    ///
    /// Returns the resolved result, or `None` if nothing is pending or
    /// resolved. Cancel-safe: dropping the future leaves the request running.
    pub async fn next_resolved(&mut self) -> Option<AdvisoryResult> {
        while self.state == AdvisoryState::Pending {
            let (generation, result) = self.rx.recv().await?;
            self.accept(generation, result);
        }
        match &self.state {
            AdvisoryState::Resolved(result) => Some(result.clone()),
            _ => None,
        }
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl<A> Drop for AdvisorySession<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
