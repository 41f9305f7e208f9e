use std::sync::Arc;
use std::time::{Duration, Instant};
use shared::RankingEngine;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};
use crate::dispatcher::Dispatcher;
use crate::store::{StoreError, VoteHistoryStore};

/// The notification loop: snapshot, classify, dispatch.
pub struct Notifier {
    store: Arc<VoteHistoryStore>,
    engine: RankingEngine,
    dispatcher: Dispatcher,
}

impl Notifier {
    pub fn new(store: Arc<VoteHistoryStore>, engine: RankingEngine, dispatcher: Dispatcher) -> Self {
        Self { store, engine, dispatcher }
    }

    /// Runs one cycle and returns how many events were dispatched. A failed
    /// read resets the engine so the next good snapshot only reseeds.
    pub async fn check_once(&mut self, now: Instant) -> Result<usize, StoreError> {
        let current = match self.store.latest_snapshot() {
            Ok(Some(current)) => current,
            Ok(None) => return Ok(0),
            Err(e) => {
                self.engine.reset();
                return Err(e);
            }
        };

        let events = self.engine.evaluate(current, now);
        for event in &events {
            self.dispatcher.dispatch(event).await;
        }
        Ok(events.len())
    }

    pub async fn run(mut self, period: Duration) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("🔔 Notification service started ({}s interval)", period.as_secs());

        loop {
            ticker.tick().await;
            if let Err(e) = self.check_once(Instant::now()).await {
                error!("Notification service error: {}", e);
            }
        }
    }
}
