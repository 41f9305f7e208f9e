use std::sync::Arc;
use std::time::Duration;
use futures::future::join_all;
use shared::{Nominees, NotificationPayload, RaceEvent, Subscription};
use tokio::time::timeout;
use tracing::{error, info, warn};
use crate::push::{DeliveryOutcome, PushDelivery};
use crate::subscribers::SubscriberStore;
use crate::utils::{group_thousands, short_endpoint};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub invalidated: usize,
    pub failed: usize,
}

/// Turns race events into push notifications for every subscriber.
pub struct Dispatcher {
    subscribers: Arc<dyn SubscriberStore>,
    push: Arc<dyn PushDelivery>,
    nominees: Nominees,
    contest_name: String,
    click_url: Option<String>,
    delivery_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        subscribers: Arc<dyn SubscriberStore>,
        push: Arc<dyn PushDelivery>,
        nominees: Nominees,
        contest_name: impl Into<String>,
        delivery_timeout: Duration,
    ) -> Self {
        Self {
            subscribers,
            push,
            nominees,
            contest_name: contest_name.into(),
            click_url: None,
            delivery_timeout,
        }
    }

    pub fn with_click_url(mut self, url: Option<String>) -> Self {
        self.click_url = url;
        self
    }

    pub fn render(&self, event: &RaceEvent) -> NotificationPayload {
        let contest = &self.contest_name;
        let nominee = event.nominee();
        let name = self.nominees.display_name(nominee);

        let (title, body) = match event {
            RaceEvent::Summary { votes, gap, .. } => (
                format!("{} race update", contest),
                format!(
                    "🏆 Leading: {}\n📈 Total votes: {}\n⚡ Lead: {} votes",
                    name,
                    group_thousands(*votes),
                    group_thousands(*gap)
                ),
            ),
            RaceEvent::RankChange { leadership: true, .. } => (
                format!("👑 {} has a new leader", contest),
                format!("🏆 {} has climbed to #1. The race is heating up!", name),
            ),
            RaceEvent::RankChange { rank, .. } => (
                format!("{} leaderboard shake-up", contest),
                format!("🔥 {} just climbed to #{}. Vote now!", name, rank + 1),
            ),
            RaceEvent::Milestone { thousands, .. } => (
                format!("🎉 Congratulations {} at {}", name, contest),
                format!("🌟 Passed {}K votes. Keep the support coming!", thousands),
            ),
        };

        NotificationPayload {
            title,
            body,
            icon: self.nominees.icon(nominee).to_owned(),
            url: self.click_url.clone(),
        }
    }

    async fn deliver_one(&self, target: &Subscription, payload: &NotificationPayload) -> DeliveryOutcome {
        match timeout(self.delivery_timeout, self.push.deliver(target, payload)).await {
            Ok(outcome) => outcome,
            Err(_) => DeliveryOutcome::TransientFailure(format!(
                "timed out after {}s",
                self.delivery_timeout.as_secs()
            )),
        }
    }

    pub async fn send(&self, payload: &NotificationPayload) -> DispatchReport {
        let mut report = DispatchReport::default();
        let targets = match self.subscribers.list().await {
            Ok(targets) => targets,
            Err(e) => {
                error!("Failed to list subscribers: {}", e);
                return report;
            }
        };
        if targets.is_empty() {
            return report;
        }

        info!("Sending push to {} subscribers...", targets.len());
        let outcomes = join_all(targets.iter().map(|t| self.deliver_one(t, payload))).await;

        for (target, outcome) in targets.iter().zip(outcomes) {
            match outcome {
                DeliveryOutcome::Delivered => report.delivered += 1,
                DeliveryOutcome::PermanentlyInvalid => {
                    info!("Removing invalid subscription: {}", short_endpoint(&target.endpoint));
                    if let Err(e) = self.subscribers.remove(&target.endpoint).await {
                        error!("Failed to remove subscription {}: {}", short_endpoint(&target.endpoint), e);
                    }
                    report.invalidated += 1;
                }
                DeliveryOutcome::TransientFailure(reason) => {
                    warn!("Push to {} failed: {}", short_endpoint(&target.endpoint), reason);
                    report.failed += 1;
                }
            }
        }
        report
    }

    pub async fn dispatch(&self, event: &RaceEvent) -> DispatchReport {
        let payload = self.render(event);
        let report = self.send(&payload).await;
        info!(
            "Push sent: {} ({} delivered, {} removed, {} failed)",
            payload.title, report.delivered, report.invalidated, report.failed
        );
        report
    }
}
