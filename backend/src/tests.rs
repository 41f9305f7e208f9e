#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};
    use async_trait::async_trait;
    use rocket::figment::providers::{Format, Toml};
    use rocket::figment::Figment;
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use shared::*;
    use time::UtcOffset;
    use web_push::WebPushError;
    use crate::config::{ConfigError, TrackerConfig};
    use crate::dispatcher::{DispatchReport, Dispatcher};
    use crate::notifier::Notifier;
    use crate::poller::{PollError, Poller};
    use crate::push::{classify, DeliveryOutcome, PushDelivery, WebPushDelivery};
    use crate::routes::{build_rocket, AppState};
    use crate::source::{parse_payload, SnapshotSource, SourceError};
    use crate::storage::{HistoryStorage, JsonFileStorage, StorageError};
    use crate::store::VoteHistoryStore;
    use crate::subscribers::{SqliteSubscriberStore, SubscriberError, SubscriberStore};
    use crate::utils::{group_thousands, parse_since, short_endpoint};

    fn nominees(ids: &[&str]) -> Nominees {
        Nominees::new(
            ids.iter()
                .map(|id| Nominee {
                    id: NomineeId::from(*id),
                    name: format!("Nominee {}", id),
                    icon: format!("https://cdn.example.com/{}.png", id),
                })
                .collect(),
        )
    }

    fn at(time: &str) -> VoteTime {
        time.parse().unwrap()
    }

    fn store(ids: &[&str]) -> VoteHistoryStore {
        VoteHistoryStore::new(&nominees(ids), VoteHistory::empty(at("2025-11-30 00:00:00")))
    }

    fn batch(samples: &[(&str, u64)]) -> Vec<(NomineeId, u64)> {
        samples.iter().map(|(id, v)| (NomineeId::from(*id), *v)).collect()
    }

    fn subscription(endpoint: &str) -> Subscription {
        Subscription {
            endpoint: endpoint.into(),
            keys: SubscriptionKeys {
                p256dh: "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM".into(),
                auth: "tBHItJI5svbpez7KI4CCXg".into(),
            },
        }
    }

    #[derive(Default)]
    struct MemorySubscribers {
        subscriptions: Mutex<Vec<Subscription>>,
        removed: Mutex<Vec<String>>,
    }

    impl MemorySubscribers {
        fn with(endpoints: &[&str]) -> Self {
            let store = Self::default();
            *store.subscriptions.lock().unwrap() = endpoints.iter().map(|e| subscription(e)).collect();
            store
        }
    }

    #[async_trait]
    impl SubscriberStore for MemorySubscribers {
        async fn add(&self, subscription: &Subscription) -> Result<(), SubscriberError> {
            let mut subs = self.subscriptions.lock().unwrap();
            subs.retain(|s| s.endpoint != subscription.endpoint);
            subs.push(subscription.clone());
            Ok(())
        }

        async fn list(&self) -> Result<Vec<Subscription>, SubscriberError> {
            Ok(self.subscriptions.lock().unwrap().clone())
        }

        async fn remove(&self, endpoint: &str) -> Result<(), SubscriberError> {
            self.subscriptions.lock().unwrap().retain(|s| s.endpoint != endpoint);
            self.removed.lock().unwrap().push(endpoint.to_owned());
            Ok(())
        }
    }

    #[derive(Default)]
    struct ScriptedPush {
        outcomes: HashMap<String, DeliveryOutcome>,
        hang: Vec<String>,
        received: Mutex<Vec<(String, NotificationPayload)>>,
    }

    #[async_trait]
    impl PushDelivery for ScriptedPush {
        async fn deliver(&self, target: &Subscription, payload: &NotificationPayload) -> DeliveryOutcome {
            if self.hang.contains(&target.endpoint) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            let outcome = self
                .outcomes
                .get(&target.endpoint)
                .cloned()
                .unwrap_or(DeliveryOutcome::Delivered);
            if outcome == DeliveryOutcome::Delivered {
                self.received.lock().unwrap().push((target.endpoint.clone(), payload.clone()));
            }
            outcome
        }
    }

    #[derive(Default)]
    struct MemoryStorage {
        saved: Mutex<Option<VoteHistory>>,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl HistoryStorage for MemoryStorage {
        async fn load(&self) -> Option<VoteHistory> {
            self.saved.lock().unwrap().clone()
        }

        async fn save(&self, history: &VoteHistory) -> Result<(), StorageError> {
            *self.saved.lock().unwrap() = Some(history.clone());
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    enum FakeSource {
        Samples(Vec<(NomineeId, u64)>),
        Malformed,
        Hang,
    }

    #[async_trait]
    impl SnapshotSource for FakeSource {
        async fn fetch(&self) -> Result<Vec<(NomineeId, u64)>, SourceError> {
            match self {
                FakeSource::Samples(samples) => Ok(samples.clone()),
                FakeSource::Malformed => Err(SourceError::Malformed("bad".into())),
                FakeSource::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(Vec::new())
                }
            }
        }
    }

    fn dispatcher(subscribers: Arc<MemorySubscribers>, push: Arc<ScriptedPush>) -> Dispatcher {
        Dispatcher::new(subscribers, push, nominees(&["A", "B"]), "Test Awards", Duration::from_millis(200))
    }

    #[test]
    fn test_append_only_in_call_order() {
        let s = store(&["A", "B"]);
        s.record_batch(&batch(&[("A", 1), ("B", 5)]), at("2025-11-30 10:00:00")).unwrap();
        s.record_batch(&batch(&[("A", 3)]), at("2025-11-30 10:00:10")).unwrap();
        s.record_batch(&batch(&[("A", 2), ("B", 6)]), at("2025-11-30 10:00:20")).unwrap();

        let doc = s.query(None).unwrap();
        let a: Vec<u64> = doc.history["A"].iter().map(|v| v.vote_count).collect();
        assert_eq!(a, vec![1, 3, 2]);
        assert_eq!(doc.history["B"].len(), 2);
        assert_eq!(doc.last_update_time, at("2025-11-30 10:00:20"));
    }

    #[test]
    fn test_unknown_nominee_skipped() {
        let s = store(&["A"]);
        let accepted = s
            .record_batch(&batch(&[("Z", 9), ("A", 1)]), at("2025-11-30 10:00:00"))
            .unwrap();
        assert_eq!(accepted, 1);
        assert!(!s.query(None).unwrap().history.contains_key("Z"));

        assert!(!s.record("Z", 4, at("2025-11-30 11:00:00")).unwrap());
        assert_eq!(s.query(None).unwrap().last_update_time, at("2025-11-30 10:00:00"));
    }

    #[test]
    fn test_query_is_a_copy() {
        let s = store(&["A"]);
        s.record("A", 1, at("2025-11-30 10:00:00")).unwrap();
        let before = s.query(None).unwrap();
        s.record("A", 2, at("2025-11-30 10:00:10")).unwrap();

        assert_eq!(before.history["A"].len(), 1);
        assert_eq!(before.last_update_time, at("2025-11-30 10:00:00"));
        assert_eq!(s.query(None).unwrap().history["A"].len(), 2);
    }

    #[test]
    fn test_query_since() {
        let s = store(&["A", "B"]);
        s.record_batch(&batch(&[("A", 1), ("B", 1)]), at("2025-11-30 10:00:00")).unwrap();
        s.record_batch(&batch(&[("A", 2)]), at("2025-11-30 10:00:10")).unwrap();

        let filtered = s.query(Some(at("2025-11-30 10:00:00"))).unwrap();
        assert_eq!(filtered.history.len(), 1);
        assert_eq!(filtered.history["A"][0].vote_count, 2);
        assert_eq!(filtered.last_update_time, at("2025-11-30 10:00:10"));

        assert!(s.query(Some(at("2025-11-30 10:00:10"))).unwrap().history.is_empty());
    }

    #[test]
    fn test_clock_step_back_keeps_timestamps_ordered() {
        let s = store(&["A"]);
        s.record("A", 1, at("2025-11-30 10:00:10")).unwrap();
        s.record("A", 2, at("2025-11-30 10:00:00")).unwrap();

        let doc = s.query(None).unwrap();
        let stamps: Vec<VoteTime> = doc.history["A"].iter().map(|v| v.timestamp).collect();
        assert_eq!(stamps, vec![at("2025-11-30 10:00:10"), at("2025-11-30 10:00:10")]);
        assert_eq!(doc.last_update_time, at("2025-11-30 10:00:10"));
        assert_eq!(doc.history["A"][1].vote_count, 2);
    }

    #[test]
    fn test_readers_never_see_half_a_batch() {
        let s = store(&["A", "B", "C"]);
        let samples = batch(&[("A", 1), ("B", 2), ("C", 3)]);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..500 {
                    s.record_batch(&samples, at("2025-11-30 10:00:00")).unwrap();
                }
            });
            for _ in 0..3 {
                scope.spawn(|| {
                    for _ in 0..500 {
                        let doc = s.query(None).unwrap();
                        let counts: Vec<usize> = ["A", "B", "C"]
                            .iter()
                            .map(|id| doc.history.get(*id).map_or(0, Vec::len))
                            .collect();
                        assert!(counts.iter().all(|c| *c == counts[0]), "torn read: {:?}", counts);
                    }
                });
            }
        });

        assert_eq!(s.query(None).unwrap().sample_count(), 1500);
    }

    #[test]
    fn test_latest_snapshot() {
        let s = store(&["A", "B"]);
        assert!(s.latest_snapshot().unwrap().is_none());

        s.record("A", 10, at("2025-11-30 10:00:00")).unwrap();
        s.record("A", 12, at("2025-11-30 10:00:10")).unwrap();
        let snapshot = s.latest_snapshot().unwrap().unwrap();
        assert_eq!(snapshot.get("A"), 12);
        assert_eq!(snapshot.get("B"), 0);
        assert_eq!(snapshot.len(), 2);
    }

    #[tokio::test]
    async fn test_json_storage_round_trip_and_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("vote_history.json"));
        assert!(storage.load().await.is_none());

        let s = store(&["A"]);
        s.record("A", 42, at("2025-11-30 10:00:00")).unwrap();
        s.persist(&storage).await.unwrap();
        assert_eq!(storage.load().await, Some(s.query(None).unwrap()));

        tokio::fs::write(storage.path(), b"{ not json").await.unwrap();
        assert!(storage.load().await.is_none());

        let restored = VoteHistoryStore::load(&storage, &nominees(&["A"]), UtcOffset::UTC).await;
        assert!(restored.query(None).unwrap().history.is_empty());
    }

    #[tokio::test]
    async fn test_store_load_reads_existing_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vote_history.json");
        tokio::fs::write(
            &path,
            r#"{"vote_history": {"A": [{"vote_count": 7, "timestamp": "2025-11-30 10:00:00"}]},
                "last_update_time": "2025-11-30 10:00:00"}"#,
        )
        .await
        .unwrap();

        let restored = VoteHistoryStore::load(&JsonFileStorage::new(path), &nominees(&["A"]), UtcOffset::UTC).await;
        assert_eq!(restored.latest_snapshot().unwrap().unwrap().get("A"), 7);
    }

    #[test]
    fn test_parse_payload() {
        let known = nominees(&["w27-82", "w27-80"]);
        let body = r#"{"Success": true, "Data": [
            {"m": 82, "a": 27, "list": [{"v": 1200}]},
            {"m": 80, "a": 27, "list": [{"v": 900}]},
            {"m": 99, "a": 27, "list": [{"v": 5}]}
        ]}"#;
        let samples = parse_payload(body, &known).unwrap();
        assert_eq!(samples, batch(&[("w27-82", 1200), ("w27-80", 900)]));
    }

    #[test]
    fn test_parse_payload_rejects_bad_input() {
        let known = nominees(&["w27-82"]);
        assert!(matches!(
            parse_payload(r#"{"Success": false, "Data": null}"#, &known),
            Err(SourceError::Rejected)
        ));
        assert!(matches!(
            parse_payload(r#"{"Success": true, "Data": [{"m": 82, "a": 27, "list": [{"v": "many"}]}]}"#, &known),
            Err(SourceError::Malformed(_))
        ));
        assert!(matches!(
            parse_payload(r#"{"Success": true, "Data": [{"m": 82, "a": 27, "list": []}]}"#, &known),
            Err(SourceError::Malformed(_))
        ));
        assert!(matches!(parse_payload("<html>", &known), Err(SourceError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_poll_records_and_persists() {
        let s = Arc::new(store(&["A", "B"]));
        let storage = Arc::new(MemoryStorage::default());
        let poller = Poller::new(
            Arc::new(FakeSource::Samples(batch(&[("A", 5), ("B", 7), ("C", 1)]))),
            s.clone(),
            storage.clone(),
            UtcOffset::UTC,
            Duration::from_secs(1),
        );

        assert_eq!(poller.poll_once().await.unwrap(), 2);
        let doc = s.query(None).unwrap();
        assert_eq!(doc.history["A"][0].timestamp, doc.history["B"][0].timestamp);
        assert_eq!(storage.saves.load(Ordering::SeqCst), 1);
        assert_eq!(storage.saved.lock().unwrap().as_ref(), Some(&doc));
    }

    #[tokio::test]
    async fn test_failed_poll_leaves_store_untouched() {
        let s = Arc::new(store(&["A"]));
        s.record("A", 1, at("2025-11-30 10:00:00")).unwrap();
        let before = s.query(None).unwrap();
        let storage = Arc::new(MemoryStorage::default());

        for source in [FakeSource::Malformed, FakeSource::Hang] {
            let poller = Poller::new(
                Arc::new(source),
                s.clone(),
                storage.clone(),
                UtcOffset::UTC,
                Duration::from_millis(50),
            );
            assert!(poller.poll_once().await.is_err());
        }

        assert_eq!(s.query(None).unwrap(), before);
        assert_eq!(storage.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_poll_timeout_is_reported() {
        let poller = Poller::new(
            Arc::new(FakeSource::Hang),
            Arc::new(store(&["A"])),
            Arc::new(MemoryStorage::default()),
            UtcOffset::UTC,
            Duration::from_millis(20),
        );
        assert!(matches!(poller.poll_once().await, Err(PollError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_delivery_isolation() {
        let subscribers = Arc::new(MemorySubscribers::with(&[
            "https://push.example.com/1",
            "https://push.example.com/2",
            "https://push.example.com/3",
        ]));
        let push = Arc::new(ScriptedPush {
            outcomes: HashMap::from([(
                "https://push.example.com/2".to_owned(),
                DeliveryOutcome::PermanentlyInvalid,
            )]),
            ..ScriptedPush::default()
        });

        let report = dispatcher(subscribers.clone(), push.clone())
            .dispatch(&RaceEvent::Milestone { nominee: "A".into(), thousands: 100 })
            .await;

        assert_eq!(report, DispatchReport { delivered: 2, invalidated: 1, failed: 0 });
        let received: Vec<String> = push.received.lock().unwrap().iter().map(|(e, _)| e.clone()).collect();
        assert_eq!(received, vec!["https://push.example.com/1", "https://push.example.com/3"]);
        assert_eq!(*subscribers.removed.lock().unwrap(), vec!["https://push.example.com/2"]);
    }

    #[tokio::test]
    async fn test_transient_failures_keep_subscriber() {
        let subscribers = Arc::new(MemorySubscribers::with(&[
            "https://push.example.com/slow",
            "https://push.example.com/flaky",
            "https://push.example.com/ok",
        ]));
        let push = Arc::new(ScriptedPush {
            outcomes: HashMap::from([(
                "https://push.example.com/flaky".to_owned(),
                DeliveryOutcome::TransientFailure("503".into()),
            )]),
            hang: vec!["https://push.example.com/slow".to_owned()],
            ..ScriptedPush::default()
        });

        let started = Instant::now();
        let report = dispatcher(subscribers.clone(), push.clone())
            .dispatch(&RaceEvent::RankChange { nominee: "B".into(), rank: 0, leadership: true })
            .await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(report, DispatchReport { delivered: 1, invalidated: 0, failed: 2 });
        assert!(subscribers.removed.lock().unwrap().is_empty());
        assert_eq!(subscribers.list().await.unwrap().len(), 3);
    }

    #[test]
    fn test_bad_server_key_fails_at_startup() {
        assert!(WebPushDelivery::new("not-a-valid-key", "mailto:admin@example.com", 60).is_err());
        assert!(WebPushDelivery::new("", "mailto:admin@example.com", 60).is_err());
    }

    #[test]
    fn test_classify_push_errors() {
        assert_eq!(classify(&WebPushError::InvalidUri), DeliveryOutcome::PermanentlyInvalid);
        assert!(matches!(
            classify(&WebPushError::Unspecified),
            DeliveryOutcome::TransientFailure(_)
        ));
    }

    #[tokio::test]
    async fn test_sqlite_subscribers_idempotent_remove() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let subscribers = SqliteSubscriberStore::with_pool(pool).await.unwrap();

        subscribers.add(&subscription("https://push.example.com/1")).await.unwrap();
        subscribers.add(&subscription("https://push.example.com/1")).await.unwrap();
        subscribers.add(&subscription("https://push.example.com/2")).await.unwrap();
        assert_eq!(subscribers.list().await.unwrap().len(), 2);

        subscribers.remove("https://push.example.com/1").await.unwrap();
        subscribers.remove("https://push.example.com/1").await.unwrap();
        let remaining = subscribers.list().await.unwrap();
        assert_eq!(remaining, vec![subscription("https://push.example.com/2")]);
    }

    #[test]
    fn test_render_framing() {
        let d = dispatcher(Arc::default(), Arc::default());

        let leader = d.render(&RaceEvent::RankChange { nominee: "A".into(), rank: 0, leadership: true });
        assert!(leader.title.contains("new leader"));
        assert!(leader.body.contains("Nominee A"));
        assert_eq!(leader.icon, "https://cdn.example.com/A.png");

        let climb = d.render(&RaceEvent::RankChange { nominee: "B".into(), rank: 2, leadership: false });
        assert!(climb.body.contains("#3"));
        assert!(!climb.title.contains("new leader"));

        let milestone = d.render(&RaceEvent::Milestone { nominee: "A".into(), thousands: 200 });
        assert!(milestone.body.contains("200K"));

        let summary = d.render(&RaceEvent::Summary { leader: "Z".into(), votes: 1_234_567, gap: 4_500 });
        assert!(summary.body.contains("1,234,567"));
        assert!(summary.body.contains("4,500"));
        assert!(summary.body.contains('Z'));
        assert_eq!(summary.icon, DEFAULT_ICON);
    }

    #[tokio::test]
    async fn test_notifier_seeds_then_dispatches() {
        let s = Arc::new(store(&["A", "B"]));
        let subscribers = Arc::new(MemorySubscribers::with(&["https://push.example.com/1"]));
        let push = Arc::new(ScriptedPush::default());
        let start = Instant::now();
        let engine = RankingEngine::new(vec!["A".into(), "B".into()], RaceRules::default(), start);
        let mut notifier = Notifier::new(s.clone(), engine, dispatcher(subscribers, push.clone()));

        assert_eq!(notifier.check_once(start).await.unwrap(), 0);

        s.record_batch(&batch(&[("A", 99_000), ("B", 98_000)]), at("2025-11-30 10:00:00")).unwrap();
        assert_eq!(notifier.check_once(start).await.unwrap(), 0);

        s.record_batch(&batch(&[("A", 99_500), ("B", 100_100)]), at("2025-11-30 10:00:10")).unwrap();
        assert_eq!(notifier.check_once(start).await.unwrap(), 2);

        let received = push.received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert!(received[0].1.title.contains("new leader"));
        assert!(received[1].1.body.contains("100K"));
    }

    fn app_state(s: Arc<VoteHistoryStore>, subscribers: Arc<MemorySubscribers>) -> AppState {
        AppState { store: s, subscribers, vapid_public_key: None }
    }

    async fn client(state: AppState) -> Client {
        let rocket = build_rocket(
            rocket::Config::debug_default(),
            state,
            vec!["http://127.0.0.1:3000".into()],
        );
        Client::tracked(rocket).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_votes_route() {
        let s = Arc::new(store(&["A"]));
        s.record("A", 5, at("2025-11-30 10:00:00")).unwrap();
        s.record("A", 6, at("2025-11-30 10:00:10")).unwrap();
        let client = client(app_state(s, Arc::default())).await;

        let response = client
            .get("/get_votes")
            .header(rocket::http::Header::new("Origin", "http://127.0.0.1:3000"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("http://127.0.0.1:3000")
        );
        let body: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(body["vote_history"]["A"].as_array().unwrap().len(), 2);
        assert_eq!(body["last_update_time"], "2025-11-30 10:00:10");

        let response = client.get("/get_votes?last_updated=2025-11-30%2010:00:00").dispatch().await;
        let body: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(body["vote_history"]["A"][0]["vote_count"], 6);

        let response = client.get("/get_votes?last_updated=yesterday").dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
        let error: ErrorResponse = response.into_json().await.unwrap();
        assert_eq!(error.status, 400);
    }

    #[tokio::test]
    async fn test_cors_allow_list() {
        let client = client(app_state(Arc::new(store(&["A"])), Arc::default())).await;

        let response = client
            .get("/get_votes")
            .header(rocket::http::Header::new("Origin", "https://elsewhere.example.com"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.headers().get_one("Access-Control-Allow-Origin"), None);

        let response = client
            .options("/subscribe")
            .header(rocket::http::Header::new("Origin", "http://127.0.0.1:3000"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Methods"),
            Some("POST, GET, OPTIONS")
        );

        let open = Client::tracked(build_rocket(
            rocket::Config::debug_default(),
            app_state(Arc::new(store(&["A"])), Arc::default()),
            vec!["*".into()],
        ))
        .await
        .unwrap();
        let response = open
            .get("/get_votes")
            .header(rocket::http::Header::new("Origin", "https://elsewhere.example.com"))
            .dispatch()
            .await;
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("https://elsewhere.example.com")
        );
    }

    #[tokio::test]
    async fn test_subscribe_route() {
        let subscribers = Arc::new(MemorySubscribers::default());
        let client = client(app_state(Arc::new(store(&["A"])), subscribers.clone())).await;

        let response = client
            .post("/subscribe")
            .header(ContentType::JSON)
            .body(serde_json::to_string(&subscription("https://push.example.com/new")).unwrap())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);
        assert_eq!(subscribers.list().await.unwrap().len(), 1);

        let response = client
            .post("/subscribe")
            .header(ContentType::JSON)
            .body(serde_json::to_string(&subscription("http://insecure.example.com")).unwrap())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = client.get("/vapid_public_key").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[test]
    fn test_config_from_figment() {
        let figment = Figment::from(Toml::string(
            r#"
            [tracker]
            contest_name = "Test Awards"
            summary_interval_secs = 300

            [[tracker.nominees]]
            id = "w27-82"
            name = "Em Xinh Say Hi"
            "#,
        ));
        let config = TrackerConfig::from_figment(&figment).unwrap();
        assert_eq!(config.contest_name, "Test Awards");
        assert_eq!(config.race_rules().summary_interval, Duration::from_secs(300));
        assert_eq!(config.milestone_unit.get(), 100_000);
        assert_eq!(config.nominees[0].icon, DEFAULT_ICON);
    }

    #[test]
    fn test_config_validation() {
        let mut config = TrackerConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::NoNominees)));

        config.nominees = nominees(&["A", "A"]).iter().cloned().collect();
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateNominee(_))));

        config.nominees = nominees(&["A"]).iter().cloned().collect();
        config.poll_interval_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroInterval("poll_interval_secs"))));
    }

    #[test]
    fn test_utils() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(12_345_678), "12,345,678");

        assert_eq!(parse_since(None).unwrap(), None);
        assert_eq!(parse_since(Some("")).unwrap(), None);
        assert_eq!(parse_since(Some("2025-11-30 10:00:00")).unwrap(), Some(at("2025-11-30 10:00:00")));
        assert!(parse_since(Some("10:00")).is_err());

        assert_eq!(short_endpoint("https://a.b"), "https://a.b");
        assert!(short_endpoint(&"x".repeat(100)).ends_with("..."));
    }
}
