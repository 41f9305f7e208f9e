use std::sync::Arc;
use std::time::Instant;
use backend::{
    config::{TrackerConfig, VapidKeys},
    dispatcher::Dispatcher,
    notifier::Notifier,
    poller::Poller,
    push::WebPushDelivery,
    routes::{build_rocket, AppState},
    source::ProviderSource,
    storage::{HistoryStorage, JsonFileStorage},
    store::VoteHistoryStore,
    subscribers::{SqliteSubscriberStore, SubscriberStore},
};
use shared::RankingEngine;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=info,shared=info,rocket=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();
    info!("🚀 Starting vote tracker");

    let figment = rocket::Config::figment();
    let config = TrackerConfig::from_figment(&figment)?;
    let nominees = config.nominees();
    let offset = config.utc_offset()?;
    info!("📋 Tracking {} nominees for {}", nominees.len(), config.contest_name);

    let history_file = JsonFileStorage::new(&config.history_path);
    info!("💾 Vote history file: {}", history_file.path().display());
    let storage: Arc<dyn HistoryStorage> = Arc::new(history_file);
    let store = Arc::new(VoteHistoryStore::load(storage.as_ref(), &nominees, offset).await);
    let subscribers: Arc<dyn SubscriberStore> =
        Arc::new(SqliteSubscriberStore::connect(&config.subscribers_url).await?);

    let source = Arc::new(ProviderSource::new(config.source.clone(), nominees.clone())?);
    let poller = Poller::new(source, store.clone(), storage, offset, config.fetch_timeout());
    tokio::spawn(poller.run(config.poll_interval()));

    let vapid = VapidKeys::from_env();
    match &vapid {
        Some(keys) => {
            let push = Arc::new(WebPushDelivery::new(
                &keys.private_key,
                config.vapid_subject.clone(),
                config.push_ttl_secs,
            )?);
            let dispatcher = Dispatcher::new(
                subscribers.clone(),
                push,
                nominees.clone(),
                config.contest_name.clone(),
                config.delivery_timeout(),
            )
            .with_click_url(config.click_url.clone());
            let engine = RankingEngine::new(nominees.ids(), config.race_rules(), Instant::now());
            tokio::spawn(Notifier::new(store.clone(), engine, dispatcher).run(config.notify_interval()));
        }
        None => warn!("VAPID_PRIVATE_KEY/VAPID_PUBLIC_KEY not set - push notifications will be disabled"),
    }

    let state = AppState {
        store,
        subscribers,
        vapid_public_key: vapid.map(|keys| keys.public_key),
    };

    build_rocket(figment, state, config.allowed_origins.clone())
        .launch()
        .await?;
    Ok(())
}
