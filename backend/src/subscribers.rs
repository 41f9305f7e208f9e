use std::str::FromStr;
use async_trait::async_trait;
use shared::{Subscription, SubscriptionKeys};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;
use crate::utils::short_endpoint;

#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Registered push targets, keyed by endpoint.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Inserts or replaces the subscription with the same endpoint.
    async fn add(&self, subscription: &Subscription) -> Result<(), SubscriberError>;
    async fn list(&self) -> Result<Vec<Subscription>, SubscriberError>;
    /// Removing an endpoint that is not registered succeeds.
    async fn remove(&self, endpoint: &str) -> Result<(), SubscriberError>;
}

pub struct SqliteSubscriberStore {
    pool: SqlitePool,
}

impl SqliteSubscriberStore {
    pub async fn connect(url: &str) -> Result<Self, SubscriberError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Result<Self, SubscriberError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SubscriberStore for SqliteSubscriberStore {
    async fn add(&self, subscription: &Subscription) -> Result<(), SubscriberError> {
        sqlx::query("INSERT OR REPLACE INTO subscribers (endpoint, p256dh, auth) VALUES (?, ?, ?)")
            .bind(&subscription.endpoint)
            .bind(&subscription.keys.p256dh)
            .bind(&subscription.keys.auth)
            .execute(&self.pool)
            .await?;
        info!("New subscriber saved: {}", short_endpoint(&subscription.endpoint));
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Subscription>, SubscriberError> {
        let rows: Vec<(String, String, String)> =
            sqlx::query_as("SELECT endpoint, p256dh, auth FROM subscribers ORDER BY created_at, endpoint")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(endpoint, p256dh, auth)| Subscription {
                endpoint,
                keys: SubscriptionKeys { p256dh, auth },
            })
            .collect())
    }

    async fn remove(&self, endpoint: &str) -> Result<(), SubscriberError> {
        sqlx::query("DELETE FROM subscribers WHERE endpoint = ?")
            .bind(endpoint)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
