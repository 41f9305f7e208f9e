use std::sync::Arc;
use rocket::figment::Provider;
use rocket::{Build, Rocket, State, catchers, get, post, routes, http::Status, serde::json::Json};
use serde::Serialize;
use shared::{validate_subscription, Subscription, VoteHistory};
use tracing::{error, instrument};
use crate::{
    catchers::{bad_request, internal_error, not_found, unprocessable},
    cors::CORS,
    error::ApiError,
    store::VoteHistoryStore,
    subscribers::SubscriberStore,
    utils::parse_since,
};

pub struct AppState {
    pub store: Arc<VoteHistoryStore>,
    pub subscribers: Arc<dyn SubscriberStore>,
    pub vapid_public_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VapidKeyResponse {
    pub public_key: String,
}

#[instrument(skip(state))]
#[get("/get_votes?<last_updated>")]
pub async fn get_votes(state: &State<AppState>, last_updated: Option<&str>) -> Result<Json<VoteHistory>, ApiError> {
    let since = parse_since(last_updated)?;
    state.store.query(since).map(Json).map_err(|e| {
        error!("API error: {}", e);
        ApiError::Internal(e.to_string())
    })
}

#[instrument(skip(state, subscription))]
#[post("/subscribe", format = "json", data = "<subscription>")]
pub async fn subscribe(
    state: &State<AppState>,
    subscription: Json<Subscription>,
) -> Result<(Status, Json<SubscribeResponse>), ApiError> {
    let subscription = subscription.into_inner();
    validate_subscription(&subscription).map_err(|e| ApiError::InvalidSubscription(e.to_string()))?;

    state.subscribers.add(&subscription).await.map_err(|e| {
        error!("Failed to save subscriber: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    Ok((Status::Created, Json(SubscribeResponse { status: "subscribed" })))
}

#[get("/vapid_public_key")]
pub async fn vapid_public_key(state: &State<AppState>) -> Result<Json<VapidKeyResponse>, ApiError> {
    state
        .vapid_public_key
        .clone()
        .map(|public_key| Json(VapidKeyResponse { public_key }))
        .ok_or(ApiError::NotConfigured)
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}

pub fn build_rocket<T: Provider>(provider: T, state: AppState, allowed_origins: Vec<String>) -> Rocket<Build> {
    rocket::custom(provider)
        .attach(CORS::new(allowed_origins))
        .manage(state)
        .mount("/", routes![get_votes, subscribe, vapid_public_key, all_options])
        .register("/", catchers![bad_request, not_found, unprocessable, internal_error])
}
