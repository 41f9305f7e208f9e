pub mod config;
pub mod store;
pub mod storage;
pub mod source;
pub mod poller;
pub mod push;
pub mod subscribers;
pub mod dispatcher;
pub mod notifier;
pub mod routes;
pub mod cors;
pub mod error;
pub mod utils;
pub mod catchers;
pub use shared::{models::*, race::*, ErrorResponse};

#[cfg(test)]
mod tests;
