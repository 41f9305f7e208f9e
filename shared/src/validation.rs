use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use crate::models::Subscription;

pub const MAX_ENDPOINT_LENGTH: usize = 1024;
pub const MAX_KEY_LENGTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Subscription endpoint is empty")]
    EmptyEndpoint,
    #[error("Subscription endpoint exceeds maximum length of {MAX_ENDPOINT_LENGTH}")]
    EndpointTooLong,
    #[error("Subscription endpoint must use https")]
    InsecureEndpoint,
    #[error("Invalid subscription key: {0}")]
    InvalidKey(&'static str),
}

fn validate_key(name: &'static str, value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim_end_matches('=');
    if trimmed.is_empty() || trimmed.len() > MAX_KEY_LENGTH {
        return Err(ValidationError::InvalidKey(name));
    }
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidKey(name))
}

pub fn validate_subscription(subscription: &Subscription) -> Result<(), ValidationError> {
    let endpoint = subscription.endpoint.trim();
    if endpoint.is_empty() {
        return Err(ValidationError::EmptyEndpoint);
    }
    if endpoint.len() > MAX_ENDPOINT_LENGTH {
        return Err(ValidationError::EndpointTooLong);
    }
    if !endpoint.starts_with("https://") {
        return Err(ValidationError::InsecureEndpoint);
    }

    validate_key("p256dh", &subscription.keys.p256dh)?;
    validate_key("auth", &subscription.keys.auth)
}
