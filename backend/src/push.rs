use async_trait::async_trait;
use shared::{NotificationPayload, Subscription};
use web_push::{
    ContentEncoding, IsahcWebPushClient, PartialVapidSignatureBuilder, SubscriptionInfo,
    VapidSignatureBuilder, WebPushClient, WebPushError, WebPushMessageBuilder, URL_SAFE_NO_PAD,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The push service will never accept this subscription again.
    PermanentlyInvalid,
    TransientFailure(String),
}

#[async_trait]
pub trait PushDelivery: Send + Sync {
    async fn deliver(&self, target: &Subscription, payload: &NotificationPayload) -> DeliveryOutcome;
}

/// Only errors caused by the subscription itself are permanent. The server's
/// own VAPID key is validated once in [`WebPushDelivery::new`].
pub fn classify(error: &WebPushError) -> DeliveryOutcome {
    match error {
        WebPushError::EndpointNotValid { .. }
        | WebPushError::EndpointNotFound { .. }
        | WebPushError::BadRequest { .. }
        | WebPushError::InvalidUri { .. }
        | WebPushError::InvalidCryptoKeys { .. } => DeliveryOutcome::PermanentlyInvalid,
        other => DeliveryOutcome::TransientFailure(other.to_string()),
    }
}

pub struct WebPushDelivery {
    client: IsahcWebPushClient,
    signer: PartialVapidSignatureBuilder,
    subject: String,
    ttl: u32,
}

impl WebPushDelivery {
    /// Fails when the VAPID private key cannot be decoded.
    pub fn new(private_key: &str, subject: impl Into<String>, ttl: u32) -> Result<Self, WebPushError> {
        let signer = VapidSignatureBuilder::from_base64_no_sub(private_key, URL_SAFE_NO_PAD)?;
        Ok(Self {
            client: IsahcWebPushClient::new()?,
            signer,
            subject: subject.into(),
            ttl,
        })
    }

    async fn send(&self, target: &Subscription, body: &[u8]) -> Result<(), WebPushError> {
        let info = SubscriptionInfo::new(&target.endpoint, &target.keys.p256dh, &target.keys.auth);

        let mut signature = self.signer.clone().add_sub_info(&info);
        signature.add_claim("sub", self.subject.as_str());

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_ttl(self.ttl);
        builder.set_payload(ContentEncoding::Aes128Gcm, body);
        builder.set_vapid_signature(signature.build()?);

        self.client.send(builder.build()?).await
    }
}

#[async_trait]
impl PushDelivery for WebPushDelivery {
    async fn deliver(&self, target: &Subscription, payload: &NotificationPayload) -> DeliveryOutcome {
        let body = match serde_json::to_vec(payload) {
            Ok(body) => body,
            Err(e) => return DeliveryOutcome::TransientFailure(e.to_string()),
        };

        match self.send(target, &body).await {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => classify(&e),
        }
    }
}
