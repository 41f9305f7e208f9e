use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::ErrorResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid timestamp, expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp,
    #[error("Invalid subscription: {0}")]
    InvalidSubscription(String),
    #[error("Push notifications are not configured")]
    NotConfigured,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::InvalidTimestamp => Status::BadRequest,
            ApiError::InvalidSubscription(_) => Status::BadRequest,
            ApiError::NotConfigured => Status::NotFound,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(_) => "An unexpected error occurred".to_owned(),
            other => other.to_string(),
        };

        rocket::Response::build_from(Json(ErrorResponse::new(status.code, message)).respond_to(req)?)
            .status(status)
            .ok()
    }
}
