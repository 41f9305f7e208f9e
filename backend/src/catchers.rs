use rocket::{Request, catch, serde::json::Json};
use shared::ErrorResponse;

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(400, "Invalid request parameters."))
}

#[catch(404)]
pub fn not_found(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(404, "The requested resource was not found."))
}

#[catch(422)]
pub fn unprocessable(req: &Request) -> Json<ErrorResponse> {
    let error_msg = match req.uri().path().segments().next() {
        Some("subscribe") => "Malformed push subscription.",
        _ => "The request body could not be understood.",
    };
    Json(ErrorResponse::new(422, error_msg))
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(500, "An internal server error occurred."))
}
