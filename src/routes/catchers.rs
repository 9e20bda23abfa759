use rocket::{catch, catchers, http::Status, Catcher, Request};
use tracing::debug;

use crate::models::response::APIResponse;

pub fn catchers() -> Vec<Catcher> {
    catchers![unauthorized, unknown_endpoint, unprocessable, fallback]
}

/// Reached when the `CurrentUser` guard rejects the request.
#[catch(401)]
fn unauthorized() -> APIResponse {
    APIResponse::error(401, "Invalid API Key")
}

#[catch(404)]
fn unknown_endpoint(request: &Request) -> APIResponse {
    debug!(uri = %request.uri(), "no route matched");
    APIResponse::error(404, "Endpoint doesn't exist")
}

/// Bodies or parameters that could not be parsed.
#[catch(422)]
fn unprocessable(request: &Request) -> APIResponse {
    debug!(uri = %request.uri(), "malformed request");
    APIResponse::error(422, "Malformed request")
}

#[catch(default)]
fn fallback(status: Status, _: &Request) -> APIResponse {
    APIResponse::error(status.code, status.reason_lossy())
}
