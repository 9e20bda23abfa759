use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request, Response,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::error;

use crate::services::ServiceError;

/// JSON envelope of every answer.
///
/// Success is `{"result": true, ...fields}`, failure is
/// `{"result": false, "error_type": ..., "error_message": ...}`.
#[derive(Debug)]
pub enum APIResponse {
    Success(Map<String, Value>),
    Error {
        status: Status,
        error_type: &'static str,
        message: String,
    },
}

impl APIResponse {
    /// Wraps `body`, which has to serialize to a JSON object (or unit).
    pub fn new<T: Serialize>(body: T) -> Self {
        match serde_json::to_value(body) {
            Ok(Value::Object(fields)) => Self::Success(fields),
            Ok(Value::Null) => Self::Success(Map::new()),
            Ok(other) => {
                error!(body = %other, "response body is not an object");
                Self::error(500, "Malformed response body")
            }
            Err(e) => Self::error(500, e.to_string()),
        }
    }

    pub fn error(code: u16, message: impl Into<String>) -> Self {
        let status = Status::from_code(code).unwrap_or(Status::InternalServerError);
        let error_type = match status.code {
            400 => "ValidationError",
            401 => "Unauthorized",
            404 => "NotFound",
            409 => "Conflict",
            422 => "UnprocessableEntity",
            _ => "InternalError",
        };

        Self::Error {
            status,
            error_type,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for APIResponse {
    fn from(err: ServiceError) -> Self {
        let status = err.status();
        if status.code >= 500 {
            error!(error = %err, "request failed");
        }

        Self::Error {
            status,
            error_type: err.kind(),
            message: err.to_string(),
        }
    }
}

impl<T: Serialize> From<Result<T, ServiceError>> for APIResponse {
    fn from(result: Result<T, ServiceError>) -> Self {
        match result {
            Ok(body) => Self::new(body),
            Err(err) => err.into(),
        }
    }
}

impl<'r> Responder<'r, 'static> for APIResponse {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let (status, body) = match self {
            Self::Success(mut fields) => {
                fields.insert("result".into(), Value::Bool(true));
                (Status::Ok, Value::Object(fields))
            }
            Self::Error {
                status,
                error_type,
                message,
            } => (
                status,
                json!({
                    "result": false,
                    "error_type": error_type,
                    "error_message": message,
                }),
            ),
        };

        Response::build_from(Json(body).respond_to(request)?)
            .status(status)
            .ok()
    }
}
