//! Request-scoped result channel and route parameters.

use crate::response::json_with_status;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

/// Result handed from a data-access stage to the after hook.
///
/// Lives in the request extensions; one per request, never shared.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    pub data: Value,
    pub status: Option<StatusCode>,
}

impl Outcome {
    pub fn new(data: Value) -> Self {
        Self { data, status: None }
    }

    pub fn with_status(data: Value, status: StatusCode) -> Self {
        Self {
            data,
            status: Some(status),
        }
    }

    /// Put `data` (and optionally `status`) into the request's channel,
    /// replacing anything already there.
    pub fn store(req: &mut Request, data: Value, status: Option<StatusCode>) {
        req.extensions_mut().insert(Outcome { data, status });
    }

    /// Remove and return the channel's content.
    pub fn take(req: &mut Request) -> Option<Outcome> {
        req.extensions_mut().remove::<Outcome>()
    }

    pub fn peek(req: &Request) -> Option<&Outcome> {
        req.extensions().get::<Outcome>()
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        json_with_status(self.data, self.status)
    }
}

/// The `:id` segment of an item route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn from_request(req: &Request) -> Option<&str> {
        req.extensions().get::<ItemId>().map(|id| id.0.as_str())
    }
}
