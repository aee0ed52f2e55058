//! Traits at the data-access seam.

use crate::error::AppError;
use crate::pipeline::BoxedMiddleware;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Pipeline stages a generated router binds between the before and after hooks.
///
/// Each stage is expected to put its result into the request's
/// [`Outcome`](crate::pipeline::Outcome) channel and call `next`, leaving the
/// after hook to decide how the response is written.
pub trait DataAccess: Send + Sync + 'static {
    fn get_all_route(&self) -> BoxedMiddleware;
    fn get_one_route(&self) -> BoxedMiddleware;
    fn create_one_route(&self) -> BoxedMiddleware;
    fn update_one_route(&self) -> BoxedMiddleware;
}

/// A store of JSON documents keyed by a string `id`.
#[async_trait]
pub trait Collection: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// All documents whose top-level fields equal every `(field, value)` filter.
    async fn find_all(&self, filters: &[(String, String)]) -> Result<Vec<Value>, AppError>;

    async fn find_one(&self, id: &str) -> Result<Option<Value>, AppError>;

    /// Insert a document; returns it as stored (with `id` and timestamps).
    async fn create_one(&self, doc: Map<String, Value>) -> Result<Value, AppError>;

    /// Merge `patch` into the document. `None` when no document has `id`.
    async fn update_one(&self, id: &str, patch: Map<String, Value>) -> Result<Option<Value>, AppError>;
}

/// Exact-match filter over top-level fields. Non-string values compare by
/// their JSON text, so `?count=3` matches `{"count": 3}`.
pub fn matches_filters(doc: &Value, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(field, expected)| match doc.get(field) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == *expected,
        None => false,
    })
}
