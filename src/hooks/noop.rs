//! Default hook used wherever a before/after hook is not configured.

use crate::pipeline::{middleware, BoxedMiddleware, Next, Outcome};
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use std::sync::{Arc, LazyLock};

static NOOP: LazyLock<BoxedMiddleware> = LazyLock::new(|| middleware(noop_middleware));

/// The shared no-op hook. Every call returns the same instance.
pub fn noop() -> BoxedMiddleware {
    Arc::clone(&*NOOP)
}

pub fn is_noop(hook: &BoxedMiddleware) -> bool {
    Arc::ptr_eq(hook, &*NOOP)
}

/// Writes and clears a pending result if one is present, otherwise passes on.
async fn noop_middleware(mut req: Request, next: Next) -> Response {
    if let Some(outcome) = Outcome::take(&mut req) {
        tracing::debug!(status = ?outcome.status, "emitting stored result");
        return outcome.into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use axum::body::Body;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn storing(data: serde_json::Value, status: Option<StatusCode>) -> BoxedMiddleware {
        middleware(move |mut req: Request, next: Next| {
            let data = data.clone();
            async move {
                Outcome::store(&mut req, data, status);
                next.run(req).await
            }
        })
    }

    fn request() -> Request {
        axum::http::Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn noop_is_shared() {
        let a = noop();
        let b = noop();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(is_noop(&a));
        let other = middleware(|req: Request, next: Next| next.run(req));
        assert!(!is_noop(&other));
    }

    #[tokio::test]
    async fn writes_stored_result_with_status() {
        let reached = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&reached);
        let tail = middleware(move |req: Request, next: Next| {
            flag.store(true, Ordering::SeqCst);
            next.run(req)
        });
        let pipeline = Pipeline::new(vec![
            storing(json!({"id": "1"}), Some(StatusCode::CREATED)),
            noop(),
            tail,
        ]);
        let response = pipeline.run(request()).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, json!({"id": "1"}));
        assert!(!reached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn defaults_to_ok_without_status() {
        let pipeline = Pipeline::new(vec![storing(json!([1, 2]), None), noop()]);
        let response = pipeline.run(request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([1, 2]));
    }

    #[tokio::test]
    async fn emitted_result_ends_the_pipeline() {
        let after_noop = middleware(|req: Request, _next: Next| async move {
            if Outcome::peek(&req).is_some() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::NO_CONTENT
            }
        });
        let first = Pipeline::new(vec![noop(), after_noop]);
        let mut req = request();
        Outcome::store(&mut req, json!("x"), None);
        let response = first.run(req).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn passes_through_when_empty() {
        let reached = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&reached);
        let tail = middleware(move |_req: Request, _next: Next| {
            flag.store(true, Ordering::SeqCst);
            async { StatusCode::ACCEPTED }
        });
        let response = Pipeline::new(vec![noop(), tail]).run(request()).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(reached.load(Ordering::SeqCst));
    }
}
