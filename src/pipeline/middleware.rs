//! Middleware trait, type erasure and the per-route continuation.
//!
//! Every stage of a generated route (before hook, data-access operation,
//! after hook) is a [`Middleware`]. Stages are stored type-erased as
//! [`BoxedMiddleware`] so one pipeline can hold caller closures, the stock
//! operation handlers and the shared no-op side by side.
//!
//! A stage either hands the request on with [`Next::run`] or ends the pipeline
//! by returning its own response. Awaiting inside the stage suspends the
//! pipeline until the awaited work completes.

use crate::response::fallthrough;
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Heap-allocated future returned by every stage.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// One pipeline stage.
///
/// Implemented for every `Fn(Request, Next) -> impl Future<Output = impl IntoResponse>`,
/// so plain `async fn` items and closures work directly. Types with their own
/// state may implement it by hand.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// Shared, type-erased stage.
pub type BoxedMiddleware = Arc<dyn Middleware>;

impl<F, Fut, R> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let fut = (self)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Box a middleware for use in a hook table or pipeline.
pub fn middleware<M: Middleware>(m: M) -> BoxedMiddleware {
    Arc::new(m)
}

/// Continuation over the stages that follow the current one.
#[derive(Clone)]
pub struct Next {
    stages: Arc<[BoxedMiddleware]>,
    index: usize,
}

impl Next {
    pub(crate) fn start(stages: Arc<[BoxedMiddleware]>) -> Self {
        Self { stages, index: 0 }
    }

    /// Run the remaining stages. Past the last stage this yields a 404.
    pub async fn run(self, req: Request) -> Response {
        match self.stages.get(self.index) {
            Some(stage) => {
                let stage = Arc::clone(stage);
                let next = Next {
                    stages: self.stages,
                    index: self.index + 1,
                };
                stage.call(req, next).await
            }
            None => {
                tracing::debug!(method = %req.method(), path = %req.uri().path(), "pipeline exhausted");
                fallthrough(req.method(), req.uri().path())
            }
        }
    }

    /// Number of stages still to run, including the one `run` would call.
    pub fn remaining(&self) -> usize {
        self.stages.len().saturating_sub(self.index)
    }
}
