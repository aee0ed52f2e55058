//! Ordered middleware pipelines: stage abstraction, continuation and result channel.

mod channel;
mod middleware;

pub use channel::{ItemId, Outcome};
pub use middleware::{middleware, BoxFuture, BoxedMiddleware, Middleware, Next};

use axum::extract::Request;
use axum::response::Response;
use std::sync::Arc;

/// Immutable stage list for one route. Cloning shares the stages.
#[derive(Clone)]
pub struct Pipeline {
    stages: Arc<[BoxedMiddleware]>,
}

impl Pipeline {
    pub fn new(stages: Vec<BoxedMiddleware>) -> Self {
        Self {
            stages: stages.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[BoxedMiddleware] {
        &self.stages
    }

    pub async fn run(&self, req: Request) -> Response {
        Next::start(Arc::clone(&self.stages)).run(req).await
    }
}
