//! Route trees: generated per-collection CRUD routes and common service routes.

mod common;
mod entity;

pub use common::common_routes;
pub use entity::{Entity, EntityDescriptor, RouteInfo};

use crate::service::DataAccess;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

/// Nest every entity's router at `/{collection}` and cap request bodies at `body_limit` bytes.
pub fn collection_routes<'a, D, I>(entities: I, body_limit: usize) -> Router
where
    D: DataAccess,
    I: IntoIterator<Item = &'a Entity<D>>,
{
    entities
        .into_iter()
        .fold(Router::new(), |router, entity| {
            tracing::info!(path = %entity.mount_path(), "mounting collection");
            router.nest(&entity.mount_path(), entity.router())
        })
        .layer(RequestBodyLimitLayer::new(body_limit))
}
