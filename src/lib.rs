//! crudkit: declarative CRUD routes with before/after hooks per verb and method.
//!
//! A sparse [`VerbConfig`] is normalized into a complete [`HookTable`] and an
//! [`Entity`] assembles one axum router whose routes each run
//! before hook → data-access operation → after hook.

pub mod config;
pub mod error;
pub mod hooks;
pub mod pipeline;
pub mod response;
pub mod routes;
pub mod service;
pub mod store;

pub use config::{load_from_path, EntityConfig, HookRefs, HookRegistry, ServiceConfig};
pub use error::{AppError, ConfigError};
pub use hooks::{noop, normalize, HookConfig, HookPair, HookTable, Method, Verb, VerbConfig};
pub use pipeline::{middleware, BoxedMiddleware, ItemId, Middleware, Next, Outcome, Pipeline};
pub use routes::{collection_routes, common_routes, Entity, EntityDescriptor, RouteInfo};
pub use service::{Collection, DataAccess, Generator, MemoryCollection, DEFAULT_BODY_LIMIT};
pub use store::{ensure_database_exists, PgCollection};
