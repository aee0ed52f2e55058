//! Per-collection CRUD router built from a normalized hook table.
//!
//! Each route runs a three-stage pipeline: the configured before hook, the
//! data-access operation, then the configured after hook. Draft routes share
//! their primary route's operation and differ only in the hook pair (ONESOFT
//! instead of ONE).

use crate::config::{validate_collection, EntityConfig, HookRegistry};
use crate::error::ConfigError;
use crate::hooks::{normalize, HookTable, Method, Verb, VerbConfig};
use crate::pipeline::{BoxedMiddleware, ItemId, Pipeline};
use crate::service::DataAccess;
use axum::extract::{Path, Request};
use axum::routing::{on, MethodRouter};
use axum::Router;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Input for building an [`Entity`].
pub struct EntityDescriptor<D> {
    pub collection: String,
    pub model: Arc<D>,
    pub types: VerbConfig,
}

/// One registered route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteInfo {
    pub verb: Verb,
    pub method: Method,
    pub path: &'static str,
}

impl fmt::Display for RouteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.path)
    }
}

/// A collection with its generated router. Immutable after construction.
pub struct Entity<D> {
    collection: String,
    model: Arc<D>,
    hooks: HookTable,
    router: Router,
    routes: Vec<RouteInfo>,
}

impl<D: DataAccess> Entity<D> {
    pub fn new(descriptor: EntityDescriptor<D>) -> Result<Self, ConfigError> {
        let EntityDescriptor {
            collection,
            model,
            types,
        } = descriptor;
        validate_collection(&collection)?;
        let hooks = normalize(types)?;
        let (router, routes) = RouteAssembler::new(&collection, &hooks, model.as_ref()).build();
        tracing::info!(collection = %collection, routes = routes.len(), "entity router built");
        Ok(Self {
            collection,
            model,
            hooks,
            router,
            routes,
        })
    }

    /// Build from a loaded [`EntityConfig`], resolving hook names in `registry`.
    pub fn from_config(config: &EntityConfig, registry: &HookRegistry, model: Arc<D>) -> Result<Self, ConfigError> {
        Self::new(EntityDescriptor {
            collection: config.collection.clone(),
            model,
            types: config.verb_config(registry)?,
        })
    }

    /// The assembled router, for mounting into a larger tree.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The data-access capability behind the generated routes.
    pub fn model(&self) -> &Arc<D> {
        &self.model
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn mount_path(&self) -> String {
        format!("/{}", self.collection)
    }

    pub fn hooks(&self) -> &HookTable {
        &self.hooks
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }
}

#[derive(Clone, Copy)]
enum Target {
    Collection,
    Item,
}

/// Accumulates routes for one entity. `build` consumes it, so a hook table is
/// assembled into a router at most once per construction.
struct RouteAssembler<'a> {
    collection: &'a str,
    hooks: &'a HookTable,
    model: &'a dyn DataAccess,
    paths: BTreeMap<&'static str, MethodRouter>,
    routes: Vec<RouteInfo>,
}

impl<'a> RouteAssembler<'a> {
    fn new(collection: &'a str, hooks: &'a HookTable, model: &'a dyn DataAccess) -> Self {
        Self {
            collection,
            hooks,
            model,
            paths: BTreeMap::new(),
            routes: Vec::new(),
        }
    }

    fn build(mut self) -> (Router, Vec<RouteInfo>) {
        self.set_get_routes();
        self.set_write_routes(Verb::Post, "/", "/draft", Target::Collection);
        self.set_write_routes(Verb::Patch, "/:id", "/:id/draft", Target::Item);
        self.set_write_routes(Verb::Put, "/:id", "/:id/draft", Target::Item);
        let router = self
            .paths
            .into_iter()
            .fold(Router::new(), |router, (path, methods)| router.route(path, methods));
        (router, self.routes)
    }

    fn set_get_routes(&mut self) {
        if !self.hooks.is_enabled(Verb::Get) {
            return;
        }
        let all = self.model.get_all_route();
        self.add(Verb::Get, Method::All, "/", Target::Collection, all);
        let one = self.model.get_one_route();
        self.add(Verb::Get, Method::One, "/:id", Target::Item, one);
    }

    /// POST/PATCH/PUT: a primary route bound to ONE and a draft route bound to
    /// ONESOFT, both running the same operation.
    fn set_write_routes(&mut self, verb: Verb, primary: &'static str, draft: &'static str, target: Target) {
        if !self.hooks.is_enabled(verb) {
            return;
        }
        let operation = match verb {
            Verb::Post => self.model.create_one_route(),
            _ => self.model.update_one_route(),
        };
        self.add(verb, Method::One, primary, target, Arc::clone(&operation));
        self.add(verb, Method::OneSoft, draft, target, operation);
    }

    fn add(&mut self, verb: Verb, method: Method, path: &'static str, target: Target, operation: BoxedMiddleware) {
        let Some(pair) = self.hooks.get(verb, method) else {
            return;
        };
        let pipeline = Pipeline::new(vec![pair.before.clone(), operation, pair.after.clone()]);
        let filter = verb.method_filter();
        let route = match target {
            Target::Collection => on(filter, move |req: Request| {
                let pipeline = pipeline.clone();
                async move { pipeline.run(req).await }
            }),
            Target::Item => on(filter, move |Path(id): Path<String>, mut req: Request| {
                let pipeline = pipeline.clone();
                async move {
                    req.extensions_mut().insert(ItemId(id));
                    pipeline.run(req).await
                }
            }),
        };
        let route = match self.paths.remove(path) {
            Some(existing) => existing.merge(route),
            None => route,
        };
        self.paths.insert(path, route);

        let info = RouteInfo { verb, method, path };
        tracing::debug!(collection = self.collection, route = %info, method = %method, "registered route");
        self.routes.push(info);
    }
}
