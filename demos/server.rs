//! Example server: loads the service description from `CONFIG_PATH` (or a built-in one), backs each
//! collection with Postgres when `DATABASE_URL` is set and in memory otherwise, mounts common and
//! collection routes.

use axum::extract::Request;
use axum::response::Response;
use axum::Router;
use crudkit::{
    collection_routes, common_routes, ensure_database_exists, load_from_path, middleware, Entity, Generator,
    HookRegistry, MemoryCollection, Next, PgCollection, ServiceConfig, DEFAULT_BODY_LIMIT,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = r#"{
    "entities": [
        {
            "collection": "items",
            "types": {
                "GET": { "ALL": { "before": "log_request" } },
                "POST": {},
                "PATCH": {}
            }
        }
    ]
}"#;

async fn log_request(req: Request, next: Next) -> Response {
    tracing::info!(method = %req.method(), path = %req.uri().path(), "request");
    next.run(req).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crudkit=info")),
        )
        .init();

    let config = match std::env::var("CONFIG_PATH") {
        Ok(path) => load_from_path(path).await?,
        Err(_) => ServiceConfig::from_json(DEFAULT_CONFIG)?,
    };
    let registry = HookRegistry::new().with("log_request", middleware(log_request));

    let api = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            ensure_database_exists(&database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;
            let mut entities = Vec::new();
            for entity in &config.entities {
                let collection = PgCollection::new(pool.clone(), entity.collection.clone())?;
                collection.ensure_table().await?;
                entities.push(Entity::from_config(entity, &registry, Arc::new(Generator::new(collection)))?);
            }
            collection_routes(&entities, DEFAULT_BODY_LIMIT)
        }
        Err(_) => {
            tracing::info!("DATABASE_URL not set, using in-memory collections");
            let mut entities = Vec::new();
            for entity in &config.entities {
                let collection = MemoryCollection::new(entity.collection.clone());
                entities.push(Entity::from_config(entity, &registry, Arc::new(Generator::new(collection)))?);
            }
            collection_routes(&entities, DEFAULT_BODY_LIMIT)
        }
    };

    let app = Router::new().merge(common_routes()).nest("/api/v1", api);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
