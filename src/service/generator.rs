//! Stock data-access stages over any [`Collection`].

use crate::error::AppError;
use crate::pipeline::{middleware, BoxedMiddleware, ItemId, Next, Outcome};
use crate::service::{Collection, DataAccess};
use axum::body::Body;
use axum::extract::{Query, Request};
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Largest request body the create/update stages will buffer.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Turns a [`Collection`] into the four pipeline stages of [`DataAccess`].
pub struct Generator<C> {
    collection: Arc<C>,
    body_limit: usize,
}

impl<C: Collection> Generator<C> {
    pub fn new(collection: C) -> Self {
        Self::from_arc(Arc::new(collection))
    }

    pub fn from_arc(collection: Arc<C>) -> Self {
        Self {
            collection,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn collection(&self) -> &Arc<C> {
        &self.collection
    }
}

impl<C: Collection> DataAccess for Generator<C> {
    fn get_all_route(&self) -> BoxedMiddleware {
        let collection = Arc::clone(&self.collection);
        middleware(move |req: Request, next: Next| {
            let collection = Arc::clone(&collection);
            async move { get_all(collection.as_ref(), req, next).await }
        })
    }

    fn get_one_route(&self) -> BoxedMiddleware {
        let collection = Arc::clone(&self.collection);
        middleware(move |req: Request, next: Next| {
            let collection = Arc::clone(&collection);
            async move { get_one(collection.as_ref(), req, next).await }
        })
    }

    fn create_one_route(&self) -> BoxedMiddleware {
        let collection = Arc::clone(&self.collection);
        let limit = self.body_limit;
        middleware(move |req: Request, next: Next| {
            let collection = Arc::clone(&collection);
            async move { create_one(collection.as_ref(), limit, req, next).await }
        })
    }

    fn update_one_route(&self) -> BoxedMiddleware {
        let collection = Arc::clone(&self.collection);
        let limit = self.body_limit;
        middleware(move |req: Request, next: Next| {
            let collection = Arc::clone(&collection);
            async move { update_one(collection.as_ref(), limit, req, next).await }
        })
    }
}

async fn get_all<C: Collection>(collection: &C, mut req: Request, next: Next) -> Result<Response, AppError> {
    let Query(filters) = Query::<Vec<(String, String)>>::try_from_uri(req.uri())
        .map_err(|e| AppError::BadRequest(format!("invalid query: {}", e)))?;
    let docs = collection.find_all(&filters).await?;
    tracing::debug!(collection = collection.name(), count = docs.len(), "fetched all");
    Outcome::store(&mut req, Value::Array(docs), None);
    Ok(next.run(req).await)
}

async fn get_one<C: Collection>(collection: &C, mut req: Request, next: Next) -> Result<Response, AppError> {
    let id = item_id(&req)?;
    let doc = collection
        .find_one(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(id.clone()))?;
    tracing::debug!(collection = collection.name(), id = %id, "fetched one");
    Outcome::store(&mut req, doc, None);
    Ok(next.run(req).await)
}

async fn create_one<C: Collection>(
    collection: &C,
    limit: usize,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut req, body) = read_object(req, limit).await?;
    let doc = collection.create_one(body).await?;
    tracing::debug!(collection = collection.name(), "created one");
    Outcome::store(&mut req, doc, Some(StatusCode::CREATED));
    Ok(next.run(req).await)
}

async fn update_one<C: Collection>(
    collection: &C,
    limit: usize,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let id = item_id(&req)?;
    let (mut req, patch) = read_object(req, limit).await?;
    let doc = collection
        .update_one(&id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(id.clone()))?;
    tracing::debug!(collection = collection.name(), id = %id, "updated one");
    Outcome::store(&mut req, doc, None);
    Ok(next.run(req).await)
}

fn item_id(req: &Request) -> Result<String, AppError> {
    ItemId::from_request(req)
        .map(str::to_owned)
        .ok_or_else(|| AppError::BadRequest("missing item id".into()))
}

/// Buffer the body as a JSON object and hand back the request with an empty body.
async fn read_object(req: Request, limit: usize) -> Result<(Request, Map<String, Value>), AppError> {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| AppError::BadRequest(format!("unreadable body: {}", e)))?;
    let value: Value =
        serde_json::from_slice(&bytes).map_err(|e| AppError::BadRequest(format!("invalid JSON body: {}", e)))?;
    match value {
        Value::Object(map) => Ok((Request::from_parts(parts, Body::empty()), map)),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::noop;
    use crate::pipeline::Pipeline;
    use crate::service::MemoryCollection;
    use serde_json::json;

    async fn run(stage: BoxedMiddleware, req: Request) -> (StatusCode, Value) {
        let response = Pipeline::new(vec![stage, noop()]).run(req).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn json_request(body: &str, id: Option<&str>) -> Request {
        let mut req = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        if let Some(id) = id {
            req.extensions_mut().insert(ItemId(id.to_string()));
        }
        req
    }

    #[tokio::test]
    async fn create_then_fetch() {
        let generator = Generator::new(MemoryCollection::new("items"));
        let (status, created) = run(generator.create_one_route(), json_request(r#"{"id":"a","n":1}"#, None)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], "a");

        let mut req = axum::http::Request::builder().uri("/a").body(Body::empty()).unwrap();
        req.extensions_mut().insert(ItemId("a".into()));
        let (status, fetched) = run(generator.get_one_route(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["n"], 1);
    }

    #[tokio::test]
    async fn list_applies_query_filters() {
        let generator = Generator::new(MemoryCollection::new("items"));
        for body in [r#"{"kind":"bolt"}"#, r#"{"kind":"nut"}"#, r#"{"kind":"bolt"}"#] {
            run(generator.create_one_route(), json_request(body, None)).await;
        }
        let req = axum::http::Request::builder().uri("/?kind=bolt").body(Body::empty()).unwrap();
        let (status, docs) = run(generator.get_all_route(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(docs.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let generator = Generator::new(MemoryCollection::new("items"));
        let (status, body) = run(generator.update_one_route(), json_request(r#"{"n":2}"#, Some("nope"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn non_object_body_is_rejected() {
        let generator = Generator::new(MemoryCollection::new("items"));
        let (status, _) = run(generator.create_one_route(), json_request("[1,2]", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = run(generator.create_one_route(), json_request("{not json", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let generator = Generator::new(MemoryCollection::new("items")).with_body_limit(8);
        let (status, _) = run(
            generator.create_one_route(),
            json_request(r#"{"name":"far too long"}"#, None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
