//! In-process collection for tests, demos and single-node deployments.

use crate::error::AppError;
use crate::service::{matches_filters, Collection};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

/// Fields the store owns; patches never overwrite them.
const RESERVED_FIELDS: &[&str] = &["id", "created_at"];

pub struct MemoryCollection {
    name: String,
    docs: RwLock<Vec<Value>>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

fn doc_id(doc: &Value) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

#[async_trait]
impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_all(&self, filters: &[(String, String)]) -> Result<Vec<Value>, AppError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|d| matches_filters(d, filters)).cloned().collect())
    }

    async fn find_one(&self, id: &str) -> Result<Option<Value>, AppError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|d| doc_id(d) == Some(id)).cloned())
    }

    async fn create_one(&self, mut doc: Map<String, Value>) -> Result<Value, AppError> {
        let id = match doc.get("id") {
            None => uuid::Uuid::new_v4().to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(_) => return Err(AppError::BadRequest("'id' must be a non-empty string".into())),
        };
        let now = Utc::now().to_rfc3339();
        doc.insert("id".into(), Value::String(id.clone()));
        doc.insert("created_at".into(), Value::String(now.clone()));
        doc.insert("updated_at".into(), Value::String(now));
        let doc = Value::Object(doc);

        let mut docs = self.docs.write().await;
        if docs.iter().any(|d| doc_id(d) == Some(id.as_str())) {
            return Err(AppError::Conflict(format!("{} '{}' already exists", self.name, id)));
        }
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn update_one(&self, id: &str, patch: Map<String, Value>) -> Result<Option<Value>, AppError> {
        let mut docs = self.docs.write().await;
        let Some(Value::Object(stored)) = docs.iter_mut().find(|d| doc_id(d) == Some(id)) else {
            return Ok(None);
        };
        for (key, value) in patch {
            if !RESERVED_FIELDS.contains(&key.as_str()) {
                stored.insert(key, value);
            }
        }
        stored.insert("updated_at".into(), Value::String(Utc::now().to_rfc3339()));
        Ok(Some(Value::Object(stored.clone())))
    }
}
