//! PostgreSQL-backed collections. Each collection is one table of JSONB documents in the schema
//! named by `CRUDKIT_SCHEMA` env (default `crudkit`).

use crate::config::validate_collection;
use crate::error::AppError;
use crate::service::Collection;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// Schema for collection tables. From env `CRUDKIT_SCHEMA`, default `crudkit`.
pub fn collection_schema() -> String {
    std::env::var("CRUDKIT_SCHEMA").unwrap_or_else(|_| "crudkit".into())
}

/// Postgres SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

pub struct PgCollection {
    pool: PgPool,
    name: String,
    table: String,
}

impl PgCollection {
    /// Collection `name` stored in `<schema>.<name>`. The name must be a valid collection identifier.
    pub fn new(pool: PgPool, name: impl Into<String>) -> Result<Self, AppError> {
        let name = name.into();
        validate_collection(&name)?;
        let schema = collection_schema();
        validate_collection(&schema)?;
        Ok(Self {
            pool,
            table: format!("{}.{}", schema, name),
            name,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the schema and the collection table if missing.
    pub async fn ensure_table(&self) -> Result<(), AppError> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", collection_schema()))
            .execute(&self.pool)
            .await?;
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                doc JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        tracing::info!(table = %self.table, "collection table ready");
        Ok(())
    }
}

fn map_unique_violation(e: sqlx::Error, what: String) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => AppError::Conflict(what),
        _ => AppError::Db(e),
    }
}

#[async_trait]
impl Collection for PgCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_all(&self, filters: &[(String, String)]) -> Result<Vec<Value>, AppError> {
        let mut sql = format!("SELECT doc FROM {}", self.table);
        for i in 0..filters.len() {
            let field = 2 * i + 1;
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(&format!("doc ->> ${} = ${}", field, field + 1));
        }
        sql.push_str(" ORDER BY created_at, id");
        tracing::debug!(sql = %sql, filters = ?filters, "query");
        let mut query = sqlx::query_as::<_, (Value,)>(&sql);
        for (field, value) in filters {
            query = query.bind(field).bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(doc,)| doc).collect())
    }

    async fn find_one(&self, id: &str) -> Result<Option<Value>, AppError> {
        let sql = format!("SELECT doc FROM {} WHERE id = $1", self.table);
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<(Value,)> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(|(doc,)| doc))
    }

    async fn create_one(&self, mut doc: Map<String, Value>) -> Result<Value, AppError> {
        let id = match doc.get("id") {
            None => uuid::Uuid::new_v4().to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(_) => return Err(AppError::BadRequest("'id' must be a non-empty string".into())),
        };
        let now = chrono::Utc::now();
        doc.insert("id".into(), Value::String(id.clone()));
        doc.insert("created_at".into(), Value::String(now.to_rfc3339()));
        doc.insert("updated_at".into(), Value::String(now.to_rfc3339()));
        let sql = format!(
            "INSERT INTO {} (id, doc, created_at, updated_at) VALUES ($1, $2, $3, $3) RETURNING doc",
            self.table
        );
        tracing::debug!(sql = %sql, id = %id, "query");
        let row: (Value,) = sqlx::query_as(&sql)
            .bind(&id)
            .bind(Value::Object(doc))
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, format!("{} '{}' already exists", self.name, id)))?;
        Ok(row.0)
    }

    async fn update_one(&self, id: &str, mut patch: Map<String, Value>) -> Result<Option<Value>, AppError> {
        patch.remove("id");
        patch.remove("created_at");
        let now = chrono::Utc::now();
        patch.insert("updated_at".into(), Value::String(now.to_rfc3339()));
        let sql = format!(
            "UPDATE {} SET doc = doc || $2, updated_at = $3 WHERE id = $1 RETURNING doc",
            self.table
        );
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<(Value,)> = sqlx::query_as(&sql)
            .bind(id)
            .bind(Value::Object(patch))
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(doc,)| doc))
    }
}

/// Create the database named in `database_url` if it does not exist (connects to `postgres` on the same server).
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await
        .map_err(AppError::Db)?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url.rfind('/').ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name() {
        let (admin, db) = parse_db_name_from_url("postgres://u:p@localhost:5432/shop?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(db, "shop");
        assert!(parse_db_name_from_url("nopath").is_err());
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("shop"), "\"shop\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[tokio::test]
    async fn rejects_bad_collection_names() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/crudkit")
            .unwrap();
        assert!(PgCollection::new(pool.clone(), "items; drop table x").is_err());
        let items = PgCollection::new(pool, "items").unwrap();
        assert!(items.table().ends_with(".items"));
    }
}
