use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::store::client::StoreError;
use crate::store::filter::{validate_field_name, DocFilter};

/// Operations over one named collection. Every document is returned as a
/// JSON object with the server-assigned `_id` and `createdAt` merged in.
pub struct Collection {
    name: String,
    pool: PgPool,
}

/// Sort/pagination options for [`Collection::find`].
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub newest_first: bool,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl FindOptions {
    pub fn newest_first() -> Self {
        Self { newest_first: true, ..Self::default() }
    }

    /// Zero-based page over newest-first ordering: skip `page * size`,
    /// return at most `size`.
    pub fn page(page: i64, size: i64) -> Self {
        Self {
            newest_first: true,
            skip: Some(page.saturating_mul(size)),
            limit: Some(size),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl Collection {
    pub(crate) fn new(name: impl Into<String>, pool: PgPool) -> Self {
        Self { name: name.into(), pool }
    }

    /// Find documents matching `filter`, honoring sort and pagination.
    pub async fn find(&self, filter: DocFilter, options: FindOptions) -> Result<Vec<Value>, StoreError> {
        let where_sql = filter.to_sql(1)?;

        let mut sql = format!("SELECT id, doc, created_at FROM \"{}\"", self.name);
        if !where_sql.clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql.clause);
        }
        if options.newest_first {
            sql.push_str(" ORDER BY created_at DESC");
        }
        if let Some(limit) = options.limit {
            sql.push_str(&format!(" LIMIT {}", limit.max(0)));
        }
        if let Some(skip) = options.skip {
            sql.push_str(&format!(" OFFSET {}", skip.max(0)));
        }

        let rows = bind_all(sqlx::query(&sql), &where_sql.params)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_doc).collect()
    }

    /// Fetch one document by its server-assigned id.
    pub async fn find_one_by_id(&self, id: Uuid) -> Result<Option<Value>, StoreError> {
        let sql = format!("SELECT id, doc, created_at FROM \"{}\" WHERE id = $1", self.name);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_doc).transpose()
    }

    /// Insert one document under a fresh server-assigned id.
    pub async fn insert_one(&self, doc: Map<String, Value>) -> Result<InsertResult, StoreError> {
        let id = Uuid::new_v4();
        let sql = format!(
            "INSERT INTO \"{}\" (id, doc, created_at) VALUES ($1, $2, now())",
            self.name
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(doc))
            .execute(&self.pool)
            .await?;

        Ok(InsertResult { acknowledged: true, inserted_id: id })
    }

    /// Set the listed fields on the first document matching `filter`. With
    /// `upsert`, a miss inserts a new document seeded from the filter's
    /// equality pairs with the patch applied on top.
    pub async fn update_one(
        &self,
        filter: DocFilter,
        set: Map<String, Value>,
        upsert: bool,
    ) -> Result<UpdateResult, StoreError> {
        // $1 is the patch; filter params follow
        let where_sql = filter.to_sql(2)?;
        let target = if where_sql.clause.is_empty() {
            format!("SELECT id FROM \"{}\" LIMIT 1", self.name)
        } else {
            format!("SELECT id FROM \"{}\" WHERE {} LIMIT 1", self.name, where_sql.clause)
        };
        let sql = format!("UPDATE \"{}\" SET doc = doc || $1 WHERE id = ({})", self.name, target);

        let patch = Value::Object(set.clone());
        let affected = bind_all(sqlx::query(&sql).bind(&patch), &where_sql.params)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected > 0 || !upsert {
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: affected,
                modified_count: affected,
                upserted_id: None,
            });
        }

        // Nothing matched: insert the filter's equality pairs with the
        // patch overlaid, keeping a caller-addressed id when one was given
        let mut new_doc = Map::new();
        for (field, value) in filter.eq_pairs() {
            new_doc.insert(field, value);
        }
        for (field, value) in set {
            new_doc.insert(field, value);
        }

        let id = filter.id_value().unwrap_or_else(Uuid::new_v4);
        let insert_sql = format!(
            "INSERT INTO \"{}\" (id, doc, created_at) VALUES ($1, $2, now())",
            self.name
        );
        sqlx::query(&insert_sql)
            .bind(id)
            .bind(Value::Object(new_doc))
            .execute(&self.pool)
            .await?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_id: Some(id),
        })
    }

    /// Delete the first document matching `filter`.
    pub async fn delete_one(&self, filter: DocFilter) -> Result<DeleteResult, StoreError> {
        let where_sql = filter.to_sql(1)?;
        let target = if where_sql.clause.is_empty() {
            format!("SELECT id FROM \"{}\" LIMIT 1", self.name)
        } else {
            format!("SELECT id FROM \"{}\" WHERE {} LIMIT 1", self.name, where_sql.clause)
        };
        let sql = format!("DELETE FROM \"{}\" WHERE id = ({})", self.name, target);

        let affected = bind_all(sqlx::query(&sql), &where_sql.params)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(DeleteResult { acknowledged: true, deleted_count: affected })
    }

    /// Count documents matching `filter`.
    pub async fn count(&self, filter: DocFilter) -> Result<i64, StoreError> {
        let where_sql = filter.to_sql(1)?;
        let sql = if where_sql.clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.name, where_sql.clause)
        };

        let row = bind_all(sqlx::query(&sql), &where_sql.params)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    /// Aggregation used by the featured-post routes: add the character
    /// length of a long-form text field as a computed `length` field and
    /// return the whole collection sorted by it, longest first.
    pub async fn rank_by_text_length(
        &self,
        filter: DocFilter,
        field: &str,
    ) -> Result<Vec<Value>, StoreError> {
        validate_field_name(field)?;
        let where_sql = filter.to_sql(1)?;

        let mut sql = format!(
            "SELECT id, doc, created_at, char_length(coalesce(doc->>'{}', '')) AS length FROM \"{}\"",
            field, self.name
        );
        if !where_sql.clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql.clause);
        }
        sql.push_str(" ORDER BY length DESC");

        let rows = bind_all(sqlx::query(&sql), &where_sql.params)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let mut doc = row_to_doc(row)?;
                let length: i32 = row.try_get("length")?;
                if let Value::Object(map) = &mut doc {
                    map.insert("length".to_string(), json!(length));
                }
                Ok(doc)
            })
            .collect()
    }
}

/// Merge the id and creation instant into the stored document.
fn row_to_doc(row: &PgRow) -> Result<Value, StoreError> {
    let id: Uuid = row.try_get("id")?;
    let doc: Value = row.try_get("doc")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    let mut map = match doc {
        Value::Object(map) => map,
        other => {
            return Err(StoreError::QueryError(format!(
                "expected JSON object document, got {}",
                other
            )))
        }
    };
    map.insert("_id".to_string(), json!(id.to_string()));
    map.insert("createdAt".to_string(), json!(created_at.to_rfc3339()));
    Ok(Value::Object(map))
}

fn bind_all<'q>(
    mut q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    params: &'q [String],
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    for p in params {
        q = q.bind(p);
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_options_compute_skip_from_zero_based_page() {
        let options = FindOptions::page(1, 10);
        assert_eq!(options.skip, Some(10));
        assert_eq!(options.limit, Some(10));
        assert!(options.newest_first);
    }

    #[test]
    fn first_page_starts_at_zero() {
        let options = FindOptions::page(0, 25);
        assert_eq!(options.skip, Some(0));
        assert_eq!(options.limit, Some(25));
    }

    #[test]
    fn default_options_neither_sort_nor_paginate() {
        let options = FindOptions::default();
        assert!(!options.newest_first);
        assert!(options.skip.is_none());
        assert!(options.limit.is_none());
    }
}
