//! PostgreSQL implementation of the record repository.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;

use crate::domain::entities::model::DEFAULT_PK_FIELD;
use crate::domain::entities::{ModelKey, NewRecord, Record, RecordPatch, RecordQuery};
use crate::domain::repositories::RecordRepository;
use crate::error::AppError;

/// PostgreSQL repository over the single `admin_records` table.
///
/// Field values are stored in a JSONB document. A base-only listing
/// projects that document onto the requested keys in SQL, so subtype
/// fields never leave the database.
pub struct PgRecordRepository {
    pool: Arc<PgPool>,
}

impl PgRecordRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Keys that are not integers can never match a `BIGSERIAL` id.
fn parse_pk(pk: &str) -> Option<i64> {
    pk.parse().ok()
}

fn parse_ctype(raw: &str) -> Result<ModelKey, AppError> {
    raw.parse().map_err(|_| {
        AppError::internal("Malformed discriminator in storage", json!({"value": raw}))
    })
}

fn row_to_record(row: &PgRow) -> Result<Record, AppError> {
    let id: i64 = row.try_get("id")?;
    let ctype: String = row.try_get("polymorphic_ctype")?;
    let data: Value = row.try_get("data")?;

    let mut values = match data {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    values.insert(DEFAULT_PK_FIELD.to_string(), Value::from(id));

    Ok(Record::new(id.to_string(), parse_ctype(&ctype)?, values))
}

fn without_pk(mut values: Map<String, Value>) -> Value {
    values.remove(DEFAULT_PK_FIELD);
    Value::Object(values)
}

#[async_trait]
impl RecordRepository for PgRecordRepository {
    async fn fetch_discriminator(
        &self,
        base: &ModelKey,
        pk: &str,
    ) -> Result<Option<ModelKey>, AppError> {
        let Some(id) = parse_pk(pk) else {
            return Ok(None);
        };

        let ctype: Option<String> = sqlx::query_scalar(
            r#"
            SELECT polymorphic_ctype
            FROM admin_records
            WHERE base_type = $1 AND id = $2
            "#,
        )
        .bind(base.to_string())
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        ctype.as_deref().map(parse_ctype).transpose()
    }

    async fn query(&self, query: &RecordQuery) -> Result<Vec<Record>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id,
                   polymorphic_ctype,
                   CASE WHEN $2 THEN data
                        ELSE (SELECT COALESCE(jsonb_object_agg(key, value), '{}'::jsonb)
                              FROM jsonb_each(data)
                              WHERE key = ANY($3))
                   END AS data
            FROM admin_records
            WHERE base_type = $1
              AND ($4::text IS NULL OR polymorphic_ctype = $4)
            ORDER BY id
            "#,
        )
        .bind(query.base.to_string())
        .bind(query.polymorphic)
        .bind(&query.base_fields)
        .bind(query.ctype.as_ref().map(ToString::to_string))
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(row_to_record).collect()
    }

    async fn get(&self, base: &ModelKey, pk: &str) -> Result<Option<Record>, AppError> {
        let Some(id) = parse_pk(pk) else {
            return Ok(None);
        };

        let row = sqlx::query(
            r#"
            SELECT id, polymorphic_ctype, data
            FROM admin_records
            WHERE base_type = $1 AND id = $2
            "#,
        )
        .bind(base.to_string())
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn create(&self, new_record: NewRecord) -> Result<Record, AppError> {
        let row = sqlx::query(
            r#"
            INSERT INTO admin_records (base_type, polymorphic_ctype, data)
            VALUES ($1, $2, $3)
            RETURNING id, polymorphic_ctype, data
            "#,
        )
        .bind(new_record.base.to_string())
        .bind(new_record.ctype.to_string())
        .bind(without_pk(new_record.values))
        .fetch_one(self.pool.as_ref())
        .await?;

        row_to_record(&row)
    }

    async fn update(
        &self,
        base: &ModelKey,
        pk: &str,
        patch: RecordPatch,
    ) -> Result<Record, AppError> {
        let unknown = || AppError::UnknownRecord {
            base: base.clone(),
            pk: pk.to_string(),
        };
        let id = parse_pk(pk).ok_or_else(unknown)?;

        // polymorphic_ctype is never written after insert.
        let row = sqlx::query(
            r#"
            UPDATE admin_records
            SET data = data || $3
            WHERE base_type = $1 AND id = $2
            RETURNING id, polymorphic_ctype, data
            "#,
        )
        .bind(base.to_string())
        .bind(id)
        .bind(without_pk(patch.values))
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => row_to_record(&row),
            None => Err(unknown()),
        }
    }

    async fn delete(&self, base: &ModelKey, pk: &str) -> Result<bool, AppError> {
        let Some(id) = parse_pk(pk) else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM admin_records WHERE base_type = $1 AND id = $2")
            .bind(base.to_string())
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
