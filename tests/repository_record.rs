use polymorphic_admin::domain::entities::{ModelKey, NewRecord, RecordPatch, RecordQuery};
use polymorphic_admin::domain::repositories::RecordRepository;
use polymorphic_admin::error::AppError;
use polymorphic_admin::infrastructure::persistence::PgRecordRepository;
use serde_json::{Map, Value, json};
use sqlx::PgPool;
use std::sync::Arc;

fn vehicle() -> ModelKey {
    ModelKey::new("shop", "vehicle")
}

fn values(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn new_record(model: &str, value: Value) -> NewRecord {
    NewRecord {
        base: vehicle(),
        ctype: ModelKey::new("shop", model),
        values: values(value),
    }
}

async fn seeded(pool: PgPool) -> PgRecordRepository {
    let repo = PgRecordRepository::new(Arc::new(pool));
    repo.create(new_record("car", json!({"name": "Beetle", "doors": 2})))
        .await
        .unwrap();
    repo.create(new_record("boat", json!({"name": "Ferry", "hull_length": 30.5})))
        .await
        .unwrap();
    repo
}

fn base_query(polymorphic: bool) -> RecordQuery {
    RecordQuery {
        base: vehicle(),
        base_fields: vec!["id".to_string(), "name".to_string()],
        polymorphic,
        ctype: None,
    }
}

#[sqlx::test]
async fn test_create_keeps_discriminator(pool: PgPool) {
    let repo = PgRecordRepository::new(Arc::new(pool));

    let record = repo
        .create(new_record("car", json!({"name": "Beetle", "doors": 2})))
        .await
        .unwrap();

    assert_eq!(record.ctype, ModelKey::new("shop", "car"));
    assert_eq!(record.values["doors"], json!(2));
    assert_eq!(record.values["id"], json!(record.pk.parse::<i64>().unwrap()));

    let ctype = repo.fetch_discriminator(&vehicle(), &record.pk).await.unwrap();
    assert_eq!(ctype, Some(ModelKey::new("shop", "car")));
}

#[sqlx::test]
async fn test_fetch_discriminator_missing(pool: PgPool) {
    let repo = PgRecordRepository::new(Arc::new(pool));

    assert_eq!(repo.fetch_discriminator(&vehicle(), "42").await.unwrap(), None);
    assert_eq!(repo.fetch_discriminator(&vehicle(), "abc").await.unwrap(), None);
}

#[sqlx::test]
async fn test_base_only_query_projects_base_fields(pool: PgPool) {
    let repo = seeded(pool).await;

    let records = repo.query(&base_query(false)).await.unwrap();

    assert_eq!(records.len(), 2);
    for record in &records {
        let mut keys: Vec<_> = record.values.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["id", "name"]);
    }
    assert_eq!(records[0].ctype, ModelKey::new("shop", "car"));
    assert_eq!(records[1].ctype, ModelKey::new("shop", "boat"));
}

#[sqlx::test]
async fn test_polymorphic_query_returns_concrete_fields(pool: PgPool) {
    let repo = seeded(pool).await;

    let records = repo.query(&base_query(true)).await.unwrap();

    assert_eq!(records[0].values["doors"], json!(2));
    assert_eq!(records[1].values["hull_length"], json!(30.5));
}

#[sqlx::test]
async fn test_query_filters_by_type(pool: PgPool) {
    let repo = seeded(pool).await;
    let query = RecordQuery {
        ctype: Some(ModelKey::new("shop", "boat")),
        ..base_query(false)
    };

    let records = repo.query(&query).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].values["name"], json!("Ferry"));
}

#[sqlx::test]
async fn test_update_merges_values(pool: PgPool) {
    let repo = seeded(pool).await;
    let car = repo.query(&base_query(false)).await.unwrap().remove(0);

    let patch = RecordPatch {
        values: values(json!({"name": "Golf", "id": 999})),
    };
    let updated = repo.update(&vehicle(), &car.pk, patch).await.unwrap();

    assert_eq!(updated.pk, car.pk);
    assert_eq!(updated.ctype, ModelKey::new("shop", "car"));
    assert_eq!(updated.values["name"], json!("Golf"));
    assert_eq!(updated.values["doors"], json!(2));
}

#[sqlx::test]
async fn test_update_missing_record(pool: PgPool) {
    let repo = PgRecordRepository::new(Arc::new(pool));

    let result = repo.update(&vehicle(), "42", RecordPatch::default()).await;

    assert!(matches!(result, Err(AppError::UnknownRecord { .. })));
}

#[sqlx::test]
async fn test_delete(pool: PgPool) {
    let repo = seeded(pool).await;
    let car = repo.query(&base_query(false)).await.unwrap().remove(0);

    assert!(repo.delete(&vehicle(), &car.pk).await.unwrap());
    assert!(!repo.delete(&vehicle(), &car.pk).await.unwrap());
    assert!(repo.get(&vehicle(), &car.pk).await.unwrap().is_none());
}

#[sqlx::test]
async fn test_records_are_scoped_by_base(pool: PgPool) {
    let repo = seeded(pool).await;
    let other = ModelKey::new("blog", "post");

    let query = RecordQuery {
        base: other.clone(),
        ..base_query(false)
    };
    assert!(repo.query(&query).await.unwrap().is_empty());
    assert_eq!(repo.fetch_discriminator(&other, "1").await.unwrap(), None);
}
