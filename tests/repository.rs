use serde_json::{json, Value};
use storefront::table::product::{NAME, PRICE, STOCK};
use storefront::table::{ORDER, PRODUCT};
use storefront::{AppError, ConstraintKind, MemoryStore, Record, Repository, RepositoryProvider};

fn rec(v: Value) -> Record {
    v.as_object().cloned().unwrap_or_default()
}

async fn seed_products(store: &MemoryStore, n: i64) {
    let mut repo = store.repository(&PRODUCT);
    for i in 0..n {
        repo.insert(&rec(json!({
            "name": format!("product {}", i),
            "price": (i * 50).to_string(),
            "stock": i * 3,
        })))
        .await
        .unwrap();
    }
    repo.commit().await.unwrap();
}

#[tokio::test]
async fn insert_assigns_ids_and_defaults() {
    let store = MemoryStore::new();
    let mut repo = store.repository(&PRODUCT);
    let row = repo
        .insert(&rec(json!({"name": "Widget", "price": "9.5"})))
        .await
        .unwrap();
    assert_eq!(row["id"], json!(1));
    assert_eq!(row["price"], json!("9.50"));
    assert_eq!(row["stock"], json!(0));
    assert_eq!(row["description"], Value::Null);
    assert!(row["created_at"].is_string());

    let second = repo.insert(&rec(json!({"name": "Gadget", "price": 1}))).await.unwrap();
    assert_eq!(second["id"], json!(2));
}

#[tokio::test]
async fn filtered_page_and_count_agree() {
    let store = MemoryStore::new();
    seed_products(&store, 40).await;

    let mut repo = store.repository(&PRODUCT);
    let select = PRODUCT.select();
    let filters = [PRICE.lt("1500"), STOCK.gt(45)];
    let rows = repo
        .paginate(&select, &filters, &[PRICE.asc()], 0, 100)
        .await
        .unwrap();
    let count = repo.get_count(&select, &filters).await.unwrap();

    // price = 50 * i, stock = 3 * i: i in 16..=29
    assert_eq!(count, 14);
    assert_eq!(rows.len(), 14);
    assert_eq!(rows[0]["name"], json!("product 16"));
    assert_eq!(rows[13]["name"], json!("product 29"));
}

#[tokio::test]
async fn page_never_exceeds_count() {
    let store = MemoryStore::new();
    seed_products(&store, 25).await;
    let mut repo = store.repository(&PRODUCT);
    let select = PRODUCT.select();
    let count = repo.get_count(&select, &[]).await.unwrap();
    assert_eq!(count, 25);

    for size in [1u64, 10, 25, 200] {
        let rows = repo.paginate(&select, &[], &[], 0, size).await.unwrap();
        assert!(rows.len() as u64 <= count);
        if size >= count {
            assert_eq!(rows.len() as u64, count);
        }
    }
    let beyond = repo.paginate(&select, &[], &[], 200, 20).await.unwrap();
    assert!(beyond.is_empty());
}

#[tokio::test]
async fn base_select_predicates_apply() {
    let store = MemoryStore::new();
    seed_products(&store, 10).await;
    let mut repo = store.repository(&PRODUCT);
    let select = PRODUCT.select().filter(NAME.contains("PRODUCT 1"));
    assert_eq!(repo.get_count(&select, &[]).await.unwrap(), 1);
    assert_eq!(repo.get_count(&select, &[STOCK.gt(100)]).await.unwrap(), 0);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let store = MemoryStore::new();
    seed_products(&store, 3).await;

    let mut repo = store.repository(&PRODUCT);
    repo.delete(2).await.unwrap();
    repo.commit().await.unwrap();
    assert_eq!(store.len(&PRODUCT), 2);

    let mut repo = store.repository(&PRODUCT);
    assert!(repo.get_one(2).await.unwrap().is_none());
    repo.delete(2).await.unwrap();
    repo.delete(999).await.unwrap();
    repo.commit().await.unwrap();
    assert_eq!(store.len(&PRODUCT), 2);
}

#[tokio::test]
async fn update_of_missing_row_is_none() {
    let store = MemoryStore::new();
    let mut repo = store.repository(&PRODUCT);
    let updated = repo.update(7, &rec(json!({"stock": 1}))).await.unwrap();
    assert!(updated.is_none());
}

#[tokio::test]
async fn null_in_required_column_is_a_constraint_violation() {
    let store = MemoryStore::new();
    let mut repo = store.repository(&PRODUCT);
    let err = repo
        .insert(&rec(json!({"name": "No price", "price": null})))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::ConstraintViolation {
            kind: ConstraintKind::NotNull,
            ..
        }
    ));
}

#[tokio::test]
async fn foreign_columns_are_rejected() {
    let store = MemoryStore::new();
    let mut repo = store.repository(&ORDER);
    let err = repo
        .paginate(&ORDER.select(), &[PRICE.gt(1)], &[], 0, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn interleaved_inserts_keep_both_rows() {
    let store = MemoryStore::new();
    let mut first = store.repository(&PRODUCT);
    assert!(first.get_one(1).await.unwrap().is_none());

    let mut second = store.repository(&PRODUCT);
    let b = second.insert(&rec(json!({"name": "B", "price": 1}))).await.unwrap();
    second.commit().await.unwrap();

    let a = first.insert(&rec(json!({"name": "A", "price": 1}))).await.unwrap();
    first.commit().await.unwrap();

    assert_ne!(a["id"], b["id"]);
    assert_eq!(store.len(&PRODUCT), 2);
    let mut reader = store.repository(&PRODUCT);
    let stored_b = reader.get_one(b["id"].as_i64().unwrap()).await.unwrap().unwrap();
    assert_eq!(stored_b["name"], json!("B"));
    let stored_a = reader.get_one(a["id"].as_i64().unwrap()).await.unwrap().unwrap();
    assert_eq!(stored_a["name"], json!("A"));
}

#[tokio::test]
async fn late_commit_of_missing_delete_keeps_other_rows() {
    let store = MemoryStore::new();
    let mut deleter = store.repository(&PRODUCT);
    deleter.delete(999).await.unwrap();

    let mut writer = store.repository(&PRODUCT);
    writer.insert(&rec(json!({"name": "Kept", "price": 1}))).await.unwrap();
    writer.commit().await.unwrap();
    assert_eq!(store.len(&PRODUCT), 1);

    deleter.commit().await.unwrap();
    assert_eq!(store.len(&PRODUCT), 1);
}

#[tokio::test]
async fn rolled_back_insert_does_not_reuse_its_id() {
    let store = MemoryStore::new();
    let abandoned = {
        let mut repo = store.repository(&PRODUCT);
        repo.insert(&rec(json!({"name": "Gone", "price": 1}))).await.unwrap()["id"].clone()
    };
    let mut repo = store.repository(&PRODUCT);
    let kept = repo.insert(&rec(json!({"name": "Kept", "price": 1}))).await.unwrap();
    repo.commit().await.unwrap();
    assert_ne!(kept["id"], abandoned);
    assert_eq!(store.len(&PRODUCT), 1);
}
