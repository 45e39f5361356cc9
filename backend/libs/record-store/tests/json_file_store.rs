/// Integration tests for the JSON-file backed record store
use record_store::{Record, RecordStore, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Bookmark {
    id: Uuid,
    owner_id: Uuid,
    url: String,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Record for Bookmark {
    fn id(&self) -> Uuid {
        self.id
    }
}

fn bookmark(url: &str) -> Bookmark {
    Bookmark {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        url: url.to_string(),
        labels: vec![],
        extra: Map::new(),
    }
}

async fn open_store() -> (TempDir, PathBuf, RecordStore<Bookmark>) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("bookmarks.json");
    let store = RecordStore::open_json("bookmarks", &path)
        .await
        .expect("open store");
    (dir, path, store)
}

#[tokio::test]
async fn open_initializes_empty_array_file() {
    let (_dir, path, store) = open_store().await;

    let contents = std::fs::read_to_string(&path).expect("collection file exists");
    assert_eq!(contents.trim(), "[]");
    assert!(store.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn created_record_is_found_by_id() {
    let (_dir, _path, store) = open_store().await;
    let original = bookmark("https://example.com");

    let created = store.create(original.clone()).await.unwrap();
    assert_eq!(created, original);

    let found = store.find_by_id(created.id).await.unwrap();
    assert_eq!(found, Some(original));
}

#[tokio::test]
async fn records_survive_reopening_the_file() {
    let (_dir, path, store) = open_store().await;
    let first = store.create(bookmark("https://a.example")).await.unwrap();
    let second = store.create(bookmark("https://b.example")).await.unwrap();

    let reopened: RecordStore<Bookmark> = RecordStore::open_json("bookmarks", &path)
        .await
        .unwrap();
    let all = reopened.find_all().await.unwrap();

    assert_eq!(all, vec![first, second]);
}

#[tokio::test]
async fn persisted_file_uses_camel_case_pretty_json() {
    let (_dir, path, store) = open_store().await;
    store.create(bookmark("https://example.com")).await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("\"ownerId\""));
    assert!(contents.starts_with("[\n  {"));
}

#[tokio::test]
async fn find_by_field_matches_serialized_value() {
    let (_dir, _path, store) = open_store().await;
    store.create(bookmark("https://a.example")).await.unwrap();
    let wanted = store.create(bookmark("https://b.example")).await.unwrap();

    let found = store.find_by_field("url", "https://b.example").await.unwrap();
    assert_eq!(found.map(|b| b.id), Some(wanted.id));

    let by_owner = store
        .find_by_field("ownerId", &wanted.owner_id)
        .await
        .unwrap();
    assert_eq!(by_owner.map(|b| b.id), Some(wanted.id));

    let missing = store.find_by_field("url", "https://c.example").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn update_merges_patch_and_is_idempotent() {
    let (_dir, _path, store) = open_store().await;
    let created = store.create(bookmark("https://example.com")).await.unwrap();
    let patch = json!({ "labels": ["rust", "async"] });

    let once = store
        .update(created.id, patch.clone())
        .await
        .unwrap()
        .expect("record exists");
    let twice = store
        .update(created.id, patch)
        .await
        .unwrap()
        .expect("record exists");

    assert_eq!(once, twice);
    assert_eq!(once.url, "https://example.com");
    assert_eq!(once.labels, vec!["rust".to_string(), "async".to_string()]);
    assert_eq!(store.find_by_id(created.id).await.unwrap(), Some(twice));
}

#[tokio::test]
async fn update_of_unknown_id_returns_none() {
    let (_dir, _path, store) = open_store().await;
    store.create(bookmark("https://example.com")).await.unwrap();

    let result = store
        .update(Uuid::new_v4(), json!({ "url": "https://other.example" }))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn update_checked_aborts_without_writing() {
    let (_dir, _path, store) = open_store().await;
    let created = store.create(bookmark("https://example.com")).await.unwrap();

    let result: Result<Option<Bookmark>, StoreError> = store
        .update_checked(created.id, json!({ "url": "https://taken.example" }), |_| {
            Err(StoreError::InvalidPatch("url taken".to_string()))
        })
        .await;

    assert!(result.is_err());
    let stored = store.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.url, "https://example.com");
}

#[tokio::test]
async fn delete_removes_record() {
    let (_dir, _path, store) = open_store().await;
    let keep = store.create(bookmark("https://keep.example")).await.unwrap();
    let drop = store.create(bookmark("https://drop.example")).await.unwrap();

    assert!(store.delete(drop.id).await.unwrap());
    assert!(store.find_by_id(drop.id).await.unwrap().is_none());
    assert!(!store.delete(drop.id).await.unwrap());
    assert_eq!(store.find_all().await.unwrap(), vec![keep]);
}

#[tokio::test]
async fn missing_file_reads_as_empty_collection() {
    let dir = tempfile::tempdir().unwrap();
    let store: RecordStore<Bookmark> =
        RecordStore::new(record_store::JsonFileBackend::new(
            "bookmarks",
            dir.path().join("never-written.json"),
        ));

    assert!(store.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn unparsable_file_is_reported_as_corrupt() {
    let (_dir, path, store) = open_store().await;
    std::fs::write(&path, "{ this is not a collection").unwrap();

    let result = store.find_all().await;
    assert!(matches!(result, Err(StoreError::Corrupt { .. })));

    // Mutations refuse to overwrite a corrupt collection
    let create = store.create(bookmark("https://example.com")).await;
    assert!(matches!(create, Err(StoreError::Corrupt { .. })));
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "{ this is not a collection");
}

#[tokio::test]
async fn concurrent_creates_are_not_lost() {
    let (_dir, _path, store) = open_store().await;

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .create(bookmark(&format!("https://{i}.example")))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.find_all().await.unwrap().len(), 16);
}

#[tokio::test]
async fn mutate_applies_multi_record_change_in_one_write() {
    let (_dir, _path, store) = open_store().await;
    let a = store.create(bookmark("https://a.example")).await.unwrap();
    let b = store.create(bookmark("https://b.example")).await.unwrap();

    let touched: usize = store
        .mutate(|records| {
            for record in records.iter_mut() {
                record.labels.push("shared".to_string());
            }
            Ok::<_, StoreError>(records.len())
        })
        .await
        .unwrap();

    assert_eq!(touched, 2);
    for id in [a.id, b.id] {
        let record = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(record.labels, vec!["shared".to_string()]);
    }
}

#[tokio::test]
async fn update_keeps_fields_the_record_does_not_declare() {
    let (_dir, path, store) = open_store().await;
    let id = Uuid::new_v4();
    let seeded = json!([{
        "id": id,
        "ownerId": Uuid::new_v4(),
        "url": "https://a.example",
        "pinned": true
    }]);
    std::fs::write(&path, seeded.to_string()).unwrap();

    let updated = store
        .update(id, json!({ "url": "https://b.example" }))
        .await
        .unwrap()
        .expect("record exists");
    assert_eq!(updated.url, "https://b.example");

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk[0]["pinned"], json!(true));
    assert_eq!(on_disk[0]["url"], "https://b.example");

    let unpinned = store
        .update(id, json!({ "pinned": false }))
        .await
        .unwrap()
        .expect("record exists");
    assert_eq!(unpinned.extra.get("pinned"), Some(&json!(false)));
}

#[tokio::test]
async fn update_with_unknown_field_is_rejected_without_writing() {
    let (_dir, path, store) = open_store().await;
    let created = store.create(bookmark("https://a.example")).await.unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let result = store
        .update(created.id, json!({ "url": "https://b.example", "nickname": "x" }))
        .await;

    assert!(matches!(result, Err(StoreError::InvalidPatch(_))));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}
