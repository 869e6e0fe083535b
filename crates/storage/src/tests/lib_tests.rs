use super::*;

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn missing_collection_reads_as_none() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert!(storage.read("clients").await.expect("read").is_none());
    let decoded: Option<Vec<serde_json::Value>> =
        read_collection(&storage, "clients").await.expect("load");
    assert!(decoded.is_none());
}

#[tokio::test]
async fn write_replaces_whole_collection() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.write("clients", "[1,2,3]").await.expect("first write");
    storage.write("clients", "[4]").await.expect("second write");

    assert_eq!(
        storage.read("clients").await.expect("read").as_deref(),
        Some("[4]")
    );
    assert_eq!(storage.names().await.expect("names"), vec!["clients"]);
}

#[tokio::test]
async fn remove_reports_whether_anything_was_deleted() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.write("orders", "[]").await.expect("write");

    assert!(storage.remove("orders").await.expect("remove"));
    assert!(!storage.remove("orders").await.expect("second remove"));
    assert!(storage.read("orders").await.expect("read").is_none());
}

#[tokio::test]
async fn typed_helpers_round_trip_records() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let records = vec![
        serde_json::json!({"id": "1", "name": "Client 1"}),
        serde_json::json!({"id": "2", "name": "Client 2"}),
    ];
    write_collection(&storage, "clients", &records)
        .await
        .expect("save");

    let loaded: Vec<serde_json::Value> = read_collection(&storage, "clients")
        .await
        .expect("load")
        .expect("present");
    assert_eq!(loaded, records);
}

#[tokio::test]
async fn corrupt_payload_surfaces_as_error() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.write("products", "{not json").await.expect("write");
    let err = read_collection::<serde_json::Value, _>(&storage, "products")
        .await
        .expect_err("corrupt payload");
    assert!(err.to_string().contains("products"));
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("admin_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn memory_urls_have_no_parent_directory() {
    assert!(database_file("sqlite::memory:").is_none());
    assert!(database_file("sqlite://file:shared?mode=memory&cache=shared").is_none());
    assert!(database_file("postgres://localhost/admin").is_none());
    assert_eq!(
        database_file("sqlite://./data/admin.db?mode=rwc"),
        Some(Path::new("./data/admin.db"))
    );
    assert_eq!(database_file("sqlite:admin.db"), Some(Path::new("admin.db")));
}
