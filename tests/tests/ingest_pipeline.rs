use application::ingest_service::IngestService;
use domain::models::VectorRecord;
use domain::ports::VectorStore;
use domain::profile::{Domain, IndexMode};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tests::fakes::{embed_text, DeterministicEmbeddings, InMemoryStore, PoisonedEmbeddings};

const DIMENSION: usize = 8;

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn health_service(store: Arc<InMemoryStore>, mode: IndexMode) -> IngestService {
    IngestService::new(
        store,
        Arc::new(DeterministicEmbeddings),
        Domain::Health,
        DIMENSION,
        mode,
        Duration::ZERO,
    )
}

#[tokio::test]
async fn valid_and_rejected_rows_are_counted_separately() {
    let store = Arc::new(InMemoryStore::new());
    let service = health_service(Arc::clone(&store), IndexMode::Rebuild);

    let file = write_csv("content,category\nDrink water daily.,\nWalk 30 minutes.,fitness\n");
    let report = service.ingest(file.path()).await.unwrap();

    assert_eq!(report.seen, 2);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.stored, 1);
    assert_eq!(report.failed, 0);

    let records = store.records("health-data");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "doc_1");
    assert_eq!(records[0].metadata.get("category").unwrap(), "fitness");
    assert_eq!(records[0].metadata.get("text").unwrap(), "Walk 30 minutes.");
}

#[tokio::test]
async fn zero_valid_documents_aborts_before_touching_the_store() {
    let store = Arc::new(InMemoryStore::new());
    let service = health_service(Arc::clone(&store), IndexMode::Rebuild);

    let file = write_csv("content,category\n,\n  ,fitness\n");
    let err = service.ingest(file.path()).await.unwrap_err();
    assert!(err.to_string().contains("no valid documents"));

    // No index reset happened.
    assert_eq!(store.count("health-data"), 0);
    assert!(store.records("health-data").is_empty());
}

#[tokio::test]
async fn missing_source_file_is_an_error() {
    let store = Arc::new(InMemoryStore::new());
    let service = health_service(store, IndexMode::Rebuild);
    assert!(service
        .ingest(std::path::Path::new("does_not_exist.csv"))
        .await
        .is_err());
}

#[tokio::test]
async fn batch_upsert_failure_falls_back_to_per_document_path() {
    let store = Arc::new(InMemoryStore::with_bulk_failure());
    let service = health_service(Arc::clone(&store), IndexMode::Rebuild);

    let mut csv = String::from("content,category\n");
    for i in 0..10 {
        csv.push_str(&format!("Health tip number {i}.,fitness\n"));
    }
    let file = write_csv(&csv);
    let report = service.ingest(file.path()).await.unwrap();

    // The bulk call failed, but every document made it in one at a time.
    assert_eq!(report.stored, 10);
    assert_eq!(report.failed, 0);
    assert_eq!(store.count("health-data"), 10);
}

#[tokio::test]
async fn one_corrupt_document_among_ten_fails_alone() {
    let store = Arc::new(InMemoryStore::with_bulk_failure());
    let service = IngestService::new(
        Arc::clone(&store) as Arc<dyn VectorStore>,
        Arc::new(PoisonedEmbeddings::new("tip number 6")),
        Domain::Health,
        DIMENSION,
        IndexMode::Rebuild,
        Duration::ZERO,
    );

    let mut csv = String::from("content,category\n");
    for i in 0..10 {
        csv.push_str(&format!("Health tip number {i}.,fitness\n"));
    }
    let file = write_csv(&csv);
    let report = service.ingest(file.path()).await.unwrap();

    assert_eq!(report.seen, 10);
    assert_eq!(report.stored, 9);
    assert_eq!(report.failed, 1);

    // All-or-skip: never more records than validated documents.
    assert!(store.count("health-data") <= report.seen - report.rejected);
    assert_eq!(store.count("health-data"), 9);
}

#[tokio::test]
async fn rebuild_mode_discards_previous_records() {
    let store = Arc::new(InMemoryStore::new());
    store.seed(
        "health-data",
        vec![VectorRecord {
            id: "stale_1".to_string(),
            values: embed_text("Old advice."),
            metadata: [
                ("category".to_string(), "fitness".to_string()),
                ("text".to_string(), "Old advice.".to_string()),
            ]
            .into(),
        }],
    );

    let service = health_service(Arc::clone(&store), IndexMode::Rebuild);
    let file = write_csv("content,category\nNew advice.,fitness\n");
    service.ingest(file.path()).await.unwrap();

    let records = store.records("health-data");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].metadata.get("text").unwrap(), "New advice.");
}

#[tokio::test]
async fn append_mode_keeps_previous_records() {
    let store = Arc::new(InMemoryStore::new());
    store.seed(
        "health-data",
        vec![VectorRecord {
            id: "old_1".to_string(),
            values: embed_text("Old advice."),
            metadata: [
                ("category".to_string(), "fitness".to_string()),
                ("text".to_string(), "Old advice.".to_string()),
            ]
            .into(),
        }],
    );

    let service = health_service(Arc::clone(&store), IndexMode::Append);
    let file = write_csv("content,category\nNew advice.,fitness\n");
    service.ingest(file.path()).await.unwrap();

    assert_eq!(store.count("health-data"), 2);
}

#[tokio::test]
async fn order_rows_with_bad_metadata_are_skipped() {
    let store = Arc::new(InMemoryStore::new());
    let service = IngestService::new(
        Arc::clone(&store) as Arc<dyn VectorStore>,
        Arc::new(DeterministicEmbeddings),
        Domain::Order,
        DIMENSION,
        IndexMode::Rebuild,
        Duration::ZERO,
    );

    let file = write_csv(concat!(
        "text,metadata\n",
        "Order #1234 shipped via UPS.,\"{\"\"type\"\": \"\"order\"\"}\"\n",
        "Return window is 30 days.,\"{\"\"type\"\": \"\"return\"\"}\"\n",
        "Broken row.,not-a-mapping\n",
    ));
    let report = service.ingest(file.path()).await.unwrap();

    assert_eq!(report.seen, 3);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.stored, 2);

    let records = store.records("support-data");
    assert!(records.iter().any(|r| r.metadata.get("type").map(String::as_str) == Some("order")));
    assert!(records.iter().any(|r| r.metadata.get("type").map(String::as_str) == Some("return")));
}

#[tokio::test]
async fn ids_are_sequential_and_one_based() {
    let store = Arc::new(InMemoryStore::new());
    let service = health_service(Arc::clone(&store), IndexMode::Rebuild);

    let file = write_csv("content,category\nTip one.,fitness\nTip two.,sleep\nTip three.,nutrition\n");
    service.ingest(file.path()).await.unwrap();

    let mut ids: Vec<String> = store
        .records("health-data")
        .into_iter()
        .map(|r| r.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["doc_1", "doc_2", "doc_3"]);
}
