use eframe_diagram::storage::{DiagramStorage, KeyValueStore, MemoryStore};
use eframe_diagram::{Document, StorageError, StoreError};

const DOCUMENTS_KEY: &str = "bpmn-diagrams";
const CURRENT_KEY: &str = "bpmn-current-diagram-id";

fn doc_at(id: &str, name: &str, updated_at: &str) -> Document {
    Document {
        id: id.to_owned(),
        name: name.to_owned(),
        content: format!("<definitions id=\"{}\"/>", id),
        created_at: "2024-01-01T00:00:00.000Z".to_owned(),
        updated_at: updated_at.to_owned(),
    }
}

fn storage() -> DiagramStorage<MemoryStore> {
    DiagramStorage::new(MemoryStore::new())
}

#[test]
fn test_save_then_get_round_trips() {
    let storage = storage();
    let doc = Document::new("Diagram 1", "<definitions/>");
    storage.save(&doc).unwrap();

    assert_eq!(storage.get(&doc.id), Some(doc.clone()));
    assert_eq!(storage.list(), vec![doc]);
    assert!(storage.get("missing").is_none());
}

#[test]
fn test_persisted_shape_uses_camel_case_keys() {
    let storage = storage();
    storage.save(&doc_at("a", "A", "2024-01-02T00:00:00.000Z")).unwrap();

    let raw = storage.store().raw(DOCUMENTS_KEY).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &value.as_array().unwrap()[0];
    for key in ["id", "name", "content", "createdAt", "updatedAt"] {
        assert!(entry.get(key).is_some(), "missing {}", key);
    }
}

#[test]
fn test_save_replaces_existing_id() {
    let storage = storage();
    let doc = doc_at("a", "A", "2024-01-02T00:00:00.000Z");
    storage.save(&doc).unwrap();
    storage.save(&doc.revised("<definitions id=\"b\"/>")).unwrap();

    assert_eq!(storage.len(), 1);
    assert_eq!(storage.get("a").unwrap().content, "<definitions id=\"b\"/>");
}

#[test]
fn test_list_sorted_newest_first_keeping_ties() {
    let storage = storage();
    storage.save(&doc_at("old", "Old", "2024-01-01T00:00:00.000Z")).unwrap();
    storage.save(&doc_at("tie1", "Tie 1", "2024-03-01T00:00:00.000Z")).unwrap();
    storage.save(&doc_at("new", "New", "2024-06-01T00:00:00.000Z")).unwrap();
    storage.save(&doc_at("tie2", "Tie 2", "2024-03-01T00:00:00.000Z")).unwrap();

    let ids: Vec<String> = storage.list().into_iter().map(|doc| doc.id).collect();
    assert_eq!(ids, ["new", "tie1", "tie2", "old"]);
}

#[test]
fn test_unparseable_dates_sort_last() {
    let storage = storage();
    storage.save(&doc_at("bad", "Bad", "yesterday")).unwrap();
    storage.save(&doc_at("good", "Good", "2024-01-01T00:00:00.000Z")).unwrap();

    let ids: Vec<String> = storage.list().into_iter().map(|doc| doc.id).collect();
    assert_eq!(ids, ["good", "bad"]);
}

#[test]
fn test_delete_leaves_other_documents_alone() {
    let storage = storage();
    storage.save(&doc_at("a", "A", "2024-01-01T00:00:00.000Z")).unwrap();
    storage.save(&doc_at("b", "B", "2024-01-02T00:00:00.000Z")).unwrap();

    storage.delete("a").unwrap();
    assert!(storage.get("a").is_none());
    assert_eq!(storage.get("b").unwrap().name, "B");

    // Deleting an unknown id is a no-op
    storage.delete("zzz").unwrap();
    assert_eq!(storage.len(), 1);
}

#[test]
fn test_delete_clears_pointer_only_for_current() {
    let storage = storage();
    storage.save(&doc_at("a", "A", "2024-01-01T00:00:00.000Z")).unwrap();
    storage.save(&doc_at("b", "B", "2024-01-02T00:00:00.000Z")).unwrap();
    storage.set_current_id(Some("a")).unwrap();

    storage.delete("b").unwrap();
    assert_eq!(storage.current_id().as_deref(), Some("a"));

    storage.delete("a").unwrap();
    assert_eq!(storage.current_id(), None);
    assert_eq!(storage.store().raw(CURRENT_KEY), None);
}

#[test]
fn test_current_id_round_trip_and_clear() {
    let storage = storage();
    assert_eq!(storage.current_id(), None);

    storage.set_current_id(Some("x")).unwrap();
    assert_eq!(storage.current_id().as_deref(), Some("x"));

    storage.set_current_id(None).unwrap();
    assert_eq!(storage.current_id(), None);

    storage.set_current_id(Some("")).unwrap();
    assert_eq!(storage.store().raw(CURRENT_KEY), None);
}

#[test]
fn test_malformed_collections_read_as_empty() {
    for raw in ["null", "not json", "", "{\"id\":\"a\"}", "42"] {
        let storage = storage();
        storage.store().set_item(DOCUMENTS_KEY, raw).unwrap();
        assert!(storage.list().is_empty(), "{:?} should list empty", raw);
        assert!(storage.get("a").is_none());
    }
}

#[test]
fn test_invalid_entries_are_skipped() {
    let storage = storage();
    let raw = r#"[
        {"id":"a","name":"A","content":"<a/>","createdAt":"2024-01-01T00:00:00.000Z","updatedAt":"2024-01-01T00:00:00.000Z"},
        {"id":"b","name":"B"},
        null,
        {"id":3,"name":"C","content":"<c/>","createdAt":"x","updatedAt":"x"}
    ]"#;
    storage.store().set_item(DOCUMENTS_KEY, raw).unwrap();

    let docs = storage.list();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "a");

    // The next write drops the invalid entries for good
    storage.save(&doc_at("d", "D", "2024-01-02T00:00:00.000Z")).unwrap();
    let rewritten: serde_json::Value = serde_json::from_str(&storage.store().raw(DOCUMENTS_KEY).unwrap()).unwrap();
    assert_eq!(rewritten.as_array().unwrap().len(), 2);
}

#[test]
fn test_save_over_corrupt_collection_starts_fresh() {
    let storage = storage();
    storage.store().set_item(DOCUMENTS_KEY, "null").unwrap();
    storage.save(&doc_at("a", "A", "2024-01-01T00:00:00.000Z")).unwrap();
    assert_eq!(storage.len(), 1);
}

#[test]
fn test_read_failures_read_as_empty() {
    let storage = storage();
    storage.save(&doc_at("a", "A", "2024-01-01T00:00:00.000Z")).unwrap();
    storage.set_current_id(Some("a")).unwrap();

    storage.store().set_fail_reads(true);
    assert!(storage.list().is_empty());
    assert_eq!(storage.current_id(), None);
}

#[test]
fn test_write_failure_propagates() {
    let storage = DiagramStorage::new(MemoryStore::with_quota(64));
    let big = Document::new("Big", "x".repeat(1024));

    let err = storage.save(&big).unwrap_err();
    match err {
        StorageError::WriteFailed { key, source } => {
            assert_eq!(key, DOCUMENTS_KEY);
            assert!(matches!(source, StoreError::QuotaExceeded { .. }));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(storage.is_empty());
}

#[test]
fn test_custom_key_names() {
    let config = eframe_diagram::AppConfig {
        documents_key: "docs".to_owned(),
        current_id_key: "current".to_owned(),
        ..Default::default()
    };
    let storage = DiagramStorage::with_config(MemoryStore::new(), &config);
    storage.save(&doc_at("a", "A", "2024-01-01T00:00:00.000Z")).unwrap();
    storage.set_current_id(Some("a")).unwrap();

    assert!(storage.store().raw("docs").is_some());
    assert_eq!(storage.store().raw("current").as_deref(), Some("a"));
    assert_eq!(storage.store().raw(DOCUMENTS_KEY), None);
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn test_file_store_persists_across_instances() {
    use eframe_diagram::storage::FileStore;

    let dir = std::env::temp_dir().join(format!("eframe_diagram_test_{}", eframe_diagram::id_generator::generate_id()));
    let path = dir.join("store.json");

    let doc = doc_at("a", "A", "2024-01-01T00:00:00.000Z");
    {
        let storage = DiagramStorage::new(FileStore::new(&path));
        storage.save(&doc).unwrap();
        storage.set_current_id(Some("a")).unwrap();
    }

    let reopened = DiagramStorage::new(FileStore::new(&path));
    assert_eq!(reopened.get("a"), Some(doc));
    assert_eq!(reopened.current_id().as_deref(), Some("a"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
#[cfg(not(target_arch = "wasm32"))]
fn test_file_store_recovers_from_corrupt_file() {
    use eframe_diagram::storage::FileStore;

    let dir = std::env::temp_dir().join(format!("eframe_diagram_test_{}", eframe_diagram::id_generator::generate_id()));
    let path = dir.join("store.json");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(&path, "{ truncated").unwrap();

    let store = FileStore::new(&path);
    let corrupt = store.corrupt_path();
    let storage = DiagramStorage::new(store);
    assert!(storage.list().is_empty());

    let doc = doc_at("a", "A", "2024-01-01T00:00:00.000Z");
    storage.save(&doc).unwrap();
    storage.set_current_id(Some("a")).unwrap();
    assert_eq!(std::fs::read_to_string(&corrupt).unwrap(), "{ truncated");

    let reopened = DiagramStorage::new(FileStore::new(&path));
    assert_eq!(reopened.get("a"), Some(doc));
    assert_eq!(reopened.current_id().as_deref(), Some("a"));

    std::fs::remove_dir_all(&dir).unwrap();
}

fn awkward_documents() -> Vec<Document> {
    let mut empty = Document::new("", "<definitions name=\"say \"hi\"\"/>\n");
    empty.id = "empty".to_owned();
    let mut markup = Document::new("<a href=\"x\">&amp;</a>", "line one\nline \"two\"\n\n");
    markup.id = "markup".to_owned();
    let mut unicode = Document::new("Größe\n流程图 ✓\r\nzweite Zeile", "\"quoted\"\n\t<x/>");
    unicode.id = "unicode".to_owned();
    vec![empty, markup, unicode]
}

fn assert_round_trips<S: KeyValueStore>(storage: &DiagramStorage<S>, docs: &[Document]) {
    for doc in docs {
        assert_eq!(storage.get(&doc.id).as_ref(), Some(doc));
    }
    let mut listed = storage.list();
    listed.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(listed, docs);
}

#[test]
fn test_awkward_names_and_content_round_trip() {
    let docs = awkward_documents();
    let storage = storage();
    for doc in &docs {
        storage.save(doc).unwrap();
    }
    assert_round_trips(&storage, &docs);
}

#[test]
#[cfg(not(target_arch = "wasm32"))]
fn test_awkward_names_and_content_survive_file_store() {
    use eframe_diagram::storage::FileStore;

    let dir = std::env::temp_dir().join(format!("eframe_diagram_test_{}", eframe_diagram::id_generator::generate_id()));
    let path = dir.join("store.json");
    let docs = awkward_documents();
    {
        let storage = DiagramStorage::new(FileStore::new(&path));
        for doc in &docs {
            storage.save(doc).unwrap();
        }
        assert_round_trips(&storage, &docs);
    }

    let reopened = DiagramStorage::new(FileStore::new(&path));
    assert_round_trips(&reopened, &docs);

    std::fs::remove_dir_all(&dir).unwrap();
}
