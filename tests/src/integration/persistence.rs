//! # Persistence
//!
//! Write-back to a bound storage provider, exclusions, and restoring a bus
//! from what an earlier one stored.

#[cfg(test)]
mod tests {
    use shared_bus::{
        json, FileBackedStorage, InMemoryStorage, MessageBus, StorageProvider, Value,
    };
    use std::sync::Arc;
    use tempfile::TempDir;

    fn bound_bus() -> (MessageBus, Arc<InMemoryStorage>) {
        let storage = Arc::new(InMemoryStorage::new());
        let bus = MessageBus::new();
        bus.initialize(storage.clone()).unwrap();
        (bus, storage)
    }

    // =============================================================================
    // SELECTIVE PERSISTENCE
    // =============================================================================

    #[test]
    fn test_exclude_then_include() {
        let (bus, storage) = bound_bus();

        bus.configure().exclude("T");
        bus.publish("T", json!("hidden")).unwrap();
        assert_eq!(storage.write_count("T"), 0);
        assert_eq!(storage.get_item("T").unwrap(), None);

        bus.configure().include("T");
        bus.publish("T", json!("shown")).unwrap();
        assert_eq!(storage.write_count("T"), 1);
        assert_eq!(storage.get_item("T").unwrap(), Some("shown".to_string()));
    }

    #[test]
    fn test_exclusion_keeps_existing_stored_value() {
        let (bus, storage) = bound_bus();
        bus.publish("T", json!(1)).unwrap();

        bus.configure().exclude("T");
        bus.publish("T", json!(2)).unwrap();

        assert_eq!(storage.get_item("T").unwrap(), Some("1".to_string()));
        assert_eq!(bus.get_last("T"), Some(json!(2)));
    }

    #[test]
    fn test_nothing_is_written_before_initialize() {
        let bus = MessageBus::new();
        bus.publish("early", json!(true)).unwrap();

        let storage = Arc::new(InMemoryStorage::new());
        bus.initialize(storage.clone()).unwrap();

        assert_eq!(storage.write_count("early"), 0);
        assert_eq!(bus.get_last("early"), Some(json!(true)));
    }

    #[test]
    fn test_encoding_in_storage() {
        let (bus, storage) = bound_bus();
        bus.publish("str", json!("plain")).unwrap();
        bus.publish("num", json!(42)).unwrap();
        bus.publish("obj", json!({"a": 1})).unwrap();
        bus.clear("num").unwrap();

        assert_eq!(storage.get_item("str").unwrap(), Some("plain".to_string()));
        assert_eq!(storage.get_item("num").unwrap(), Some("null".to_string()));
        assert_eq!(storage.get_item("obj").unwrap(), Some(r#"{"a":1}"#.to_string()));
    }

    // =============================================================================
    // ROUND TRIPS
    // =============================================================================

    #[test]
    fn test_reinitialize_with_same_provider_restores_value() {
        let storage = Arc::new(InMemoryStorage::new());
        let bus = MessageBus::new();
        bus.initialize(storage.clone()).unwrap();
        bus.publish("T", json!({"a": 1})).unwrap();

        let restored = MessageBus::new();
        restored.initialize(storage).unwrap();
        assert_eq!(restored.get_last("T"), Some(json!({"a": 1})));
    }

    #[test]
    fn test_numeric_looking_string_comes_back_as_number() {
        let storage = Arc::new(InMemoryStorage::new());
        let bus = MessageBus::new();
        bus.initialize(storage.clone()).unwrap();
        bus.publish("T", json!("7")).unwrap();

        let restored = MessageBus::new();
        restored.initialize(storage).unwrap();
        assert_eq!(restored.get_last("T"), Some(json!(7)));
    }

    #[test]
    fn test_unparseable_stored_text_is_kept_verbatim() {
        let storage = Arc::new(InMemoryStorage::with_entries([("T", "{half")]));
        let bus = MessageBus::new();
        bus.initialize(storage).unwrap();

        assert_eq!(bus.get_last("T"), Some(Value::String("{half".to_string())));
    }

    #[test]
    fn test_file_storage_round_trip_across_processes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        {
            let bus = MessageBus::new();
            bus.initialize(Arc::new(FileBackedStorage::open(&path).unwrap()))
                .unwrap();
            bus.publish("list", json!([1, "two", null])).unwrap();
            bus.publish("name", json!("spit")).unwrap();
            bus.shutdown().unwrap();
        }

        let bus = MessageBus::new();
        bus.initialize(Arc::new(FileBackedStorage::open(&path).unwrap()))
            .unwrap();
        assert_eq!(bus.get_last("list"), Some(json!([1, "two", null])));
        assert_eq!(bus.get_last("name"), Some(json!("spit")));
    }

    #[test]
    fn test_initialize_resets_exclusions() {
        let (bus, storage) = bound_bus();
        bus.configure().exclude("T");

        bus.initialize(storage.clone()).unwrap();
        bus.publish("T", json!(1)).unwrap();

        assert_eq!(storage.write_count("T"), 1);
    }
}
