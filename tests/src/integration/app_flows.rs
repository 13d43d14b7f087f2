//! # Application Flows
//!
//! The counter and toast services sharing one bus, and the runtime
//! restoring their state from disk on restart.

#[cfg(test)]
mod tests {
    use app_runtime::{App, Command, RuntimeConfig};
    use app_services::messages::{SPIT_COUNTER, TOASTS};
    use app_services::{CounterService, ServiceError, ToastConfig, ToastService, ToastVariant};
    use shared_bus::{InMemoryStorage, MessageBus, StorageProvider};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> RuntimeConfig {
        RuntimeConfig {
            storage_path: dir.path().join("bus-store.json"),
            ..RuntimeConfig::default()
        }
    }

    // =============================================================================
    // SERVICES ON ONE BUS
    // =============================================================================

    #[test]
    fn test_two_counters_stay_in_step() {
        let bus = Arc::new(MessageBus::new());
        let left = CounterService::new(bus.clone()).unwrap();
        let right = CounterService::new(bus.clone()).unwrap();

        left.increment().unwrap();
        right.increment().unwrap();
        left.increment().unwrap();

        assert_eq!(left.count(), 3);
        assert_eq!(right.count(), 3);
        assert_eq!(SPIT_COUNTER.last(&bus).unwrap(), Some(3));
    }

    #[test]
    fn test_destroyed_counter_stops_following() {
        let bus = Arc::new(MessageBus::new());
        let mut stale = CounterService::new(bus.clone()).unwrap();
        let live = CounterService::new(bus.clone()).unwrap();

        stale.destroy();
        live.increment().unwrap();

        assert_eq!(stale.count(), 0);
        assert!(matches!(
            stale.increment(),
            Err(ServiceError::Destroyed { .. })
        ));
        assert_eq!(bus.subscriber_count(SPIT_COUNTER.topic()), 1);
    }

    #[test]
    fn test_counter_restored_from_seeded_storage() {
        let storage = Arc::new(InMemoryStorage::with_entries([("SpitCounter", "41")]));
        let bus = Arc::new(MessageBus::new());
        bus.initialize(storage.clone()).unwrap();

        let counter = CounterService::new(bus).unwrap();
        assert_eq!(counter.count(), 41);

        counter.increment().unwrap();
        assert_eq!(storage.get_item("SpitCounter").unwrap(), Some("42".to_string()));
    }

    #[test]
    fn test_toasts_published_as_full_list() {
        let bus = Arc::new(MessageBus::new());
        let toasts = ToastService::new(bus.clone());

        toasts.add_toast(ToastConfig::new("saved")).unwrap();
        toasts
            .add_toast(ToastConfig::new("oops").with_variant(ToastVariant::Error))
            .unwrap();

        let listed = TOASTS.last(&bus).unwrap().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].variant, ToastVariant::Error);
    }

    // =============================================================================
    // RUNTIME RESTARTS
    // =============================================================================

    #[test]
    fn test_count_persists_across_app_restarts() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        for expected in 1..=3 {
            let app = App::start(&config).unwrap();
            let state = app.execute(Command::Increment { times: 1 }).unwrap();
            assert_eq!(state.count, expected);
            app.shutdown().unwrap();
        }

        let app = App::start(&config).unwrap();
        let state = app.execute(Command::Reset).unwrap();
        assert_eq!(state.count, 0);
        app.shutdown().unwrap();

        let app = App::start(&config).unwrap();
        assert_eq!(app.state().count, 0);
    }

    #[test]
    fn test_toasts_persist_unless_excluded() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let app = App::start(&config).unwrap();
        app.execute(Command::Toast {
            message: "kept".into(),
            variant: ToastVariant::Success,
        })
        .unwrap();
        app.shutdown().unwrap();

        let excluding = RuntimeConfig {
            excluded_topics: vec![TOASTS.topic().to_string()],
            ..config.clone()
        };
        let app = App::start(&excluding).unwrap();
        let state = app.execute(Command::Dismiss { index: 0 }).unwrap();
        assert!(state.toasts.is_empty());
        app.shutdown().unwrap();

        let app = App::start(&config).unwrap();
        assert_eq!(
            app.state().toasts,
            vec![ToastConfig::new("kept").with_variant(ToastVariant::Success)]
        );
    }
}
