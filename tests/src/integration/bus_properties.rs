//! # Bus Properties
//!
//! Observable guarantees of the bus, exercised through its public surface
//! only: replay-on-subscribe, last-write-wins, unsubscribe and snapshot
//! passes.

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use shared_bus::{json, BusError, MessageBus, SubscriberError, Subscription, Value};
    use std::sync::Arc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    type Seen = Arc<Mutex<Vec<Option<Value>>>>;

    /// Subscribe a callback that records every delivery.
    fn record(bus: &MessageBus, topic: &str) -> (Seen, Subscription) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = bus
            .subscribe_fn(topic, move |v: Option<&Value>| {
                sink.lock().push(v.cloned());
                Ok(())
            })
            .unwrap();
        (seen, sub)
    }

    // =============================================================================
    // REPLAY AND LAST-WRITE-WINS
    // =============================================================================

    #[test]
    fn test_replay_on_subscribe_for_assorted_values() {
        let values = [
            json!(1),
            json!("text"),
            json!(null),
            json!([1, 2, 3]),
            json!({"nested": {"deep": true}}),
        ];

        for value in values {
            let bus = MessageBus::new();
            bus.publish("topic", value.clone()).unwrap();

            let (seen, _sub) = record(&bus, "topic");
            assert_eq!(*seen.lock(), vec![Some(value)]);
        }
    }

    #[test]
    fn test_last_write_wins() {
        let bus = MessageBus::new();
        bus.publish("t", json!("v1")).unwrap();
        bus.publish("t", json!("v2")).unwrap();

        assert_eq!(bus.get_last("t"), Some(json!("v2")));
        assert_eq!(bus.get_last("other"), None);
    }

    #[test]
    fn test_count_scenario_undefined_then_value_then_null() {
        let bus = MessageBus::new();
        let (seen, _sub) = record(&bus, "count");

        bus.publish("count", json!(1)).unwrap();
        bus.clear("count").unwrap();

        assert_eq!(*seen.lock(), vec![None, Some(json!(1)), Some(Value::Null)]);
    }

    // =============================================================================
    // UNSUBSCRIBE
    // =============================================================================

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = MessageBus::new();
        let (seen, sub) = record(&bus, "t");

        sub.unsubscribe();
        bus.publish("t", json!("after")).unwrap();

        assert_eq!(*seen.lock(), vec![None]);
        assert_eq!(bus.subscriber_count("t"), 0);
    }

    #[test]
    fn test_dropping_handle_unsubscribes() {
        let bus = MessageBus::new();
        let (seen, sub) = record(&bus, "t");
        drop(sub);

        bus.publish("t", json!(1)).unwrap();
        assert_eq!(*seen.lock(), vec![None]);
    }

    #[test]
    fn test_unsubscribe_only_affects_its_own_registration() {
        let bus = MessageBus::new();
        let (first, first_sub) = record(&bus, "t");
        let (second, _second_sub) = record(&bus, "t");

        first_sub.unsubscribe();
        first_sub.unsubscribe();
        bus.publish("t", json!(2)).unwrap();

        assert_eq!(*first.lock(), vec![None]);
        assert_eq!(*second.lock(), vec![None, Some(json!(2))]);
    }

    #[test]
    fn test_detached_subscription_lives_until_shutdown() {
        let bus = MessageBus::new();
        let (seen, sub) = record(&bus, "t");
        sub.detach();

        bus.publish("t", json!(1)).unwrap();
        bus.shutdown().unwrap();
        bus.publish("t", json!(2)).unwrap();

        assert_eq!(*seen.lock(), vec![None, Some(json!(1))]);
    }

    // =============================================================================
    // SNAPSHOT PASSES
    // =============================================================================

    #[test]
    fn test_subscriber_added_during_pass_waits_for_next_pass() {
        let bus = Arc::new(MessageBus::new());
        let late: Seen = Arc::new(Mutex::new(Vec::new()));
        let held: Arc<Mutex<Vec<Subscription>>> = Arc::new(Mutex::new(Vec::new()));

        let inner_bus = bus.clone();
        let inner_late = late.clone();
        let inner_held = held.clone();
        let _adder = bus
            .subscribe_fn("t", move |v: Option<&Value>| {
                if v.is_some() && inner_held.lock().is_empty() {
                    let sink = inner_late.clone();
                    let sub = inner_bus.subscribe_fn("t", move |v: Option<&Value>| {
                        sink.lock().push(v.cloned());
                        Ok(())
                    })?;
                    inner_held.lock().push(sub);
                }
                Ok(())
            })
            .unwrap();

        bus.publish("t", json!(1)).unwrap();
        // Replayed on subscribe, but not part of the pass that added it.
        assert_eq!(*late.lock(), vec![Some(json!(1))]);

        bus.publish("t", json!(2)).unwrap();
        assert_eq!(*late.lock(), vec![Some(json!(1)), Some(json!(2))]);
    }

    #[test]
    fn test_nested_publish_is_depth_first() {
        let bus = Arc::new(MessageBus::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let inner_bus = bus.clone();
        let sink = order.clone();
        let _relay = bus
            .subscribe_fn("a", move |v: Option<&Value>| {
                if let Some(v) = v {
                    sink.lock().push(format!("a:{v}"));
                    inner_bus.publish("b", v.clone())?;
                }
                Ok(())
            })
            .unwrap();

        let sink = order.clone();
        let _b = bus
            .subscribe_fn("b", move |v: Option<&Value>| {
                if let Some(v) = v {
                    sink.lock().push(format!("b:{v}"));
                }
                Ok(())
            })
            .unwrap();

        let sink = order.clone();
        let _a2 = bus
            .subscribe_fn("a", move |v: Option<&Value>| {
                if let Some(v) = v {
                    sink.lock().push(format!("a2:{v}"));
                }
                Ok(())
            })
            .unwrap();

        bus.publish("a", json!(1)).unwrap();
        assert_eq!(*order.lock(), vec!["a:1", "b:1", "a2:1"]);
    }

    // =============================================================================
    // FAILING SUBSCRIBERS
    // =============================================================================

    #[test]
    fn test_failing_subscriber_stops_the_pass_but_value_is_logged() {
        let bus = MessageBus::new();
        let (before, _b) = record(&bus, "t");
        let _failing = bus
            .subscribe_fn("t", |v: Option<&Value>| match v {
                Some(_) => Err(SubscriberError::rejected("boom")),
                None => Ok(()),
            })
            .unwrap();
        let (after, _a) = record(&bus, "t");

        let result = bus.publish("t", json!(1));

        assert!(matches!(result, Err(BusError::Subscriber { ref topic, .. }) if topic == "t"));
        assert_eq!(bus.get_last("t"), Some(json!(1)));
        assert_eq!(*before.lock(), vec![None, Some(json!(1))]);
        assert_eq!(*after.lock(), vec![None]);
    }
}
