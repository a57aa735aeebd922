use bevy::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Callback invoked with a borrowed payload for every matching publish.
pub type Handler = dyn Fn(&Value) + Send + Sync;

/// Identifier of a single registration, unique for the lifetime of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Handle returned by [`EventChannel::subscribe`].
///
/// Dropping the handle does not unsubscribe; pass it back to
/// [`EventChannel::unsubscribe`] to stop delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    event: String,
    id: SubscriptionId,
}

/// Outcome of a single publish call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The payload was fanned out immediately.
    Dispatched { delivered: usize, failed: usize },
    /// Published from inside a handler; delivered after the running fan-out.
    Queued,
}

/// Payload type with a fixed channel name.
pub trait ChannelEvent: Serialize + DeserializeOwned {
    const NAME: &'static str;
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<String, Vec<(SubscriptionId, Arc<Handler>)>>,
    dispatching: bool,
    pending: VecDeque<(String, Value)>,
}

/// Shared publish/subscribe registry.
///
/// Cloning yields another handle to the same registry, so the same channel can
/// be handed to the loader, the loading screen and the RPC bridge.
#[derive(Resource, Clone, Default)]
pub struct EventChannel {
    registry: Arc<Mutex<Registry>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    // A handler panicking mid fan-out never holds this lock, poisoning is ignored.
    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `handler` for `event`. Handlers run in registration order.
    pub fn subscribe<F>(&self, event: &str, handler: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let mut registry = self.registry();
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry
            .handlers
            .entry(event.to_string())
            .or_default()
            .push((id, Arc::new(handler)));

        debug!("Subscribed {:?} to '{}'", id, event);
        Subscription {
            event: event.to_string(),
            id,
        }
    }

    /// Register a typed handler for `E::NAME`.
    ///
    /// Payloads that do not deserialise into `E` are logged and skipped.
    pub fn subscribe_event<E, F>(&self, handler: F) -> Subscription
    where
        E: ChannelEvent,
        F: Fn(E) + Send + Sync + 'static,
    {
        self.subscribe(E::NAME, move |payload| match E::deserialize(payload) {
            Ok(event) => handler(event),
            Err(e) => warn!("Dropping malformed '{}' payload: {}", E::NAME, e),
        })
    }

    /// Remove a registration. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut registry = self.registry();
        let Some(handlers) = registry.handlers.get_mut(&subscription.event) else {
            return false;
        };

        let before = handlers.len();
        handlers.retain(|(id, _)| *id != subscription.id);
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            registry.handlers.remove(&subscription.event);
        }

        if removed {
            debug!("Unsubscribed {:?} from '{}'", subscription.id, subscription.event);
        }
        removed
    }

    /// Number of handlers currently registered for `event`.
    pub fn subscriber_count(&self, event: &str) -> usize {
        self.registry().handlers.get(event).map_or(0, Vec::len)
    }

    /// Deliver `payload` to every current subscriber of `event`.
    ///
    /// The returned counts cover this event only, not payloads queued by its
    /// handlers.
    pub fn publish(&self, event: &str, payload: Value) -> Delivery {
        {
            let mut registry = self.registry();
            if registry.dispatching {
                registry.pending.push_back((event.to_string(), payload));
                return Delivery::Queued;
            }
            registry.dispatching = true;
        }

        let handlers = self.snapshot(event);
        let (delivered, failed) = fan_out(event, &handlers, &payload);

        // Drain whatever the handlers published while we were fanning out.
        loop {
            let next = {
                let mut registry = self.registry();
                let next = registry.pending.pop_front();
                if next.is_none() {
                    registry.dispatching = false;
                }
                next
            };
            let Some((queued_event, queued_payload)) = next else {
                break;
            };
            let handlers = self.snapshot(&queued_event);
            fan_out(&queued_event, &handlers, &queued_payload);
        }

        Delivery::Dispatched { delivered, failed }
    }

    /// Serialise `event` and publish it under `E::NAME`.
    pub fn publish_event<E: ChannelEvent>(&self, event: &E) -> Result<Delivery, serde_json::Error> {
        let payload = serde_json::to_value(event)?;
        Ok(self.publish(E::NAME, payload))
    }

    fn snapshot(&self, event: &str) -> Vec<Arc<Handler>> {
        self.registry()
            .handlers
            .get(event)
            .map(|handlers| handlers.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }
}

/// Run every handler, returning `(delivered, failed)`.
///
/// Panics are only caught where panics unwind. On `wasm32-unknown-unknown`
/// they abort before `catch_unwind` sees them.
fn fan_out(event: &str, handlers: &[Arc<Handler>], payload: &Value) -> (usize, usize) {
    let mut delivered = 0;
    let mut failed = 0;
    for handler in handlers {
        match panic::catch_unwind(AssertUnwindSafe(|| handler(payload))) {
            Ok(()) => delivered += 1,
            Err(_) => {
                failed += 1;
                error!("Subscriber of '{}' panicked; continuing fan-out", event);
            }
        }
    }
    (delivered, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&Value) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |tag: &str| {
            let log = log_clone.clone();
            let tag = tag.to_string();
            Box::new(move |_: &Value| log.lock().unwrap().push(tag.clone()))
                as Box<dyn Fn(&Value) + Send + Sync>
        };
        (log, make)
    }

    #[test]
    fn publish_reaches_every_subscriber_in_order() {
        let channel = EventChannel::new();
        let (log, make) = recorder();
        channel.subscribe("ping", make("a"));
        channel.subscribe("ping", make("b"));
        channel.subscribe("other", make("c"));

        let delivery = channel.publish("ping", json!({}));

        assert_eq!(delivery, Delivery::Dispatched { delivered: 2, failed: 0 });
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn unsubscribed_handler_is_not_invoked_and_others_are() {
        let channel = EventChannel::new();
        let (log, make) = recorder();
        let first = channel.subscribe("ping", make("first"));
        channel.subscribe("ping", make("second"));

        assert!(channel.unsubscribe(&first));
        channel.publish("ping", Value::Null);

        assert_eq!(*log.lock().unwrap(), vec!["second"]);
        assert_eq!(channel.subscriber_count("ping"), 1);
    }

    #[test]
    fn unsubscribing_twice_is_a_no_op() {
        let channel = EventChannel::new();
        let subscription = channel.subscribe("ping", |_| {});

        assert!(channel.unsubscribe(&subscription));
        assert!(!channel.unsubscribe(&subscription));
        assert_eq!(channel.subscriber_count("ping"), 0);
    }

    #[test]
    fn publish_without_subscribers_delivers_nothing() {
        let channel = EventChannel::new();
        assert_eq!(
            channel.publish("nobody", json!(1)),
            Delivery::Dispatched { delivered: 0, failed: 0 }
        );
    }

    #[test]
    fn handler_added_during_fan_out_misses_that_fan_out() {
        let channel = EventChannel::new();
        let late_calls = Arc::new(Mutex::new(0));

        let inner_channel = channel.clone();
        let counter = late_calls.clone();
        channel.subscribe("ping", move |_| {
            let counter = counter.clone();
            inner_channel.subscribe("ping", move |_| *counter.lock().unwrap() += 1);
        });

        let delivery = channel.publish("ping", Value::Null);
        assert_eq!(delivery, Delivery::Dispatched { delivered: 1, failed: 0 });
        assert_eq!(*late_calls.lock().unwrap(), 0);

        channel.publish("ping", Value::Null);
        assert_eq!(*late_calls.lock().unwrap(), 1);
    }

    #[test]
    fn nested_publish_runs_after_current_fan_out() {
        let channel = EventChannel::new();
        let (log, make) = recorder();

        let inner_channel = channel.clone();
        let outer_log = log.clone();
        let nested = Arc::new(Mutex::new(None));
        let nested_result = nested.clone();
        channel.subscribe("outer", move |_| {
            outer_log.lock().unwrap().push("outer-1".to_string());
            *nested_result.lock().unwrap() = Some(inner_channel.publish("inner", Value::Null));
        });
        channel.subscribe("outer", make("outer-2"));
        channel.subscribe("inner", make("inner"));

        channel.publish("outer", Value::Null);

        assert_eq!(*nested.lock().unwrap(), Some(Delivery::Queued));
        assert_eq!(*log.lock().unwrap(), vec!["outer-1", "outer-2", "inner"]);
    }

    #[test]
    fn panicking_subscriber_does_not_stop_fan_out() {
        let channel = EventChannel::new();
        let (log, make) = recorder();
        channel.subscribe("ping", make("before"));
        channel.subscribe("ping", |_| panic!("subscriber failure"));
        channel.subscribe("ping", make("after"));

        let delivery = channel.publish("ping", Value::Null);

        assert_eq!(delivery, Delivery::Dispatched { delivered: 2, failed: 1 });
        assert_eq!(*log.lock().unwrap(), vec!["before", "after"]);

        // The channel stays usable after a handler panicked.
        channel.publish("ping", Value::Null);
        assert_eq!(log.lock().unwrap().len(), 4);
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Greeting {
        text: String,
    }

    impl ChannelEvent for Greeting {
        const NAME: &'static str = "greeting";
    }

    #[test]
    fn typed_subscriber_skips_malformed_payloads() {
        let channel = EventChannel::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        channel.subscribe_event::<Greeting, _>(move |greeting| sink.lock().unwrap().push(greeting));

        channel.publish("greeting", json!({ "wrong": true }));
        channel
            .publish_event(&Greeting {
                text: "hello".to_string(),
            })
            .unwrap();

        assert_eq!(
            *received.lock().unwrap(),
            vec![Greeting {
                text: "hello".to_string()
            }]
        );
    }
}
