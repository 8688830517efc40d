//! Fan-out of playback events to observers.
//!
//! Each subscriber owns an unbounded queue drained by a dedicated delivery
//! thread, so a slow or panicking callback only ever affects itself.
//! Publishing enqueues and returns immediately.

use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering::SeqCst},
    },
    thread::spawn,
};

use {
    async_channel::{Receiver, Sender, unbounded},
    parking_lot::Mutex,
    tracing::{debug, error, warn},
};

use crate::state::events::PlaybackEvent;

/// Handle identifying one subscription.
///
/// Dropping the handle does not unsubscribe; pass it back to
/// [`ObserverHub::unsubscribe`] to stop receiving events.
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "events keep flowing until the subscription is passed to unsubscribe"]
pub struct Subscription {
    id: u64,
}

impl Subscription {
    /// Numeric id of the subscription, for logging.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// A registered subscriber's queue.
struct Subscriber {
    /// Subscription id.
    id: u64,
    /// Sender side of the subscriber's delivery queue.
    tx: Sender<Arc<PlaybackEvent>>,
}

/// Observer registry shared between the controller and subscribers.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct ObserverHub {
    /// Subscribers in subscription order.
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    /// Next subscription id.
    next_id: Arc<AtomicU64>,
}

impl ObserverHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked for every event published from now on.
    ///
    /// Callbacks run on the subscriber's own delivery thread, one event at a
    /// time and in publish order. They must not wait on the controller;
    /// issuing commands through `PlaybackController::submit` is fine.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&PlaybackEvent) + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, SeqCst);
        let (tx, rx) = unbounded();

        spawn(move || deliver(id, &rx, callback));

        self.subscribers.lock().push(Subscriber { id, tx });
        debug!(subscriber = id, "Observer subscribed");

        Subscription { id }
    }

    /// Removes a subscription.
    ///
    /// Events already queued for it are still delivered, then its delivery
    /// thread exits. Returns `false` if the subscription was not registered.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.id != subscription.id);
        let removed = subscribers.len() != before;
        drop(subscribers);

        if removed {
            debug!(subscriber = subscription.id, "Observer unsubscribed");
        } else {
            warn!(subscriber = subscription.id, "Unsubscribe for unknown subscription");
        }
        removed
    }

    /// Enqueues `event` for every subscriber, in subscription order.
    pub fn publish(&self, event: PlaybackEvent) {
        let event = Arc::new(event);
        for subscriber in self.subscribers.lock().iter() {
            if let Err(e) = subscriber.tx.try_send(Arc::clone(&event)) {
                warn!(subscriber = subscriber.id, "Failed to enqueue {}: {e}", event.name());
            }
        }
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

/// Delivery loop run on a subscriber's thread.
fn deliver<F>(id: u64, rx: &Receiver<Arc<PlaybackEvent>>, mut callback: F)
where
    F: FnMut(&PlaybackEvent),
{
    while let Ok(event) = rx.recv_blocking() {
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(&event))) {
            error!(
                subscriber = id,
                event = event.name(),
                "Observer panicked: {}",
                panic_message(panic.as_ref())
            );
        }
    }
    debug!(subscriber = id, "Delivery thread exiting");
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use std::{thread::sleep, time::Instant};

    use {
        async_channel::unbounded,
        tokio::time::{Duration, timeout},
    };

    use crate::state::{events::PlaybackEvent, observer_hub::ObserverHub};

    const TEST_TIMEOUT_MS: u64 = 1000;

    #[tokio::test]
    async fn test_events_arrive_in_publish_order() {
        let hub = ObserverHub::new();
        let (tx, rx) = unbounded();
        let subscription = hub.subscribe(move |event| {
            let _ = tx.try_send(event.clone());
        });

        for volume in [10, 20, 30] {
            hub.publish(PlaybackEvent::VolumeChanged(volume));
        }

        for expected in [10, 20, 30] {
            let event = timeout(Duration::from_millis(TEST_TIMEOUT_MS), rx.recv())
                .await
                .expect("event not delivered")
                .unwrap();
            assert_eq!(event, PlaybackEvent::VolumeChanged(expected));
        }

        assert!(hub.unsubscribe(subscription));
    }

    #[tokio::test]
    async fn test_panicking_observer_is_isolated() {
        let hub = ObserverHub::new();

        let (panicky_tx, panicky_rx) = unbounded();
        let _panicky = hub.subscribe(move |event| {
            if *event == PlaybackEvent::PositionTick(1) {
                panic!("observer failure");
            }
            let _ = panicky_tx.try_send(event.clone());
        });

        let (tx, rx) = unbounded();
        let _healthy = hub.subscribe(move |event| {
            let _ = tx.try_send(event.clone());
        });

        hub.publish(PlaybackEvent::PositionTick(1));
        hub.publish(PlaybackEvent::PositionTick(2));

        for expected in [1, 2] {
            let event = timeout(Duration::from_millis(TEST_TIMEOUT_MS), rx.recv())
                .await
                .expect("healthy observer starved")
                .unwrap();
            assert_eq!(event, PlaybackEvent::PositionTick(expected));
        }

        // The panicking observer keeps receiving after its failure.
        let event = timeout(Duration::from_millis(TEST_TIMEOUT_MS), panicky_rx.recv())
            .await
            .expect("panicking observer stopped receiving")
            .unwrap();
        assert_eq!(event, PlaybackEvent::PositionTick(2));
    }

    #[tokio::test]
    async fn test_slow_observer_does_not_block_others() {
        let hub = ObserverHub::new();
        let _slow = hub.subscribe(|_| sleep(Duration::from_millis(300)));

        let (tx, rx) = unbounded();
        let _fast = hub.subscribe(move |event| {
            let _ = tx.try_send(event.clone());
        });

        let started = Instant::now();
        hub.publish(PlaybackEvent::VolumeChanged(1));
        hub.publish(PlaybackEvent::VolumeChanged(2));
        assert!(started.elapsed() < Duration::from_millis(100));

        for expected in [1, 2] {
            let event = timeout(Duration::from_millis(200), rx.recv())
                .await
                .expect("fast observer waited on slow observer")
                .unwrap();
            assert_eq!(event, PlaybackEvent::VolumeChanged(expected));
        }
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let hub = ObserverHub::new();
        let (tx, rx) = unbounded();
        let subscription = hub.subscribe(move |event| {
            let _ = tx.try_send(event.clone());
        });
        assert_eq!(hub.subscriber_count(), 1);

        hub.publish(PlaybackEvent::VolumeChanged(5));
        assert!(hub.unsubscribe(subscription));
        hub.publish(PlaybackEvent::VolumeChanged(6));

        let first = timeout(Duration::from_millis(TEST_TIMEOUT_MS), rx.recv())
            .await
            .expect("queued event lost on unsubscribe")
            .unwrap();
        assert_eq!(first, PlaybackEvent::VolumeChanged(5));

        // The callback (and its sender) is dropped once the thread exits.
        let closed = timeout(Duration::from_millis(TEST_TIMEOUT_MS), rx.recv())
            .await
            .expect("delivery thread did not exit");
        assert!(closed.is_err());
        assert_eq!(hub.subscriber_count(), 0);
    }
}
