//! Fan-out event distribution: one incoming [`Event`] stream, many
//! independent subscriber queues.
//!
//! Each subscription owns an unbounded queue and a dedicated forwarder
//! task that drains it and calls back into the subscriber's closure,
//! the same `tokio::sync::mpsc` + spawned-task shape the rest of this
//! workspace uses for async fan-out. A slow subscriber only backs up
//! its own queue; it never blocks delivery to anyone else, and a
//! subscriber queue grows without bound rather than drop events,
//! unless wrapped in [`Throttle`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex as StdMutex;

use tokio::sync::{mpsc, RwLock};

use crate::cancel::CancelToken;
use crate::event::{Event, EventKind};

/// The producing half of an unbounded event queue. Pushing never
/// blocks and never fails observably: once the matching
/// [`QueueReceiver`] (and its forwarder task) is gone, pushes are
/// silently dropped.
#[derive(Clone)]
struct QueueSender(mpsc::UnboundedSender<Event>);

impl QueueSender {
    fn push(&self, event: Event) {
        let _ = self.0.send(event);
    }
}

/// The consuming half of an unbounded event queue.
struct QueueReceiver(mpsc::UnboundedReceiver<Event>);

impl QueueReceiver {
    /// Wait for the next event, or for `cancel` to fire, whichever
    /// comes first. Returns `None` on cancellation or once the sender
    /// half is dropped.
    async fn pull(&mut self, cancel: &CancelToken) -> Option<Event> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            event = self.0.recv() => event,
        }
    }
}

fn unbounded_queue() -> (QueueSender, QueueReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueSender(tx), QueueReceiver(rx))
}

/// A queue wrapper that collapses consecutive, structurally equal
/// events down to at most `max_repeats` forwarded repeats, used to tame
/// resize storms and similar bursts. The first occurrence of a run
/// always forwards; a different event resets the run regardless of
/// whether it was seen earlier.
struct Throttle {
    inner: QueueSender,
    max_repeats: u32,
    run: StdMutex<Option<(Event, u32)>>,
}

impl Throttle {
    fn new(inner: QueueSender, max_repeats: u32) -> Self {
        Self {
            inner,
            max_repeats,
            run: StdMutex::new(None),
        }
    }

    fn push(&self, event: Event) {
        #[allow(clippy::unwrap_used)]
        let mut run = self.run.lock().unwrap();
        match run.as_mut() {
            Some((last, repeats)) if *last == event => {
                if *repeats < self.max_repeats {
                    *repeats += 1;
                    self.inner.push(event);
                }
            }
            _ => {
                *run = Some((event.clone(), 0));
                self.inner.push(event);
            }
        }
    }
}

enum Sink {
    Plain(QueueSender),
    Throttled(Throttle),
}

impl Sink {
    fn push(&self, event: Event) {
        match self {
            Sink::Plain(q) => q.push(event),
            Sink::Throttled(t) => t.push(event),
        }
    }
}

struct Entry {
    filter: Vec<EventKind>,
    sink: Sink,
}

impl Entry {
    fn wants(&self, kind: EventKind) -> bool {
        kind == EventKind::Error || self.filter.is_empty() || self.filter.contains(&kind)
    }
}

/// A live subscription. Dropping this handle does not stop delivery;
/// call [`SubscriberHandle::stop`] explicitly.
pub struct SubscriberHandle {
    id: u64,
    subscribers: Arc<RwLock<HashMap<u64, Entry>>>,
    cancel: CancelToken,
}

impl SubscriberHandle {
    /// Stop delivery: the forwarder task exits and the subscription is
    /// removed. Events already sitting in the queue are dropped
    /// unread.
    pub async fn stop(self) {
        self.cancel.cancel();
        self.subscribers.write().await.remove(&self.id);
    }
}

/// Fan-out point for the run loop's incoming [`Event`] stream.
///
/// Cloning a `Distributor` shares the same subscriber map; the run loop
/// keeps one and calls [`Distributor::dispatch`] for every event it
/// reads from the terminal.
#[derive(Clone)]
pub struct Distributor {
    subscribers: Arc<RwLock<HashMap<u64, Entry>>>,
    next_id: Arc<AtomicU64>,
}

impl Distributor {
    /// A distributor with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscribe to events whose kind is in `filter` (an empty filter
    /// matches every kind); `Error` events always deliver regardless of
    /// `filter`. `callback` runs on a dedicated task, once per queued
    /// event, in arrival order.
    pub async fn subscribe<F>(&self, filter: Vec<EventKind>, callback: F) -> SubscriberHandle
    where
        F: FnMut(Event) + Send + 'static,
    {
        self.register(filter, Sink::Plain, callback).await
    }

    /// Like [`Distributor::subscribe`], but collapses consecutive
    /// structurally-equal events down to at most `max_repeats` forwarded
    /// repeats before they reach `callback`.
    pub async fn subscribe_throttled<F>(
        &self,
        filter: Vec<EventKind>,
        max_repeats: u32,
        callback: F,
    ) -> SubscriberHandle
    where
        F: FnMut(Event) + Send + 'static,
    {
        self.register(
            filter,
            move |inner| Sink::Throttled(Throttle::new(inner, max_repeats)),
            callback,
        )
        .await
    }

    async fn register<F, S>(&self, filter: Vec<EventKind>, sink: S, mut callback: F) -> SubscriberHandle
    where
        F: FnMut(Event) + Send + 'static,
        S: FnOnce(QueueSender) -> Sink,
    {
        let (tx, mut rx) = unbounded_queue();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancelToken::new();

        self.subscribers.write().await.insert(
            id,
            Entry {
                filter,
                sink: sink(tx),
            },
        );

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.pull(&task_cancel).await {
                callback(event);
            }
        });

        SubscriberHandle {
            id,
            subscribers: self.subscribers.clone(),
            cancel,
        }
    }

    /// Deliver `event` to every current subscriber whose filter wants
    /// it. Takes only a reader lock over the subscriber map, so
    /// dispatch never waits on subscribe/stop beyond their own brief
    /// critical sections.
    pub async fn dispatch(&self, event: Event) {
        let kind = event.kind();
        let subscribers = self.subscribers.read().await;
        for entry in subscribers.values() {
            if entry.wants(kind) {
                entry.sink.push(event.clone());
            }
        }
    }

    /// Number of currently live subscriptions, for diagnostics and
    /// tests.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

impl Default for Distributor {
    fn default() -> Self {
        Self::new()
    }
}
