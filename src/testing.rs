//! Shared fixtures for the unit tests: targets with and without a native
//! event system, listener helpers, and a tracing layer that counts warnings.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tracing_subscriber::layer::SubscriberExt;

use crate::listener::{Event, Listener};
use crate::native::{EventTarget, NativeEvent, NativeEventTarget};

/// A target with no event system of its own.
#[derive(Debug, Default)]
pub struct PlainTarget {
    pub label: &'static str,
}

impl EventTarget for PlainTarget {}

/// Native target that records every primitive call and invokes its
/// listeners on dispatch. A listener returning `false` cancels a cancelable
/// event.
pub struct RecordingNode {
    me: Weak<RecordingNode>,
    listeners: Mutex<Vec<(String, Listener, bool)>>,
    calls: Mutex<Vec<String>>,
    dispatched: Mutex<Vec<NativeEvent>>,
}

impl RecordingNode {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            listeners: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            dispatched: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub fn dispatched(&self) -> Vec<NativeEvent> {
        self.dispatched.lock().expect("dispatched mutex poisoned").clone()
    }

    pub fn native_count(&self, name: &str) -> usize {
        self.listeners
            .lock()
            .expect("listeners mutex poisoned")
            .iter()
            .filter(|(event, _, _)| event == name)
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }
}

impl EventTarget for RecordingNode {
    fn as_native(&self) -> Option<&dyn NativeEventTarget> {
        Some(self)
    }
}

impl NativeEventTarget for RecordingNode {
    fn add_event_listener(&self, name: &str, listener: &Listener, capture: bool) {
        self.record(format!("add:{name}:{capture}"));
        self.listeners
            .lock()
            .expect("listeners mutex poisoned")
            .push((name.to_string(), listener.clone(), capture));
    }

    fn remove_event_listener(&self, name: &str, listener: &Listener, capture: bool) {
        self.record(format!("remove:{name}:{capture}"));
        let mut guard = self.listeners.lock().expect("listeners mutex poisoned");
        if let Some(index) = guard
            .iter()
            .position(|(event, it, cap)| event == name && it.ptr_eq(listener) && *cap == capture)
        {
            guard.remove(index);
        }
    }

    fn dispatch_event(&self, event: NativeEvent) -> bool {
        self.record(format!("dispatch:{}", event.name()));
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .expect("listeners mutex poisoned")
            .iter()
            .filter(|(name, _, _)| name == event.name())
            .map(|(_, listener, _)| listener.clone())
            .collect();

        let target = self.me.upgrade().map(|node| node as Arc<dyn EventTarget>);
        let view = Event::from_native(&event, target);
        let mut canceled = false;
        for listener in &listeners {
            if let Ok(reply) = listener.call(&view) {
                if reply.is_stop() && event.cancelable() {
                    canceled = true;
                }
            }
        }
        self.dispatched
            .lock()
            .expect("dispatched mutex poisoned")
            .push(event);
        !canceled
    }
}

/// Listener that appends `tag` to `log` and returns nothing.
pub fn logging_listener(log: &Arc<Mutex<Vec<String>>>, tag: &str) -> Listener {
    let log = log.clone();
    let tag = tag.to_string();
    Listener::new(move |_| {
        log.lock().expect("log mutex poisoned").push(tag.clone());
    })
}

pub fn entries(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock().expect("log mutex poisoned").clone()
}

/// Listener that counts its invocations.
pub fn counting_listener(counter: &Arc<AtomicUsize>) -> Listener {
    let counter = counter.clone();
    Listener::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

#[derive(Clone, Default)]
pub struct WarnCounter {
    count: Arc<AtomicUsize>,
}

impl WarnCounter {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if *event.metadata().level() == tracing::Level::WARN {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Run `f` with a thread-local subscriber and return how many warnings it
/// logged.
pub fn count_warnings<R>(f: impl FnOnce() -> R) -> (R, usize) {
    let counter = WarnCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, counter.count())
}
