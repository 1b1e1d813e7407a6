//! The emitter: listener bookkeeping, native forwarding and identity.
//!
//! An [`EventEmitter`] is a cheap handle; clones share one listener table.
//! It either proxies itself or raises events on behalf of an external
//! [`EventTarget`], of which it keeps only a weak reference. A target has at
//! most one live emitter: attaching the same target twice yields the same
//! emitter (see [`attachments`]).
//!
//! Emission lives in `dispatch.rs`.

pub mod attachments;
mod dispatch;


use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use uuid::Uuid;

use crate::config::EmitterOptions;
use crate::listener::{Event, Listener};
use crate::native::composite::{self, EventDescriptor};
use crate::native::{
    add_native_listener, remove_native_listener, Capability, EventFactory, EventTarget,
    NativeEventTarget,
};
use crate::registry::ListenerRegistry;

enum TargetRef {
    Own,
    External(Weak<dyn EventTarget>),
}

struct EmitterInner {
    id: Uuid,
    target: TargetRef,
    capability: Capability,
    listeners: Mutex<ListenerRegistry>,
    max_listeners: AtomicUsize,
    event_factory: Option<Arc<dyn EventFactory>>,
}

#[derive(Clone)]
pub struct EventEmitter {
    inner: Arc<EmitterInner>,
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("id", &self.inner.id)
            .field("capability", &self.inner.capability)
            .field("events", &self.event_names())
            .finish()
    }
}

impl EventEmitter {
    /// Emitter that is its own target.
    pub fn new() -> Self {
        Self::with_options(EmitterOptions::default())
    }

    pub fn with_options(options: EmitterOptions) -> Self {
        Self::create(TargetRef::Own, Capability::Pure, &options, None)
    }

    /// The emitter for `target`, created on first use.
    pub fn attach<T: EventTarget>(target: &Arc<T>) -> Self {
        let target: Arc<dyn EventTarget> = target.clone();
        Self::builder().target(target).build()
    }

    pub fn builder() -> EmitterBuilder {
        EmitterBuilder::default()
    }

    fn create(
        target: TargetRef,
        capability: Capability,
        options: &EmitterOptions,
        event_factory: Option<Arc<dyn EventFactory>>,
    ) -> Self {
        Self {
            inner: Arc::new(EmitterInner {
                id: Uuid::new_v4(),
                target,
                capability,
                listeners: Mutex::new(ListenerRegistry::default()),
                max_listeners: AtomicUsize::new(options.max_listeners),
                event_factory,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn capability(&self) -> Capability {
        self.inner.capability
    }

    pub fn is_native(&self) -> bool {
        self.inner.capability == Capability::Native
    }

    /// The external target, while it is alive. `None` for self-proxying
    /// emitters.
    pub fn target(&self) -> Option<Arc<dyn EventTarget>> {
        match &self.inner.target {
            TargetRef::Own => None,
            TargetRef::External(weak) => weak.upgrade(),
        }
    }

    pub fn ptr_eq(&self, other: &EventEmitter) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn max_listeners(&self) -> usize {
        self.inner.max_listeners.load(Ordering::Relaxed)
    }

    pub fn set_max_listeners(&self, max_listeners: usize) {
        self.inner
            .max_listeners
            .store(max_listeners, Ordering::Relaxed);
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.lock_listeners().count(name)
    }

    /// Names with at least one listener, sorted.
    pub fn event_names(&self) -> Vec<String> {
        self.lock_listeners().names()
    }

    pub fn listeners(&self, name: &str) -> Vec<Listener> {
        self.lock_listeners().snapshot(name)
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Append `listener` to `name`'s list. On a native-capable emitter the
    /// listener is registered on the target first. `capture` only matters
    /// to native targets.
    pub fn add_listener(&self, name: &str, listener: Listener, capture: bool) {
        self.with_native(|native| add_native_listener(self, native, name, &listener, capture));

        let max_listeners = self.max_listeners();
        let overflow = {
            let mut registry = self.lock_listeners();
            let count = registry.add(name, listener);
            registry.needs_overflow_warning(name, count, max_listeners)
        };
        if overflow {
            tracing::warn!(
                event = name,
                max_listeners,
                emitter = %self.inner.id,
                "the '{name}' event has more than {max_listeners} listeners"
            );
        }
    }

    pub fn on(&self, name: &str, listener: Listener) {
        self.add_listener(name, listener, false)
    }

    /// Remove one listener, every listener of one event, or everything:
    ///
    /// - `name` and `listener`: the first occurrence of `listener`.
    /// - `name` only: all listeners of `name`.
    /// - no `name`: all listeners of all events.
    ///
    /// Native-capable emitters unregister each listener from the target
    /// individually. Removing what was never added does nothing.
    pub fn remove_listener(&self, name: Option<&str>, listener: Option<&Listener>, capture: bool) {
        match (name, listener) {
            (Some(name), Some(listener)) => self.remove_one(name, listener, capture),
            (Some(name), None) => self.remove_event(name, capture),
            (None, _) => self.remove_every(capture),
        }
    }

    pub fn off(&self, name: &str, listener: &Listener) {
        self.remove_listener(Some(name), Some(listener), false)
    }

    pub fn remove_all_listeners(&self, name: Option<&str>) {
        self.remove_listener(name, None, false)
    }

    fn remove_one(&self, name: &str, listener: &Listener, capture: bool) {
        self.with_native(|native| remove_native_listener(self, native, name, listener, capture));
        self.lock_listeners().remove_one(name, listener);
    }

    fn remove_event(&self, name: &str, capture: bool) {
        if self.is_native() {
            // Native removal needs the exact listener, so go one by one.
            let snapshot = self.lock_listeners().snapshot(name);
            for listener in &snapshot {
                self.remove_one(name, listener, capture);
            }
        }
        self.lock_listeners().remove_name(name);
    }

    fn remove_every(&self, capture: bool) {
        let names = self.lock_listeners().names();
        for name in &names {
            self.remove_event(name, capture);
        }
        self.lock_listeners().clear();
    }

    // -----------------------------------------------------------------------
    // Composite events
    // -----------------------------------------------------------------------

    pub fn register(descriptor: Arc<dyn EventDescriptor>) {
        composite::register(descriptor)
    }

    pub fn event_descriptor(name: &str) -> Option<Arc<dyn EventDescriptor>> {
        composite::lookup(name)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn lock_listeners(&self) -> MutexGuard<'_, ListenerRegistry> {
        self.inner
            .listeners
            .lock()
            .expect("emitter listener mutex poisoned")
    }

    /// Run `f` against the native side of the target. `None` when the
    /// emitter is not native-capable or the target is gone.
    fn with_native<R>(&self, f: impl FnOnce(&dyn NativeEventTarget) -> R) -> Option<R> {
        if !self.is_native() {
            return None;
        }
        let Some(target) = self.target() else {
            tracing::debug!(emitter = %self.inner.id, "native target dropped, skipping");
            return None;
        };
        let native = target.as_native()?;
        Some(f(native))
    }

    fn make_event(&self, name: &str, data: serde_json::Value) -> Event {
        Event::new(name, data).with_target(self.target())
    }
}

/// Builder for emitters bound to a target or carrying their own event
/// factory.
#[derive(Default)]
pub struct EmitterBuilder {
    options: EmitterOptions,
    target: Option<Arc<dyn EventTarget>>,
    event_factory: Option<Arc<dyn EventFactory>>,
}

impl EmitterBuilder {
    pub fn options(mut self, options: EmitterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn max_listeners(mut self, max_listeners: usize) -> Self {
        self.options.max_listeners = max_listeners;
        self
    }

    pub fn target(mut self, target: Arc<dyn EventTarget>) -> Self {
        self.target = Some(target);
        self
    }

    /// Factory used for native dispatch instead of the process-wide one.
    pub fn event_factory(mut self, factory: Arc<dyn EventFactory>) -> Self {
        self.event_factory = Some(factory);
        self
    }

    /// Build the emitter. If the target already has a live emitter, that
    /// emitter is returned and the builder's settings are ignored.
    pub fn build(self) -> EventEmitter {
        let Self {
            options,
            target,
            event_factory,
        } = self;

        let Some(target) = target else {
            return EventEmitter::create(TargetRef::Own, Capability::Pure, &options, event_factory);
        };

        attachments::get_or_attach(&target, || {
            let capability = Capability::detect(target.as_ref());
            EventEmitter::create(
                TargetRef::External(Arc::downgrade(&target)),
                capability,
                &options,
                event_factory,
            )
        })
    }
}
