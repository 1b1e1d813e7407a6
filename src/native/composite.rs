//! Process-wide registry of composite events.
//!
//! A composite event is a name whose native registration is augmented by a
//! descriptor, e.g. a `swipe` that really listens to `touchstart` and
//! `touchmove`. Feature modules register descriptors at start-up; every
//! native-capable emitter consults the registry when a listener is added or
//! removed. Registering a name again replaces the previous descriptor.
//!
//! The registry is never torn down. Register before emitters start adding
//! listeners for the affected names: a descriptor only sees registrations
//! made after it was installed.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::emitter::EventEmitter;
use crate::listener::Listener;

static COMPOSITE_EVENTS: OnceLock<DashMap<String, Arc<dyn EventDescriptor>>> = OnceLock::new();

fn composite_events() -> &'static DashMap<String, Arc<dyn EventDescriptor>> {
    COMPOSITE_EVENTS.get_or_init(DashMap::new)
}

/// One or more event names. A single string may list several names
/// separated by commas; names given as a list are taken as they are.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventNames(Vec<String>);

impl EventNames {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

impl From<&str> for EventNames {
    fn from(value: &str) -> Self {
        Self(split_names(value))
    }
}

impl From<String> for EventNames {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Vec<String>> for EventNames {
    fn from(value: Vec<String>) -> Self {
        Self(value.into_iter().filter(|name| !name.is_empty()).collect())
    }
}

impl From<&[&str]> for EventNames {
    fn from(value: &[&str]) -> Self {
        Self(
            value
                .iter()
                .filter(|name| !name.is_empty())
                .map(|name| name.to_string())
                .collect(),
        )
    }
}

impl<const N: usize> From<[&str; N]> for EventNames {
    fn from(value: [&str; N]) -> Self {
        Self::from(&value[..])
    }
}

/// Hooks run when a listener for one of [`EventDescriptor::name`] is added
/// to or removed from a native-capable emitter, right after the native
/// registration itself.
pub trait EventDescriptor: Send + Sync {
    fn name(&self) -> EventNames;

    fn add_listener(&self, emitter: &EventEmitter, name: &str, listener: &Listener, capture: bool);

    fn remove_listener(
        &self,
        emitter: &EventEmitter,
        name: &str,
        listener: &Listener,
        capture: bool,
    );
}

type HookFn = dyn Fn(&EventEmitter, &str, &Listener, bool) + Send + Sync;

/// Descriptor assembled from closures.
pub struct CompositeEvent {
    names: EventNames,
    on_add: Option<Arc<HookFn>>,
    on_remove: Option<Arc<HookFn>>,
}

impl CompositeEvent {
    pub fn new(names: impl Into<EventNames>) -> Self {
        Self {
            names: names.into(),
            on_add: None,
            on_remove: None,
        }
    }

    pub fn on_add<F>(mut self, hook: F) -> Self
    where
        F: Fn(&EventEmitter, &str, &Listener, bool) + Send + Sync + 'static,
    {
        self.on_add = Some(Arc::new(hook));
        self
    }

    pub fn on_remove<F>(mut self, hook: F) -> Self
    where
        F: Fn(&EventEmitter, &str, &Listener, bool) + Send + Sync + 'static,
    {
        self.on_remove = Some(Arc::new(hook));
        self
    }
}

impl EventDescriptor for CompositeEvent {
    fn name(&self) -> EventNames {
        self.names.clone()
    }

    fn add_listener(&self, emitter: &EventEmitter, name: &str, listener: &Listener, capture: bool) {
        if let Some(hook) = &self.on_add {
            hook(emitter, name, listener, capture);
        }
    }

    fn remove_listener(
        &self,
        emitter: &EventEmitter,
        name: &str,
        listener: &Listener,
        capture: bool,
    ) {
        if let Some(hook) = &self.on_remove {
            hook(emitter, name, listener, capture);
        }
    }
}

/// Install `descriptor` under every name it governs. Does nothing when it
/// governs none.
pub fn register(descriptor: Arc<dyn EventDescriptor>) {
    let names = descriptor.name();
    if names.is_empty() {
        tracing::debug!("composite event descriptor without names ignored");
        return;
    }
    let events = composite_events();
    for name in names.iter() {
        if events.insert(name.to_string(), descriptor.clone()).is_some() {
            tracing::debug!(event = name, "composite event descriptor replaced");
        }
    }
}

pub fn define_event(descriptor: Arc<dyn EventDescriptor>) {
    register(descriptor)
}

pub fn lookup(name: &str) -> Option<Arc<dyn EventDescriptor>> {
    composite_events().get(name).map(|entry| entry.value().clone())
}

pub fn is_registered(name: &str) -> bool {
    composite_events().contains_key(name)
}
