//! Native event targets and the bridge onto them.
//!
//! A target is "native" when it can register, unregister and dispatch
//! events on its own (a DOM node, a widget tree, a host object). Emitters
//! attached to such a target forward every registration to it and hand
//! emission over to its dispatch primitive instead of calling listeners
//! themselves.
//!
//! Native events are built by an [`EventFactory`]. Without one, native
//! emission does nothing: there is no event system to dispatch into.

mod bridge;
pub mod composite;


use std::sync::{Arc, OnceLock, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::listener::Listener;

pub(crate) use bridge::{add_native_listener, dispatch_native_event, remove_native_listener};

/// Field under which the emitted payload is attached to a native event.
pub const DATA_FIELD: &str = "data";

/// Anything an emitter can raise events for.
///
/// Plain objects only need the marker impl. Targets with their own event
/// system return themselves from [`EventTarget::as_native`].
pub trait EventTarget: Send + Sync + 'static {
    fn as_native(&self) -> Option<&dyn NativeEventTarget> {
        None
    }
}

/// The three primitives a native event system exposes.
pub trait NativeEventTarget: Send + Sync {
    fn add_event_listener(&self, name: &str, listener: &Listener, capture: bool);

    /// Must match on the exact listener passed to `add_event_listener`.
    fn remove_event_listener(&self, name: &str, listener: &Listener, capture: bool);

    /// Returns `false` if a listener canceled the event.
    fn dispatch_event(&self, event: NativeEvent) -> bool;
}

/// Decided once, when the emitter is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Native,
    Pure,
}

impl Capability {
    pub fn detect(target: &dyn EventTarget) -> Self {
        if target.as_native().is_some() {
            Self::Native
        } else {
            Self::Pure
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Pure => "pure",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NativeEvent {
    name: String,
    bubbles: bool,
    cancelable: bool,
    time_stamp: DateTime<Utc>,
    fields: Map<String, Value>,
    data: Value,
}

impl NativeEvent {
    pub fn new(name: impl Into<String>, bubbles: bool, cancelable: bool) -> Self {
        Self {
            name: name.into(),
            bubbles,
            cancelable,
            time_stamp: Utc::now(),
            fields: Map::new(),
            data: Value::Null,
        }
    }

    /// Copy the payload's top-level fields onto the event, skipping the
    /// reserved `data` key, then attach the whole payload under `data`.
    pub fn attach_payload(&mut self, payload: Value) {
        if let Value::Object(map) = &payload {
            for (key, value) in map {
                if key == DATA_FIELD {
                    continue;
                }
                self.fields.insert(key.clone(), value.clone());
            }
        }
        self.data = payload;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    pub fn time_stamp(&self) -> DateTime<Utc> {
        self.time_stamp
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Host hook that builds a blank native event.
pub trait EventFactory: Send + Sync {
    fn create_event(&self, name: &str, bubbles: bool, cancelable: bool) -> NativeEvent;
}

/// Factory producing plain [`NativeEvent`] records.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicEventFactory;

impl EventFactory for BasicEventFactory {
    fn create_event(&self, name: &str, bubbles: bool, cancelable: bool) -> NativeEvent {
        NativeEvent::new(name, bubbles, cancelable)
    }
}

static EVENT_FACTORY: OnceLock<RwLock<Option<Arc<dyn EventFactory>>>> = OnceLock::new();

fn factory_slot() -> &'static RwLock<Option<Arc<dyn EventFactory>>> {
    EVENT_FACTORY.get_or_init(|| RwLock::new(None))
}

/// Install the process-wide factory used by emitters that were not given
/// one of their own.
pub fn install_event_factory(factory: Arc<dyn EventFactory>) {
    let mut slot = factory_slot().write().expect("event factory lock poisoned");
    *slot = Some(factory);
}

pub fn clear_event_factory() {
    let mut slot = factory_slot().write().expect("event factory lock poisoned");
    *slot = None;
}

pub fn event_factory() -> Option<Arc<dyn EventFactory>> {
    factory_slot()
        .read()
        .expect("event factory lock poisoned")
        .clone()
}
