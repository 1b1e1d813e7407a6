use std::sync::Arc;

use serde_json::Value;

use super::composite;
use super::{EventFactory, NativeEventTarget};
use crate::config::EmitOptions;
use crate::emitter::EventEmitter;
use crate::listener::Listener;

pub(crate) fn add_native_listener(
    emitter: &EventEmitter,
    native: &dyn NativeEventTarget,
    name: &str,
    listener: &Listener,
    capture: bool,
) {
    native.add_event_listener(name, listener, capture);
    if let Some(descriptor) = composite::lookup(name) {
        tracing::debug!(event = name, emitter = %emitter.id(), "composite add hook");
        descriptor.add_listener(emitter, name, listener, capture);
    }
}

pub(crate) fn remove_native_listener(
    emitter: &EventEmitter,
    native: &dyn NativeEventTarget,
    name: &str,
    listener: &Listener,
    capture: bool,
) {
    native.remove_event_listener(name, listener, capture);
    if let Some(descriptor) = composite::lookup(name) {
        tracing::debug!(event = name, emitter = %emitter.id(), "composite remove hook");
        descriptor.remove_listener(emitter, name, listener, capture);
    }
}

/// Build a native event for `name` and dispatch it. Without a factory there
/// is no event system to dispatch into and the call returns `false`.
pub(crate) fn dispatch_native_event(
    native: &dyn NativeEventTarget,
    factory: Option<Arc<dyn EventFactory>>,
    name: &str,
    data: Value,
    options: EmitOptions,
) -> bool {
    let Some(factory) = factory else {
        tracing::debug!(event = name, "no native event factory, dispatch skipped");
        return false;
    };
    let mut event = factory.create_event(name, options.bubbles, options.cancelable);
    event.attach_payload(data);
    native.dispatch_event(event)
}
