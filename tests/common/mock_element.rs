// tests/common/mock_element.rs
//! A mock element with its own event system: listeners are kept per name,
//! capture listeners run before bubble listeners, and a listener returning
//! `false` cancels a cancelable event.

use std::sync::{Arc, Mutex, Weak};

use emitkit::{Event, EventTarget, Listener, NativeEvent, NativeEventTarget};

struct Registration {
    name: String,
    listener: Listener,
    capture: bool,
}

pub struct MockElement {
    me: Weak<MockElement>,
    tag: String,
    registrations: Mutex<Vec<Registration>>,
    dispatched: Mutex<Vec<NativeEvent>>,
}

impl MockElement {
    pub fn new(tag: &str) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            tag: tag.to_string(),
            registrations: Mutex::new(Vec::new()),
            dispatched: Mutex::new(Vec::new()),
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.registrations
            .lock()
            .unwrap()
            .iter()
            .filter(|it| it.name == name)
            .count()
    }

    pub fn dispatched_names(&self) -> Vec<String> {
        self.dispatched
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.name().to_string())
            .collect()
    }

    pub fn last_dispatched(&self) -> Option<NativeEvent> {
        self.dispatched.lock().unwrap().last().cloned()
    }
}

impl EventTarget for MockElement {
    fn as_native(&self) -> Option<&dyn NativeEventTarget> {
        Some(self)
    }
}

impl NativeEventTarget for MockElement {
    fn add_event_listener(&self, name: &str, listener: &Listener, capture: bool) {
        self.registrations.lock().unwrap().push(Registration {
            name: name.to_string(),
            listener: listener.clone(),
            capture,
        });
    }

    fn remove_event_listener(&self, name: &str, listener: &Listener, capture: bool) {
        let mut registrations = self.registrations.lock().unwrap();
        if let Some(index) = registrations
            .iter()
            .position(|it| it.name == name && it.capture == capture && it.listener.ptr_eq(listener))
        {
            registrations.remove(index);
        }
    }

    fn dispatch_event(&self, event: NativeEvent) -> bool {
        self.dispatched.lock().unwrap().push(event.clone());

        let mut listeners: Vec<(bool, Listener)> = self
            .registrations
            .lock()
            .unwrap()
            .iter()
            .filter(|it| it.name == event.name())
            .map(|it| (it.capture, it.listener.clone()))
            .collect();
        // Stable sort keeps registration order within each phase.
        listeners.sort_by_key(|(capture, _)| !*capture);

        let target = self.me.upgrade().map(|it| it as Arc<dyn EventTarget>);
        let view = Event::from_native(&event, target);
        let mut canceled = false;
        for (_, listener) in listeners {
            match listener.call(&view) {
                Ok(reply) if reply.is_stop() && event.cancelable() => canceled = true,
                Ok(_) => {}
                Err(e) => eprintln!("listener on <{}> failed: {e}", self.tag),
            }
        }
        !canceled
    }
}
