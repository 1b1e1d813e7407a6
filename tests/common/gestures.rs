// tests/common/gestures.rs
//! A `swipe` composite event built from `touchstart` and `touchend`.
//!
//! Adding the first `swipe` listener to an emitter wires two touch
//! listeners onto it; removing the last one unwires them. A horizontal
//! travel of at least `SWIPE_THRESHOLD` emits `swipe` with the direction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use emitkit::{CompositeEvent, EmitOptions, EventEmitter, Listener};
use serde_json::{json, Value};
use uuid::Uuid;

pub const SWIPE_THRESHOLD: f64 = 30.0;

struct TouchWiring {
    start: Listener,
    end: Listener,
}

pub fn swipe_descriptor(name: &str) -> CompositeEvent {
    let wiring: Arc<Mutex<HashMap<Uuid, TouchWiring>>> = Arc::new(Mutex::new(HashMap::new()));
    let swipe_name = name.to_string();

    let on_add = {
        let wiring = wiring.clone();
        move |emitter: &EventEmitter, _: &str, _: &Listener, _: bool| {
            let mut wiring = wiring.lock().unwrap();
            if wiring.contains_key(&emitter.id()) {
                return;
            }

            let origin = Arc::new(Mutex::new(None::<f64>));
            let start = {
                let origin = origin.clone();
                Listener::new(move |event| {
                    *origin.lock().unwrap() = event.data().get("x").and_then(Value::as_f64);
                })
            };
            let end = {
                let origin = origin.clone();
                let handle = emitter.clone();
                let swipe_name = swipe_name.clone();
                Listener::new(move |event| {
                    let Some(start_x) = origin.lock().unwrap().take() else {
                        return;
                    };
                    let Some(end_x) = event.data().get("x").and_then(Value::as_f64) else {
                        return;
                    };
                    let travel = end_x - start_x;
                    if travel.abs() < SWIPE_THRESHOLD {
                        return;
                    }
                    let direction = if travel > 0.0 { "right" } else { "left" };
                    let _ = handle.emit_with(
                        &swipe_name,
                        json!({ "direction": direction, "distance": travel.abs() }),
                        EmitOptions::new(true, false),
                    );
                })
            };

            emitter.on("touchstart", start.clone());
            emitter.on("touchend", end.clone());
            wiring.insert(emitter.id(), TouchWiring { start, end });
        }
    };

    let on_remove = move |emitter: &EventEmitter, name: &str, _: &Listener, _: bool| {
        // The local entry is dropped after this hook runs, so one left means
        // this removal takes the last swipe listener.
        if emitter.listener_count(name) > 1 {
            return;
        }
        let Some(touch) = wiring.lock().unwrap().remove(&emitter.id()) else {
            return;
        };
        emitter.off("touchstart", &touch.start);
        emitter.off("touchend", &touch.end);
    };

    CompositeEvent::new(name).on_add(on_add).on_remove(on_remove)
}
