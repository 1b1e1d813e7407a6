use std::sync::{Arc, Mutex, Weak};

use emitkit::{
    BasicEventFactory, CompositeEvent, EmitOptions, EmitterOptions, Event, EventEmitter,
    EventTarget, Listener, NativeEvent, NativeEventTarget,
};
use serde_json::json;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    emitkit::init_logging();

    if let Err(error) = run().await {
        eprintln!("emitter demo failed: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let options = EmitterOptions::from_env().map_err(|e| e.to_string())?;
    tracing::info!(max_listeners = options.max_listeners, "starting emitter demo");

    round_trip(&options).map_err(|e| e.to_string())?;
    remove_one_of_two(&options).map_err(|e| e.to_string())?;
    serial_and_parallel(&options).await.map_err(|e| e.to_string())?;
    composite_on_native_target();
    Ok(())
}

/// `on` followed by `emit`.
fn round_trip(options: &EmitterOptions) -> Result<(), emitkit::EmitError> {
    let emitter = EventEmitter::with_options(options.clone());
    emitter.on(
        "greet",
        Listener::new(|event: &Event| {
            println!("greet received {}", event.data());
        }),
    );
    let stopped = emitter.emit("greet", json!({ "who": "world" }))?;
    println!("greet emitted, stop flag = {stopped}");
    Ok(())
}

/// Two listeners, one removed, one left to answer.
fn remove_one_of_two(options: &EmitterOptions) -> Result<(), emitkit::EmitError> {
    let emitter = EventEmitter::with_options(options.clone());
    let first = Listener::new(|_| println!("first listener"));
    let second = Listener::new(|_| println!("second listener"));
    emitter.on("tick", first.clone());
    emitter.on("tick", second);
    emitter.off("tick", &first);

    println!("tick has {} listener(s)", emitter.listener_count("tick"));
    emitter.emit("tick", json!(null))?;
    Ok(())
}

async fn serial_and_parallel(options: &EmitterOptions) -> Result<(), emitkit::EmitError> {
    let emitter = EventEmitter::with_options(options.clone());
    for (label, delay_ms) in [("slow", 40u64), ("fast", 5u64)] {
        emitter.on(
            "work",
            Listener::from_async(move |_| async move {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                Ok(json!(label))
            }),
        );
    }

    let stopped = emitter.emit_async("work", json!(null)).await?;
    println!("serial emission done, stopped early = {stopped}");
    let values = emitter.emit_parallel_values("work", json!(null)).await?;
    println!("parallel results in registration order: {values:?}");
    Ok(())
}

/// Minimal element that dispatches to whatever listeners it holds.
struct DemoElement {
    me: Weak<DemoElement>,
    listeners: Mutex<Vec<(String, Listener)>>,
}

impl DemoElement {
    fn new() -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            listeners: Mutex::new(Vec::new()),
        })
    }
}

impl EventTarget for DemoElement {
    fn as_native(&self) -> Option<&dyn NativeEventTarget> {
        Some(self)
    }
}

impl NativeEventTarget for DemoElement {
    fn add_event_listener(&self, name: &str, listener: &Listener, _capture: bool) {
        self.listeners
            .lock()
            .expect("demo listener mutex poisoned")
            .push((name.to_string(), listener.clone()));
    }

    fn remove_event_listener(&self, name: &str, listener: &Listener, _capture: bool) {
        let mut listeners = self.listeners.lock().expect("demo listener mutex poisoned");
        if let Some(index) = listeners
            .iter()
            .position(|(event, it)| event == name && it.ptr_eq(listener))
        {
            listeners.remove(index);
        }
    }

    fn dispatch_event(&self, event: NativeEvent) -> bool {
        let matching: Vec<Listener> = self
            .listeners
            .lock()
            .expect("demo listener mutex poisoned")
            .iter()
            .filter(|(name, _)| name == event.name())
            .map(|(_, listener)| listener.clone())
            .collect();
        let target = self.me.upgrade().map(|it| it as Arc<dyn EventTarget>);
        let view = Event::from_native(&event, target);
        for listener in matching {
            if let Err(e) = listener.call(&view) {
                tracing::warn!(event = event.name(), error = %e, "demo listener failed");
            }
        }
        true
    }
}

/// `press` is a composite event: its first listener also wires a
/// `pointerup` listener that re-emits as `press`.
fn composite_on_native_target() {
    EventEmitter::register(Arc::new(CompositeEvent::new("press").on_add(
        |emitter, _, _, _| {
            if emitter.listener_count("pointerup") > 0 {
                return;
            }
            let handle = emitter.clone();
            emitter.on(
                "pointerup",
                Listener::new(move |event: &Event| {
                    let _ = handle.emit_with(
                        "press",
                        event.data().clone(),
                        EmitOptions::new(true, false),
                    );
                }),
            );
        },
    )));

    let element = DemoElement::new();
    let emitter = EventEmitter::builder()
        .target(element.clone())
        .event_factory(Arc::new(BasicEventFactory))
        .build();
    println!("element emitter is {}", emitter.capability());

    emitter.on(
        "press",
        Listener::new(|event: &Event| println!("press at {}", event.data())),
    );
    emitter.emit("pointerup", json!({ "x": 12, "y": 34 })).ok();
}
