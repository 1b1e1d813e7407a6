//! Event emitter library.
//!
//! An [`EventEmitter`] keeps named, ordered listener lists and invokes them
//! in one of three ways:
//! - `emit`: synchronous, every listener runs, `false` raises a stop flag
//! - `emit_async`: one listener at a time, each awaited, `false` stops early
//! - `emit_parallel`: all listeners started at once, results gathered in
//!   registration order
//!
//! # Architecture
//!
//! The same API covers targets with and without their own event system:
//! - `registry`: per-event listener lists
//! - `emitter`: registration, emission, and the target → emitter map
//! - `native`: bridge onto targets that can dispatch events themselves,
//!   and the process-wide composite event registry
//! - `config`: emitter options and native dispatch flags
//! - `error`: error types

pub mod config;
pub mod emitter;
pub mod error;
pub mod listener;
pub mod native;
mod registry;

#[cfg(test)]
mod testing;

pub use config::{EmitOptions, EmitterOptions, DEFAULT_MAX_LISTENERS};
pub use emitter::{EmitterBuilder, EventEmitter};
pub use error::{ConfigError, EmitError, ListenerError};
pub use listener::{Event, IntoReply, Listener, Reply};
pub use native::composite::{CompositeEvent, EventDescriptor, EventNames};
pub use native::{
    BasicEventFactory, Capability, EventFactory, EventTarget, NativeEvent, NativeEventTarget,
};

/// Install a `tracing` subscriber filtered by `RUST_LOG`, defaulting to
/// debug output for this crate.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emitkit=debug,info".parse().expect("valid env filter")),
        )
        .init();
}
