//! Emission.
//!
//! Three disciplines over a snapshot of the listener list:
//!
//! - `emit`: every listener, in order, synchronously. A listener returning
//!   `false` raises the stop flag but does not interrupt the loop.
//! - `emit_async` (alias `emit_serial`): one listener at a time, each result
//!   awaited. A settled `false` ends the emission early.
//! - `emit_parallel`: every listener invoked up front, results awaited
//!   together and reported in registration order.
//!
//! On a native-capable emitter all three build a native event and hand it to
//! the target's dispatch primitive; the return value is whatever that
//! primitive says (`true` = not canceled).

use std::future::Future;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use serde_json::Value;

use super::EventEmitter;
use crate::config::EmitOptions;
use crate::error::{EmitError, ListenerError};
use crate::listener::{is_stop_value, Reply};
use crate::native::{self, dispatch_native_event};

impl EventEmitter {
    // -----------------------------------------------------------------------
    // Sync
    // -----------------------------------------------------------------------

    /// Invoke every listener of `name` with `data`. Returns `true` if any of
    /// them returned `false`.
    ///
    /// The first listener error is returned at once and the remaining
    /// listeners are skipped. Pending results are not awaited; they are
    /// spawned on the current tokio runtime. Outside a runtime the body of an
    /// async listener never runs and a warning is logged.
    pub fn emit(&self, name: &str, data: Value) -> Result<bool, EmitError> {
        self.emit_with(name, data, EmitOptions::default())
    }

    pub fn emit_with(
        &self,
        name: &str,
        data: Value,
        options: EmitOptions,
    ) -> Result<bool, EmitError> {
        if self.is_native() {
            return Ok(self.dispatch_native(name, data, options));
        }

        let listeners = self.lock_listeners().snapshot(name);
        if listeners.is_empty() {
            return Ok(false);
        }

        let event = self.make_event(name, data);
        let mut stop = false;
        for (index, listener) in listeners.iter().enumerate() {
            let reply = listener
                .call(&event)
                .map_err(|e| EmitError::listener(name, index, e))?;
            match reply {
                Reply::Ready(value) => {
                    if is_stop_value(&value) {
                        stop = true;
                    }
                }
                Reply::Pending(fut) => detach_pending(name, fut),
            }
        }
        tracing::trace!(event = name, listeners = listeners.len(), stop, "emitted");
        Ok(stop)
    }

    /// Like [`EventEmitter::emit`], but returns each listener's reply in
    /// registration order. Pending replies are left to the caller.
    ///
    /// Native listeners' results are not observable; on a native-capable
    /// emitter the event is dispatched and the vector is empty. Whether the
    /// native event was canceled is only reported by [`EventEmitter::emit_with`].
    pub fn emit_values(&self, name: &str, data: Value) -> Result<Vec<Reply>, EmitError> {
        if self.is_native() {
            self.dispatch_native(name, data, EmitOptions::default());
            return Ok(Vec::new());
        }

        let listeners = self.lock_listeners().snapshot(name);
        if listeners.is_empty() {
            return Ok(Vec::new());
        }

        let event = self.make_event(name, data);
        listeners
            .iter()
            .enumerate()
            .map(|(index, listener)| {
                listener
                    .call(&event)
                    .map_err(|e| EmitError::listener(name, index, e))
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Serial
    // -----------------------------------------------------------------------

    /// Invoke listeners one after another, awaiting each result before
    /// starting the next. Stops at the first listener that settles to
    /// `false` (returning `true`) or fails (returning the error).
    pub async fn emit_async(&self, name: &str, data: Value) -> Result<bool, EmitError> {
        self.emit_async_with(name, data, EmitOptions::default()).await
    }

    pub async fn emit_serial(&self, name: &str, data: Value) -> Result<bool, EmitError> {
        self.emit_async(name, data).await
    }

    pub async fn emit_async_with(
        &self,
        name: &str,
        data: Value,
        options: EmitOptions,
    ) -> Result<bool, EmitError> {
        if self.is_native() {
            return Ok(self.dispatch_native(name, data, options));
        }

        let listeners = self.lock_listeners().snapshot(name);
        if listeners.is_empty() {
            return Ok(false);
        }

        let event = self.make_event(name, data);
        for (index, listener) in listeners.iter().enumerate() {
            let value = listener
                .call(&event)
                .map_err(|e| EmitError::listener(name, index, e))?
                .settle()
                .await
                .map_err(|e| EmitError::listener(name, index, e))?;
            if is_stop_value(&value) {
                tracing::trace!(event = name, index, "serial emission stopped");
                return Ok(true);
            }
        }
        Ok(false)
    }

    // -----------------------------------------------------------------------
    // Parallel
    // -----------------------------------------------------------------------

    /// Invoke every listener, then wait for all results. Returns `true` if
    /// any settled to `false`.
    ///
    /// Fails with the first failure observed. Results still outstanding at
    /// that point keep running on the current tokio runtime.
    pub async fn emit_parallel(&self, name: &str, data: Value) -> Result<bool, EmitError> {
        self.emit_parallel_with(name, data, EmitOptions::default()).await
    }

    pub async fn emit_parallel_with(
        &self,
        name: &str,
        data: Value,
        options: EmitOptions,
    ) -> Result<bool, EmitError> {
        if self.is_native() {
            return Ok(self.dispatch_native(name, data, options));
        }
        let values = self.run_parallel(name, data).await?;
        Ok(values.iter().any(is_stop_value))
    }

    /// Like [`EventEmitter::emit_parallel`], but resolves to every result in
    /// registration order, whatever order they completed in.
    ///
    /// On a native-capable emitter the event is dispatched and the vector is
    /// empty; use [`EventEmitter::emit_parallel_with`] for the cancel result.
    pub async fn emit_parallel_values(
        &self,
        name: &str,
        data: Value,
    ) -> Result<Vec<Value>, EmitError> {
        if self.is_native() {
            self.dispatch_native(name, data, EmitOptions::default());
            return Ok(Vec::new());
        }
        self.run_parallel(name, data).await
    }

    async fn run_parallel(&self, name: &str, data: Value) -> Result<Vec<Value>, EmitError> {
        let listeners = self.lock_listeners().snapshot(name);
        if listeners.is_empty() {
            return Ok(Vec::new());
        }

        let event = self.make_event(name, data);
        let mut values: Vec<Option<Value>> = vec![None; listeners.len()];
        let mut pending = FuturesUnordered::new();

        for (index, listener) in listeners.iter().enumerate() {
            match listener.call(&event) {
                Ok(Reply::Ready(value)) => values[index] = Some(value),
                Ok(Reply::Pending(fut)) => pending.push(fut.map(move |result| (index, result))),
                Err(e) => {
                    detach_remaining(name, pending);
                    return Err(EmitError::listener(name, index, e));
                }
            }
        }

        while let Some((index, result)) = pending.next().await {
            match result {
                Ok(value) => values[index] = Some(value),
                Err(e) => {
                    detach_remaining(name, pending);
                    return Err(EmitError::listener(name, index, e));
                }
            }
        }

        tracing::trace!(event = name, listeners = listeners.len(), "parallel emission settled");
        Ok(values
            .into_iter()
            .map(|value| value.unwrap_or(Value::Null))
            .collect())
    }

    // -----------------------------------------------------------------------
    // Native
    // -----------------------------------------------------------------------

    fn dispatch_native(&self, name: &str, data: Value, options: EmitOptions) -> bool {
        let factory = self
            .inner
            .event_factory
            .clone()
            .or_else(native::event_factory);
        self.with_native(|target| dispatch_native_event(target, factory, name, data, options))
            .unwrap_or(false)
    }
}

/// Keep a pending result running after its emission stopped caring.
fn detach_pending(name: &str, fut: BoxFuture<'static, Result<Value, ListenerError>>) {
    let event = name.to_string();
    spawn_detached(name, async move {
        if let Err(e) = fut.await {
            tracing::warn!(event = %event, error = %e, "detached listener failed");
        }
    });
}

fn detach_remaining<F>(name: &str, mut rest: FuturesUnordered<F>)
where
    F: Future<Output = (usize, Result<Value, ListenerError>)> + Send + 'static,
{
    if rest.is_empty() {
        return;
    }
    let event = name.to_string();
    spawn_detached(name, async move {
        while let Some((index, result)) = rest.next().await {
            if let Err(e) = result {
                tracing::debug!(event = %event, index, error = %e, "listener failed after emission ended");
            }
        }
    });
}

fn spawn_detached<F>(name: &str, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(fut);
        }
        Err(_) => {
            tracing::warn!(event = name, "no tokio runtime, pending listener result dropped");
        }
    }
}
