//! Listener values and the event record handed to them.
//!
//! A [`Listener`] wraps a shared callable. Identity is the identity of that
//! callable: clones of one `Listener` are the same listener, two listeners
//! built from identical closures are not. Keep a clone around to remove it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use crate::error::ListenerError;
use crate::native::{EventTarget, NativeEvent};

pub type ListenerFn = dyn Fn(&Event) -> Result<Reply, ListenerError> + Send + Sync;

/// What a listener hands back when invoked.
pub enum Reply {
    Ready(Value),
    Pending(BoxFuture<'static, Result<Value, ListenerError>>),
}

impl Reply {
    /// True only for a ready `false`. Pending replies never count.
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Ready(Value::Bool(false)))
    }

    /// Resolve to the listener's value, awaiting it if needed.
    pub async fn settle(self) -> Result<Value, ListenerError> {
        match self {
            Self::Ready(value) => Ok(value),
            Self::Pending(fut) => fut.await,
        }
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

pub(crate) fn is_stop_value(value: &Value) -> bool {
    matches!(value, Value::Bool(false))
}

/// Conversion from a listener closure's return type.
pub trait IntoReply {
    fn into_reply(self) -> Result<Reply, ListenerError>;
}

impl IntoReply for () {
    fn into_reply(self) -> Result<Reply, ListenerError> {
        Ok(Reply::Ready(Value::Null))
    }
}

impl IntoReply for bool {
    fn into_reply(self) -> Result<Reply, ListenerError> {
        Ok(Reply::Ready(Value::Bool(self)))
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> Result<Reply, ListenerError> {
        Ok(Reply::Ready(self))
    }
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply, ListenerError> {
        Ok(self)
    }
}

impl<T: IntoReply> IntoReply for Result<T, ListenerError> {
    fn into_reply(self) -> Result<Reply, ListenerError> {
        self.and_then(IntoReply::into_reply)
    }
}

#[derive(Clone)]
pub struct Listener {
    inner: Arc<ListenerFn>,
}

impl Listener {
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&Event) -> R + Send + Sync + 'static,
        R: IntoReply,
    {
        Self {
            inner: Arc::new(move |event: &Event| f(event).into_reply()),
        }
    }

    /// Listener whose result is produced by a future. The future cannot
    /// borrow the event; clone what it needs out of it first.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(&Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ListenerError>> + Send + 'static,
    {
        Self::new(move |event: &Event| Reply::Pending(f(event).boxed()))
    }

    pub fn call(&self, event: &Event) -> Result<Reply, ListenerError> {
        (self.inner)(event)
    }

    pub fn ptr_eq(&self, other: &Listener) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Arc::as_ptr(&self.inner) as *const ())
    }
}

/// The record every listener receives.
#[derive(Clone)]
pub struct Event {
    name: String,
    data: Value,
    target: Option<Arc<dyn EventTarget>>,
}

impl Event {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
            target: None,
        }
    }

    pub fn with_target(mut self, target: Option<Arc<dyn EventTarget>>) -> Self {
        self.target = target;
        self
    }

    /// View of a dispatched native event, for hosts invoking listeners
    /// they were handed through [`crate::NativeEventTarget`].
    pub fn from_native(event: &NativeEvent, target: Option<Arc<dyn EventTarget>>) -> Self {
        Self {
            name: event.name().to_string(),
            data: event.data().clone(),
            target,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// The object the event is raised for. `None` when the emitter is its
    /// own target.
    pub fn target(&self) -> Option<&Arc<dyn EventTarget>> {
        self.target.as_ref()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("data", &self.data)
            .field("has_target", &self.target.is_some())
            .finish()
    }
}
