/// Failure reported by a single listener, either returned synchronously or
/// produced by the future it handed back.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<String> for ListenerError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<&str> for ListenerError {
    fn from(value: &str) -> Self {
        Self::Message(value.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("listener #{index} for '{event}' failed: {source}")]
    Listener {
        event: String,
        index: usize,
        #[source]
        source: ListenerError,
    },
}

impl EmitError {
    pub(crate) fn listener(event: &str, index: usize, source: ListenerError) -> Self {
        Self::Listener {
            event: event.to_string(),
            index,
            source,
        }
    }

    /// Name of the event whose emission failed.
    pub fn event(&self) -> &str {
        match self {
            Self::Listener { event, .. } => event,
        }
    }

    /// Position of the failing listener in registration order.
    pub fn index(&self) -> usize {
        match self {
            Self::Listener { index, .. } => *index,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
    #[error("config error: {0}")]
    Invalid(String),
}
