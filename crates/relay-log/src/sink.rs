//! Structured log events and the sink abstraction.
//!
//! The middleware assembles a [`LogEvent`] per request and hands it to a
//! [`LogSink`]. The default sink forwards rendered events to `tracing`;
//! [`MemorySink`] captures them for assertions.

use serde_json::Value;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::Level;

/// A single named property attached to a log event.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LogProperty {
    pub name: String,
    pub value: Value,
}

impl LogProperty {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One structured log record: level, message template, property set, and an
/// optional downstream error.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: Level,
    pub template: String,
    pub properties: Vec<LogProperty>,
    pub error: Option<String>,
}

impl LogEvent {
    /// Look up a property value by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Render the message template against the property set.
    ///
    /// `{Name}` placeholders are substituted with the matching property
    /// value; placeholders with no matching property are left verbatim, so a
    /// template/property mismatch degrades to visible text instead of
    /// failing.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let name = &after[..close];
                    match self.property(name) {
                        Some(value) => out.push_str(&render_value(value)),
                        None => {
                            out.push('{');
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    // Unterminated placeholder; emit the tail as-is.
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }

        out.push_str(rest);
        out
    }

    /// Serialize the event for machine consumption: rendered message, level,
    /// the full property set, and the error string if one was recorded.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "level": self.level.to_string(),
            "message": self.render(),
            "properties": self.properties,
            "error": self.error,
        })
    }
}

/// Fractional numbers render fixed-point with four decimals, matching the
/// default `Elapsed` formatting; everything else uses its natural form.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) => format!("{f:.4}"),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Destination for completed log events.
///
/// Sinks must be safe for concurrent use; one sink instance serves every
/// invocation of the pipeline it is attached to.
pub trait LogSink: Send + Sync {
    fn write(&self, event: LogEvent);
}

/// The process-wide default sink, used when options carry no explicit one.
pub(crate) fn default_sink() -> Arc<dyn LogSink> {
    static DEFAULT: OnceLock<Arc<dyn LogSink>> = OnceLock::new();
    DEFAULT.get_or_init(|| Arc::new(TracingSink)).clone()
}

/// Sink that forwards rendered events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, event: LogEvent) {
        let message = event.render();
        // The tracing macros need a const level, hence the fan-out.
        match (event.level, event.error.as_deref()) {
            (Level::TRACE, None) => tracing::trace!("{message}"),
            (Level::TRACE, Some(error)) => tracing::trace!(error, "{message}"),
            (Level::DEBUG, None) => tracing::debug!("{message}"),
            (Level::DEBUG, Some(error)) => tracing::debug!(error, "{message}"),
            (Level::INFO, None) => tracing::info!("{message}"),
            (Level::INFO, Some(error)) => tracing::info!(error, "{message}"),
            (Level::WARN, None) => tracing::warn!("{message}"),
            (Level::WARN, Some(error)) => tracing::warn!(error, "{message}"),
            (Level::ERROR, None) => tracing::error!("{message}"),
            (Level::ERROR, Some(error)) => tracing::error!(error, "{message}"),
        }
    }
}

/// Sink that buffers events in memory, for tests and assertions.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured events.
    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LogSink for MemorySink {
    fn write(&self, event: LogEvent) {
        self.lock().push(event);
    }
}
