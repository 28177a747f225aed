//! Ambient per-request diagnostic context.

use crate::sink::LogProperty;
use serde_json::Value;

/// A per-request property bag passed to the enrichment callback.
///
/// Created fresh for every invocation and merged into the emitted event
/// after the downstream call resolves. Properties added here override
/// template properties of the same name.
#[derive(Debug, Default)]
pub struct DiagnosticContext {
    properties: Vec<LogProperty>,
}

impl DiagnosticContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Attach a property to the current request's log event.
    ///
    /// Pushing a name twice keeps the latest value.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.properties.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => self.properties.push(LogProperty { name, value }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub(crate) fn into_properties(self) -> Vec<LogProperty> {
        self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn push_preserves_insertion_order() {
        let mut diagnostics = DiagnosticContext::new();
        diagnostics.push("UserId", 42);
        diagnostics.push("Tenant", "acme");

        let properties = diagnostics.into_properties();
        assert_eq!(properties[0], LogProperty::new("UserId", 42));
        assert_eq!(properties[1], LogProperty::new("Tenant", "acme"));
    }

    #[test]
    fn repeated_push_keeps_latest_value() {
        let mut diagnostics = DiagnosticContext::new();
        diagnostics.push("UserId", 1);
        diagnostics.push("UserId", 2);

        let properties = diagnostics.into_properties();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].value, json!(2));
    }
}
