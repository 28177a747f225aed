//! Configuration for the request logging middleware.

use crate::context::{Outcome, RequestContext};
use crate::diagnostic::DiagnosticContext;
use crate::sink::{LogProperty, LogSink};
use relay_core::BoxError;
use std::sync::Arc;
use tracing::Level;

/// Message template used when no custom one is configured.
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "Request {Id} completed in {Elapsed} ms";

/// Produces the template properties for a completed request.
pub type PropertiesFn<Res> =
    dyn Fn(&RequestContext, &Outcome<'_, Res>) -> Vec<LogProperty> + Send + Sync;

/// Enriches the diagnostic context once per request, after the downstream
/// call resolves. Errors are not caught by the middleware.
pub type EnrichFn<Res> = dyn Fn(&mut DiagnosticContext, &RequestContext, &Outcome<'_, Res>) -> Result<(), BoxError>
    + Send
    + Sync;

/// Produces the replacement response when error suppression is configured.
pub type FallbackFn<Res> = dyn Fn() -> Res + Send + Sync;

/// Configuration for [`RequestLoggerMiddleware`].
///
/// Resolved once at registration time and immutable afterwards; the
/// middleware shares it read-only across all concurrent invocations.
///
/// [`RequestLoggerMiddleware`]: crate::RequestLoggerMiddleware
pub struct RequestLoggerOptions<Res> {
    pub(crate) message_template: String,
    pub(crate) template_properties: Arc<PropertiesFn<Res>>,
    pub(crate) enrich: Option<Arc<EnrichFn<Res>>>,
    pub(crate) level: Level,
    pub(crate) sink: Option<Arc<dyn LogSink>>,
    pub(crate) fallback: Option<Arc<FallbackFn<Res>>>,
}

impl<Res> Clone for RequestLoggerOptions<Res> {
    fn clone(&self) -> Self {
        Self {
            message_template: self.message_template.clone(),
            template_properties: self.template_properties.clone(),
            enrich: self.enrich.clone(),
            level: self.level,
            sink: self.sink.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

impl<Res: 'static> Default for RequestLoggerOptions<Res> {
    fn default() -> Self {
        Self {
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
            template_properties: Arc::new(default_template_properties::<Res>),
            enrich: None,
            level: Level::INFO,
            sink: None,
            fallback: None,
        }
    }
}

impl<Res: 'static> RequestLoggerOptions<Res> {
    /// Create options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom message template.
    ///
    /// The template must only reference property names that the property
    /// function actually produces; unmatched placeholders are rendered
    /// verbatim.
    pub fn message_template(mut self, template: impl Into<String>) -> Self {
        self.message_template = template.into();
        self
    }

    /// Replace the function computing the template properties.
    ///
    /// The default emits exactly `Id` (the request identifier) and
    /// `Elapsed` (fractional milliseconds). The [`Outcome`] carries the
    /// downstream response or error for payload-derived properties.
    pub fn template_properties<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestContext, &Outcome<'_, Res>) -> Vec<LogProperty> + Send + Sync + 'static,
    {
        self.template_properties = Arc::new(f);
        self
    }

    /// Set a per-request enrichment callback.
    ///
    /// Runs once per request against the ambient [`DiagnosticContext`], with
    /// the [`Outcome`] of the downstream call in view; properties it adds
    /// override template properties of the same name. An `Err` from the
    /// callback propagates to the caller and nothing is emitted for that
    /// request.
    pub fn enrich<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut DiagnosticContext, &RequestContext, &Outcome<'_, Res>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.enrich = Some(Arc::new(f));
        self
    }

    /// Set the level of the completion event. Defaults to `INFO`.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Route events to an explicit sink instead of the process-wide default.
    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Swallow downstream errors after logging them, returning the response
    /// type's default value instead. Without this (the default behaviour)
    /// a downstream error propagates unchanged after being logged.
    pub fn suppress_errors(self) -> Self
    where
        Res: Default,
    {
        self.suppress_errors_with(Res::default)
    }

    /// Swallow downstream errors after logging them, returning `fallback()`
    /// instead. Lets suppression be configured for response types without a
    /// `Default` value.
    pub fn suppress_errors_with<F>(mut self, fallback: F) -> Self
    where
        F: Fn() -> Res + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }
}

fn default_template_properties<Res>(
    context: &RequestContext,
    _outcome: &Outcome<'_, Res>,
) -> Vec<LogProperty> {
    vec![
        LogProperty::new("Id", context.id().to_string()),
        LogProperty::new("Elapsed", context.elapsed_ms()),
    ]
}
