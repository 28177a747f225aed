//! The request logging middleware.

use crate::context::{Outcome, RequestContext};
use crate::diagnostic::DiagnosticContext;
use crate::options::RequestLoggerOptions;
use crate::sink::{default_sink, LogEvent, LogProperty};
use relay_core::{BoxError, BoxFuture, Middleware, Next};
use std::marker::PhantomData;
use std::sync::Arc;

/// Middleware that emits one structured completion event per request.
///
/// Per invocation: a fresh [`RequestContext`] is created, the downstream
/// call is timed, enrichment runs against an ambient [`DiagnosticContext`]
/// with the downstream [`Outcome`] in view, and exactly one event is written
/// to the configured sink. The success and failure paths share the same
/// logging steps; they differ only in whether an error is attached and
/// whether the outcome is forwarded or replaced by the configured fallback.
///
/// Usually attached via
/// [`RequestLoggingExt`](crate::RequestLoggingExt) rather than constructed
/// directly.
pub struct RequestLoggerMiddleware<Req, Res> {
    options: Arc<RequestLoggerOptions<Res>>,
    _request: PhantomData<fn(Req)>,
}

impl<Req, Res> RequestLoggerMiddleware<Req, Res> {
    /// Create the middleware from validated options.
    pub fn new(options: Arc<RequestLoggerOptions<Res>>) -> Self {
        Self {
            options,
            _request: PhantomData,
        }
    }
}

impl<Req, Res> Clone for RequestLoggerMiddleware<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            _request: PhantomData,
        }
    }
}

impl<Req, Res> Middleware<Req, Res> for RequestLoggerMiddleware<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn call(&self, req: Req, next: Next<Req, Res>) -> BoxFuture<Result<Res, BoxError>> {
        let options = self.options.clone();

        Box::pin(async move {
            let mut context = RequestContext::new();
            let outcome = next(req).await;
            context.complete();

            let sink = options.sink.clone().unwrap_or_else(default_sink);
            let view = Outcome::new(outcome.as_ref());

            // Enrichment failures are deliberately not caught: a buggy
            // callback surfaces to the caller and nothing is emitted.
            let mut diagnostics = DiagnosticContext::new();
            if let Some(enrich) = &options.enrich {
                enrich(&mut diagnostics, &context, &view)?;
            }

            let properties = merge_properties(
                (options.template_properties)(&context, &view),
                diagnostics.into_properties(),
            );
            let error = view.error().map(|e| e.to_string());

            sink.write(LogEvent {
                level: options.level,
                template: options.message_template.clone(),
                properties,
                error,
            });

            match outcome {
                Ok(response) => Ok(response),
                Err(err) => match &options.fallback {
                    Some(fallback) => Ok(fallback()),
                    None => Err(err),
                },
            }
        })
    }

    fn clone_box(&self) -> Box<dyn Middleware<Req, Res>> {
        Box::new(self.clone())
    }
}

/// Diagnostic-context properties override template properties of the same
/// name; order of first appearance is preserved.
fn merge_properties(
    template: Vec<LogProperty>,
    diagnostics: Vec<LogProperty>,
) -> Vec<LogProperty> {
    let mut merged = template;
    for property in diagnostics {
        match merged.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => existing.value = property.value,
            None => merged.push(property),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn merge_appends_new_names() {
        let merged = merge_properties(
            vec![LogProperty::new("Id", "x")],
            vec![LogProperty::new("UserId", 42)],
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1], LogProperty::new("UserId", 42));
    }

    #[test]
    fn merge_lets_diagnostics_override_template_values() {
        let merged = merge_properties(
            vec![
                LogProperty::new("Id", "original"),
                LogProperty::new("Elapsed", 1.0),
            ],
            vec![LogProperty::new("Id", "overridden")],
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "Id");
        assert_eq!(merged[0].value, json!("overridden"));
        assert_eq!(merged[1].name, "Elapsed");
    }

    #[tokio::test]
    async fn emits_one_event_and_returns_the_response() {
        let sink = Arc::new(MemorySink::new());
        let options = Arc::new(RequestLoggerOptions::new().sink(sink.clone()));
        let middleware: RequestLoggerMiddleware<u32, u32> =
            RequestLoggerMiddleware::new(options);

        let next: Next<u32, u32> = Arc::new(|req: u32| {
            Box::pin(async move { Ok(req + 1) }) as BoxFuture<Result<u32, BoxError>>
        });

        let outcome = middleware.call(1, next).await;
        assert_eq!(outcome.unwrap(), 2);
        assert_eq!(sink.len(), 1);

        let event = sink.events().remove(0);
        assert!(event.error.is_none());
        assert!(event.property("Id").is_some());
        assert!(event.property("Elapsed").unwrap().as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn forwards_the_original_error_after_logging() {
        let sink = Arc::new(MemorySink::new());
        let options = Arc::new(RequestLoggerOptions::new().sink(sink.clone()));
        let middleware: RequestLoggerMiddleware<u32, u32> =
            RequestLoggerMiddleware::new(options);

        let next: Next<u32, u32> = Arc::new(|_req: u32| {
            Box::pin(async { Err::<u32, BoxError>("downstream failed".into()) })
                as BoxFuture<Result<u32, BoxError>>
        });

        let err = middleware.call(1, next).await.unwrap_err();
        assert_eq!(err.to_string(), "downstream failed");
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.events()[0].error.as_deref(), Some("downstream failed"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_merge_is_unique_and_diagnostics_win(
            template in proptest::collection::btree_map(0usize..6, any::<i64>(), 0..6),
            diagnostics in proptest::collection::btree_map(0usize..6, any::<i64>(), 0..6),
        ) {
            let names = ["A", "B", "C", "D", "E", "F"];
            let to_properties = |set: &BTreeMap<usize, i64>| -> Vec<LogProperty> {
                set.iter()
                    .map(|(name, value)| LogProperty::new(names[*name], *value))
                    .collect()
            };

            let merged = merge_properties(to_properties(&template), to_properties(&diagnostics));

            // One entry per distinct name.
            let mut union: Vec<usize> = template.keys().chain(diagnostics.keys()).copied().collect();
            union.sort_unstable();
            union.dedup();
            prop_assert_eq!(merged.len(), union.len());

            for property in &merged {
                let name = names.iter().position(|n| *n == property.name).unwrap();
                let expected = diagnostics.get(&name).or_else(|| template.get(&name)).unwrap();
                prop_assert_eq!(&property.value, &json!(*expected));
            }
        }
    }
}
