//! Fluent registration of the logging middleware on a pipeline.
//!
//! Options are resolved from the pipeline's registry (falling back to
//! defaults), configured exactly once, and validated here, so that
//! misconfiguration is a construction-time failure rather than a
//! per-request one.

use crate::middleware::RequestLoggerMiddleware;
use crate::options::RequestLoggerOptions;
use relay_core::RequestHandler;
use std::sync::Arc;
use thiserror::Error;

/// Registration-time failures. The pipeline is left without the middleware.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    #[error("MessageTemplate cannot be empty")]
    EmptyMessageTemplate,
}

/// Attaches request logging to a [`RequestHandler`].
pub trait RequestLoggingExt<Req, Res>: Sized {
    /// Attach the logging middleware with resolved (or default) options.
    fn use_request_logging(self) -> Result<Self, RegisterError>;

    /// Attach the logging middleware, applying `configure` to the resolved
    /// options first.
    fn use_request_logging_with<F>(self, configure: F) -> Result<Self, RegisterError>
    where
        F: FnOnce(RequestLoggerOptions<Res>) -> RequestLoggerOptions<Res>;
}

impl<Req, Res> RequestLoggingExt<Req, Res> for RequestHandler<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn use_request_logging(self) -> Result<Self, RegisterError> {
        self.use_request_logging_with(|options| options)
    }

    fn use_request_logging_with<F>(self, configure: F) -> Result<Self, RegisterError>
    where
        F: FnOnce(RequestLoggerOptions<Res>) -> RequestLoggerOptions<Res>,
    {
        let options = configure(resolve_options(&self));
        if options.message_template.is_empty() {
            return Err(RegisterError::EmptyMessageTemplate);
        }
        Ok(self.wrap(RequestLoggerMiddleware::new(Arc::new(options))))
    }
}

/// Look up pre-registered options in the pipeline's registry, or construct
/// defaults. Never fails.
fn resolve_options<Req, Res>(handler: &RequestHandler<Req, Res>) -> RequestLoggerOptions<Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    handler
        .registry()
        .get::<RequestLoggerOptions<Res>>()
        .map(|options| (*options).clone())
        .unwrap_or_default()
}
