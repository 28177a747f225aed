//! Request logging middleware for relay pipelines.
//!
//! Wraps a pipeline's downstream stages in a per-request measurement and
//! emits exactly one structured completion event per invocation, success or
//! failure, using a configurable message template and property set.
//!
//! # Example
//!
//! ```rust
//! use relay_core::{BoxError, RequestHandler};
//! use relay_log::RequestLoggingExt;
//!
//! async fn respond(req: String) -> Result<String, BoxError> {
//!     Ok(req.to_uppercase())
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let handler = RequestHandler::new(respond)
//!     .use_request_logging()
//!     .expect("valid logging options");
//!
//! // Emits "Request <id> completed in <elapsed> ms" at INFO.
//! let _ = handler.invoke("hi".to_string()).await;
//! # }
//! ```
//!
//! Configuration follows the builder style of [`RequestLoggerOptions`]:
//!
//! ```rust
//! use relay_core::{BoxError, RequestHandler};
//! use relay_log::{LogProperty, RequestLoggingExt};
//! use tracing::Level;
//!
//! # async fn respond(req: String) -> Result<String, BoxError> { Ok(req) }
//! # fn build() -> Result<(), relay_log::RegisterError> {
//! let handler = RequestHandler::new(respond).use_request_logging_with(|options| {
//!     options
//!         .level(Level::DEBUG)
//!         .message_template("Handled {Id} with {Verdict} in {Elapsed} ms")
//!         .enrich(|diagnostics, _context, outcome| {
//!             diagnostics.push("Verdict", if outcome.is_success() { "ok" } else { "failed" });
//!             Ok(())
//!         })
//! })?;
//! # let _ = handler; Ok(())
//! # }
//! ```

mod context;
mod diagnostic;
mod middleware;
mod options;
mod register;
mod sink;

// Public API
pub use context::{Outcome, RequestContext};
pub use diagnostic::DiagnosticContext;
pub use middleware::RequestLoggerMiddleware;
pub use options::{RequestLoggerOptions, DEFAULT_MESSAGE_TEMPLATE};
pub use register::{RegisterError, RequestLoggingExt};
pub use sink::{LogEvent, LogProperty, LogSink, MemorySink, TracingSink};
