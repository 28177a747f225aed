//! # Relay Core
//!
//! Core library providing the foundational types for relay pipelines: the
//! generic [`Handler`] trait, the [`Middleware`] chain, and the
//! [`RequestHandler`] that ties them together.
//!
//! A pipeline is built once, ahead of traffic, and then invoked with opaque
//! request payloads:
//!
//! ```rust
//! use relay_core::{BoxError, RequestHandler};
//!
//! async fn upcase(req: String) -> Result<String, BoxError> {
//!     Ok(req.to_uppercase())
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let handler = RequestHandler::new(upcase);
//! assert_eq!(handler.invoke("hi".to_string()).await.unwrap(), "HI");
//! # }
//! ```

mod handler;
pub mod middleware;
mod pipeline;
mod registry;

// Public API
pub use handler::{BoxError, BoxFuture, Handler};
pub use middleware::{Middleware, MiddlewareStack, Next};
pub use pipeline::RequestHandler;
pub use registry::Registry;
