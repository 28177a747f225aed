//! The request handler pipeline.
//!
//! A [`RequestHandler`] owns a terminal handler, an ordered middleware stack,
//! and a [`Registry`] of construction-time values. It is built fluently once,
//! then shared read-only across concurrent invocations.

use crate::handler::{BoxError, BoxedHandler, Handler};
use crate::middleware::{Middleware, MiddlewareStack, Next};
use crate::registry::Registry;
use std::sync::Arc;

/// A generic request/response pipeline.
///
/// `Req` and `Res` are opaque payload types; the pipeline never inspects
/// them.
///
/// # Example
///
/// ```rust
/// use relay_core::{BoxError, RequestHandler};
///
/// async fn greet(name: String) -> Result<String, BoxError> {
///     Ok(format!("hello {name}"))
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let handler = RequestHandler::new(greet);
/// assert_eq!(handler.invoke("world".into()).await.unwrap(), "hello world");
/// # }
/// ```
pub struct RequestHandler<Req, Res> {
    handler: BoxedHandler<Req, Res>,
    stack: MiddlewareStack<Req, Res>,
    registry: Registry,
}

impl<Req, Res> RequestHandler<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    /// Create a pipeline around a terminal handler.
    pub fn new<H>(handler: H) -> Self
    where
        H: Handler<Req, Res>,
    {
        Self {
            handler: handler.into_boxed_handler(),
            stack: MiddlewareStack::new(),
            registry: Registry::new(),
        }
    }

    /// Attach a middleware to the pipeline.
    ///
    /// The first middleware attached is the first to see the request and the
    /// last to see the outcome.
    pub fn wrap<M>(mut self, middleware: M) -> Self
    where
        M: Middleware<Req, Res>,
    {
        self.stack.push(Box::new(middleware));
        self
    }

    /// Register a construction-time value in the pipeline's [`Registry`].
    pub fn register<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.registry.insert(value);
        self
    }

    /// The pipeline's registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of attached middleware.
    pub fn middleware_count(&self) -> usize {
        self.stack.len()
    }

    /// Run one request through the middleware chain and the terminal
    /// handler.
    pub async fn invoke(&self, req: Req) -> Result<Res, BoxError> {
        tracing::trace!(middleware = self.stack.len(), "pipeline invoke");
        let handler = self.handler.clone();
        let terminal: Next<Req, Res> = Arc::new(move |req: Req| handler.call(req));
        self.stack.execute(req, terminal).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::BoxFuture;

    async fn double(n: u32) -> Result<u32, BoxError> {
        Ok(n * 2)
    }

    #[derive(Clone)]
    struct AddOneAfter;

    impl Middleware<u32, u32> for AddOneAfter {
        fn call(&self, req: u32, next: Next<u32, u32>) -> BoxFuture<Result<u32, BoxError>> {
            Box::pin(async move { Ok(next(req).await? + 1) })
        }

        fn clone_box(&self) -> Box<dyn Middleware<u32, u32>> {
            Box::new(self.clone())
        }
    }

    #[tokio::test]
    async fn invoke_without_middleware_reaches_handler() {
        let handler = RequestHandler::new(double);
        assert_eq!(handler.middleware_count(), 0);
        assert_eq!(handler.invoke(4).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn wrapped_middleware_observes_outcome() {
        let handler = RequestHandler::new(double).wrap(AddOneAfter);
        assert_eq!(handler.middleware_count(), 1);
        assert_eq!(handler.invoke(4).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn registered_values_are_resolvable() {
        #[derive(Debug, PartialEq)]
        struct Marker(u8);

        let handler = RequestHandler::new(double).register(Marker(7));
        assert_eq!(*handler.registry().get::<Marker>().unwrap(), Marker(7));
    }

    #[tokio::test]
    async fn concurrent_invocations_share_the_pipeline() {
        let handler = Arc::new(RequestHandler::new(double).wrap(AddOneAfter));

        let tasks: Vec<_> = (0..8u32)
            .map(|n| {
                let handler = handler.clone();
                tokio::spawn(async move { handler.invoke(n).await.unwrap() })
            })
            .collect();

        for (n, task) in tasks.into_iter().enumerate() {
            assert_eq!(task.await.unwrap(), n as u32 * 2 + 1);
        }
    }
}
