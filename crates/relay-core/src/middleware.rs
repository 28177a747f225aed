//! Middleware infrastructure for relay pipelines.
//!
//! Middleware wraps the terminal handler: each layer receives the request and
//! a `next` continuation, may act before and after awaiting it, and returns
//! the (possibly replaced) outcome. Layers are registered in order at
//! pipeline-construction time and executed outermost-first.

use crate::handler::{BoxError, BoxFuture};
use std::sync::Arc;

/// The continuation a middleware calls to hand the request to the next stage
/// of the chain.
pub type Next<Req, Res> =
    Arc<dyn Fn(Req) -> BoxFuture<Result<Res, BoxError>> + Send + Sync + 'static>;

/// Trait for middleware that can be attached to a [`RequestHandler`].
///
/// [`RequestHandler`]: crate::RequestHandler
pub trait Middleware<Req, Res>: Send + Sync + 'static {
    /// Process a request, calling `next` to continue the chain.
    ///
    /// A middleware is free to short-circuit by not calling `next`, and to
    /// replace or inspect the outcome after awaiting it.
    fn call(&self, req: Req, next: Next<Req, Res>) -> BoxFuture<Result<Res, BoxError>>;

    /// Clone this middleware into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Middleware<Req, Res>>;
}

impl<Req: 'static, Res: 'static> Clone for Box<dyn Middleware<Req, Res>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// An ordered stack of middleware.
pub struct MiddlewareStack<Req, Res> {
    layers: Vec<Box<dyn Middleware<Req, Res>>>,
}

impl<Req: 'static, Res: 'static> Clone for MiddlewareStack<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            layers: self.layers.clone(),
        }
    }
}

impl<Req, Res> Default for MiddlewareStack<Req, Res> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Res> MiddlewareStack<Req, Res> {
    /// Create a new empty stack.
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Add a middleware to the stack.
    ///
    /// Layers execute in the order they are added (outermost first).
    pub fn push(&mut self, layer: Box<dyn Middleware<Req, Res>>) {
        self.layers.push(layer);
    }

    /// Whether the stack holds no middleware.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of middleware in the stack.
    pub fn len(&self) -> usize {
        self.layers.len()
    }
}

impl<Req, Res> MiddlewareStack<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    /// Execute the stack with `handler` as the terminal stage.
    pub fn execute(&self, req: Req, handler: Next<Req, Res>) -> BoxFuture<Result<Res, BoxError>> {
        if self.layers.is_empty() {
            return handler(req);
        }

        // Build the chain inside-out so the first layer added ends up
        // outermost.
        let mut next = handler;
        for layer in self.layers.iter().rev() {
            let layer = layer.clone_box();
            let inner = next;
            next = Arc::new(move |req: Req| layer.call(req, inner.clone()));
        }

        next(req)
    }
}
