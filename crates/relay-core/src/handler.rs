//! Handler trait and type erasure.
//!
//! A pipeline stores its terminal handler as a trait object so that any
//! `async fn(Req) -> Result<Res, BoxError>` can sit at the end of the chain
//! without the pipeline being generic over the concrete function type.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed error type used throughout the pipeline.
///
/// Downstream handlers and middleware report failures as `BoxError`; the
/// pipeline itself never inspects the concrete error type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A heap-allocated, type-erased future.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Internal dispatch interface for type-erased handlers.
#[doc(hidden)]
pub trait ErasedHandler<Req, Res>: Send + Sync {
    fn call(&self, req: Req) -> BoxFuture<Result<Res, BoxError>>;
}

/// A heap-allocated handler shared across concurrent invocations.
#[doc(hidden)]
pub type BoxedHandler<Req, Res> = Arc<dyn ErasedHandler<Req, Res> + Send + Sync + 'static>;

/// Implemented for every valid terminal handler.
///
/// You never implement this yourself; it is automatically satisfied for any
/// `async fn(Req) -> Result<Res, BoxError>` (and for closures with the same
/// shape).
pub trait Handler<Req, Res>: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler<Req, Res>;
}

impl<F, Fut, Req, Res> Handler<Req, Res> for F
where
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Res, BoxError>> + Send + 'static,
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler<Req, Res> {
        Arc::new(FnHandler(self))
    }
}

/// Newtype bridging a concrete handler function to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, Req, Res> ErasedHandler<Req, Res> for FnHandler<F>
where
    F: Fn(Req) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Res, BoxError>> + Send + 'static,
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn call(&self, req: Req) -> BoxFuture<Result<Res, BoxError>> {
        Box::pin((self.0)(req))
    }
}
