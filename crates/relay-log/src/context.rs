//! Per-invocation request context and the downstream outcome view.

use relay_core::BoxError;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Identity and timing of one request's pass through the logging middleware.
///
/// A fresh context is created for every invocation and never shared across
/// requests. `elapsed` stays zero until the downstream call resolves, at
/// which point it is set exactly once.
#[derive(Debug, Clone)]
pub struct RequestContext {
    id: Uuid,
    started: Instant,
    elapsed: Duration,
}

impl RequestContext {
    pub(crate) fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    /// Stop the measurement. Called once, when the downstream call returns
    /// or fails.
    pub(crate) fn complete(&mut self) {
        self.elapsed = self.started.elapsed();
    }

    /// The identifier generated for this request.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Time spent in the downstream call; zero until it has resolved.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time in fractional milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Borrowed view of the downstream result.
///
/// Handed to the property and enrichment callbacks alongside the
/// [`RequestContext`], so payload-derived properties can be computed without
/// the middleware retaining or cloning the payloads.
pub struct Outcome<'a, Res> {
    result: Result<&'a Res, &'a BoxError>,
}

impl<'a, Res> Outcome<'a, Res> {
    pub(crate) fn new(result: Result<&'a Res, &'a BoxError>) -> Self {
        Self { result }
    }

    /// The response produced by the downstream call, if it succeeded.
    pub fn response(&self) -> Option<&'a Res> {
        self.result.ok()
    }

    /// The error raised by the downstream call, if it failed.
    pub fn error(&self) -> Option<&'a (dyn std::error::Error + Send + Sync)> {
        self.result.err().map(|err| err.as_ref())
    }

    /// Whether the downstream call succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}
