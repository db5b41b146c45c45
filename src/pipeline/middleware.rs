//! Request-scoped middleware chain.
//!
//! # Responsibilities
//! - Run middleware strictly in list order before dispatch
//! - Lend each middleware the request through a [`Next`] that hands it back
//!
//! # Design Decisions
//! - [`Next`] owns the request; proceeding (or dropping it) returns the
//!   request to the chain
//! - A middleware is done once the request comes back or its future settles
//! - Work a middleware still has after handing the request back keeps running
//!   on its own task; its errors are only traced
//! - An error from a middleware skips dispatch and enters the error path
//! - No timeout: a middleware that neither proceeds nor settles stalls the
//!   request

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::oneshot;

use crate::error::PistachioError;
use crate::http::request::Request;
use crate::http::response::Response;

pub type MiddlewareFuture = BoxFuture<'static, Result<(), PistachioError>>;

/// The request on loan to one middleware.
///
/// Derefs to [`Request`]. [`Next::proceed`] releases the chain to the next
/// middleware; dropping a `Next` does the same.
#[derive(Debug)]
pub struct Next {
    request: Request,
    tx: Option<oneshot::Sender<Handoff>>,
}

/// The returned request, and whether it came back through [`Next::proceed`].
type Handoff = (Request, bool);

impl Next {
    fn channel(request: Request) -> (Self, oneshot::Receiver<Handoff>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                request,
                tx: Some(tx),
            },
            rx,
        )
    }

    pub fn proceed(mut self) {
        self.release(true);
    }

    fn release(&mut self, proceeded: bool) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send((std::mem::take(&mut self.request), proceeded));
        }
    }
}

impl Deref for Next {
    type Target = Request;

    fn deref(&self) -> &Request {
        &self.request
    }
}

impl DerefMut for Next {
    fn deref_mut(&mut self) -> &mut Request {
        &mut self.request
    }
}

impl Drop for Next {
    fn drop(&mut self) {
        self.release(false);
    }
}

/// Application-level middleware.
pub trait Middleware: Send + Sync {
    fn handle(&self, response: Response, next: Next) -> MiddlewareFuture;
}

/// Synchronous middleware from a closure. Proceeds when the closure succeeds.
pub struct FnMiddleware<F>(F);

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&mut Request, &Response) -> Result<(), PistachioError> + Send + Sync,
{
    fn handle(&self, response: Response, mut next: Next) -> MiddlewareFuture {
        let result = (self.0)(&mut next, &response);
        if result.is_ok() {
            next.proceed();
        }
        futures_util::future::ready(result).boxed()
    }
}

pub fn from_fn<F>(f: F) -> Arc<dyn Middleware>
where
    F: Fn(&mut Request, &Response) -> Result<(), PistachioError> + Send + Sync + 'static,
{
    Arc::new(FnMiddleware(f))
}

/// A chain stopped by a failing middleware.
#[derive(Debug)]
pub struct Rejection {
    pub error: PistachioError,
    /// The request as the failing middleware left it, if it came back.
    pub request: Option<Request>,
}

/// Run every middleware in order, returning the request once all are done.
pub async fn run_chain(
    chain: &[Arc<dyn Middleware>],
    mut request: Request,
    response: &Response,
) -> Result<Request, Rejection> {
    for (position, middleware) in chain.iter().enumerate() {
        let (next, mut signal) = Next::channel(request);
        let mut pending = middleware.handle(response.clone(), next);

        request = tokio::select! {
            biased;
            result = &mut pending => match (result, signal.try_recv()) {
                (Ok(()), Ok((request, _))) => request,
                (Ok(()), Err(_)) => match signal.await {
                    Ok((request, _)) => request,
                    Err(_) => return Err(lost(position)),
                },
                (Err(error), Ok((request, true))) => {
                    tracing::debug!(position, error = %error, "Middleware failed after proceeding");
                    request
                }
                (Err(error), handed_back) => {
                    tracing::debug!(position, error = %error, "Middleware failed");
                    return Err(Rejection {
                        error,
                        request: handed_back.ok().map(|(request, _)| request),
                    });
                }
            },
            handed_back = &mut signal => {
                detach(position, pending);
                match handed_back {
                    Ok((request, _)) => request,
                    Err(_) => return Err(lost(position)),
                }
            }
        };
    }
    Ok(request)
}

fn lost(position: usize) -> Rejection {
    Rejection {
        error: PistachioError::RequestLost(position),
        request: None,
    }
}

/// Keep driving a middleware that has handed the request back.
fn detach(position: usize, pending: MiddlewareFuture) {
    tokio::spawn(async move {
        if let Err(e) = pending.await {
            tracing::debug!(position, error = %e, "Middleware failed after proceeding");
        }
    });
}
