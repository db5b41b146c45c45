//! Action pipeline execution.
//!
//! # Responsibilities
//! - Run resolved actions front to back
//! - Stop at the first terminal payload and detach the leftovers
//! - Map `Abort` and exhaustion onto the error taxonomy
//!
//! # Design Decisions
//! - Iterative loop over an index, no recursion
//! - Leftover actions are spawned as independent tasks: at most once, best
//!   effort, never awaited; their errors are only traced
//! - An unresolved action at the front of the chain is `NotImplemented`

use std::sync::Arc;

use serde_json::Value;

use crate::error::PistachioError;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::pipeline::action::Outcome;
use crate::pipeline::resolver::ResolvedAction;

/// Run `actions` until one produces a payload.
pub async fn execute(
    actions: &[ResolvedAction],
    request: &Arc<Request>,
    response: &Response,
) -> Result<Value, PistachioError> {
    let mut index = 0;
    loop {
        let Some(current) = actions.get(index) else {
            return Err(PistachioError::NotImplemented);
        };
        let Some(action) = current.action.as_ref() else {
            tracing::debug!(action = %current.name, "Action is not registered");
            return Err(PistachioError::NotImplemented);
        };
        index += 1;

        tracing::trace!(action = %current.name, "Running action");
        match action(Arc::clone(request), response.clone()).await? {
            Outcome::Continue => continue,
            Outcome::Abort => return Err(PistachioError::BadRequest),
            Outcome::Done(payload) => {
                detach(&actions[index..], request, response);
                return Ok(payload);
            }
        }
    }
}

fn detach(leftovers: &[ResolvedAction], request: &Arc<Request>, response: &Response) {
    for leftover in leftovers {
        let Some(action) = leftover.action.as_ref() else {
            continue;
        };
        let name = leftover.name.clone();
        let task = action(Arc::clone(request), response.clone());
        tokio::spawn(async move {
            if let Err(e) = task.await {
                tracing::debug!(action = %name, error = %e, "Detached action failed");
            }
        });
    }
}
