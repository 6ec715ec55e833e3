//! Fault boundary around collaborator calls.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use selflow_core::{BrainError, Capability};

/// Await a collaborator call, converting both errors and panics into
/// [`BrainError::Collaborator`].
pub(crate) async fn shielded<T, F>(capability: Capability, call: F) -> Result<T, BrainError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            if let Some(BrainError::ContractViolation(detail)) = e.downcast_ref::<BrainError>() {
                tracing::warn!(capability = capability.as_str(), detail = %detail, "collaborator broke its contract");
                return Err(BrainError::ContractViolation(detail.clone()));
            }
            let message = format!("{e:#}");
            tracing::warn!(capability = capability.as_str(), error = %message, "collaborator call failed");
            Err(BrainError::collaborator(capability, message))
        }
        Err(payload) => {
            let message = format!("panicked: {}", panic_message(payload.as_ref()));
            tracing::error!(capability = capability.as_str(), error = %message, "collaborator call panicked");
            Err(BrainError::collaborator(capability, message))
        }
    }
}

/// Synchronous variant for non-async collaborator queries (health, summaries).
pub(crate) fn shielded_sync<T>(capability: Capability, call: impl FnOnce() -> T) -> Option<T> {
    match std::panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(value) => Some(value),
        Err(payload) => {
            tracing::error!(
                capability = capability.as_str(),
                error = %panic_message(payload.as_ref()),
                "collaborator query panicked"
            );
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
