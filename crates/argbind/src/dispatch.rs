//! Execution seam between bound arguments and the commands themselves.

use argbind_core::{bind::to_json, paginate_list, Invocation};
use serde_json::{json, Value};

/// Runs a bound call. Implementations receive complete, validated parameters.
pub trait Dispatch: Send + Sync {
    /// # Errors
    ///
    /// Returns error if the command itself fails.
    fn dispatch(&self, call: &Invocation) -> anyhow::Result<Value>;
}

/// Reports the call back instead of executing it. Paginated commands get the
/// echo wrapped in a one-item page envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoDispatcher;

impl Dispatch for EchoDispatcher {
    fn dispatch(&self, call: &Invocation) -> anyhow::Result<Value> {
        let echo = json!({
            "method": call.command.key(),
            "params": to_json(&call.params),
        });
        match &call.pagination {
            Some(request) => Ok(serde_json::to_value(paginate_list(&[echo], request))?),
            None => Ok(echo),
        }
    }
}
