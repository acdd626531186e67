//! The seam between call descriptors and whatever transports them.

use crate::error::CallError;
use crate::request::CallRequest;
use serde_json::Value;
use std::future::Future;

/// Sends one call to the Salt API and hands back the raw return.
///
/// The returned value is the return of that single call for one minion,
/// either bare or in full-return form. Decoding is left to the call's
/// witness; transport failures should be reported as
/// [`CallError::Transport`].
pub trait Executor {
    fn execute(
        &self,
        request: CallRequest<'_>,
    ) -> impl Future<Output = Result<Value, CallError>> + Send;
}
