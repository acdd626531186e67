//! Typed call descriptors.

use crate::arguments::Arguments;
use crate::error::CallError;
use crate::executor::Executor;
use crate::request::{CallRequest, ClientKind};
use crate::response;
use crate::target::Target;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

/// An immutable description of one remote function call whose result
/// decodes into `R`.
///
/// `R` only exists at the type level; the descriptor itself holds the
/// function name, an optional target and the ordered keyword arguments.
pub struct LocalCall<R> {
    function: Cow<'static, str>,
    target: Option<Target>,
    arguments: Option<Arguments>,
    witness: PhantomData<fn() -> R>,
}

impl<R> LocalCall<R> {
    /// Descriptor without arguments, usable in a `static`.
    pub const fn fixed(function: &'static str) -> Self {
        Self {
            function: Cow::Borrowed(function),
            target: None,
            arguments: None,
            witness: PhantomData,
        }
    }

    pub fn new(function: impl Into<Cow<'static, str>>, arguments: Option<Arguments>) -> Self {
        Self {
            function: function.into(),
            target: None,
            arguments,
            witness: PhantomData,
        }
    }

    /// Same call aimed at `target`. `self` is left as it was.
    pub fn with_target(&self, target: Target) -> Self {
        Self {
            target: Some(target),
            ..self.clone()
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn arguments(&self) -> Option<&Arguments> {
        self.arguments.as_ref()
    }

    pub fn request(&self, client: ClientKind) -> CallRequest<'_> {
        CallRequest::new(
            client,
            &self.function,
            self.target.as_ref(),
            self.arguments.as_ref(),
        )
    }
}

impl<R: DeserializeOwned> LocalCall<R> {
    /// Decode one minion's raw return.
    pub fn decode(&self, raw: Value) -> Result<R, CallError> {
        response::decode_return(&self.function, raw)
    }

    /// Decode a full `{"return": [...]}` API body, one result per minion.
    pub fn decode_returns(
        &self,
        raw: Value,
    ) -> Result<BTreeMap<String, Result<R, CallError>>, CallError> {
        response::decode_returns(&self.function, raw)
    }

    /// Run the call through `executor` with the local client.
    pub async fn call<E: Executor>(&self, executor: &E) -> Result<R, CallError> {
        debug!(function = %self.function, "executing call");
        let raw = executor.execute(self.request(ClientKind::Local)).await?;
        self.decode(raw)
    }
}

impl<R> Clone for LocalCall<R> {
    fn clone(&self) -> Self {
        Self {
            function: self.function.clone(),
            target: self.target.clone(),
            arguments: self.arguments.clone(),
            witness: PhantomData,
        }
    }
}

impl<R> PartialEq for LocalCall<R> {
    fn eq(&self, other: &Self) -> bool {
        self.function == other.function
            && self.target == other.target
            && self.arguments == other.arguments
    }
}

impl<R> fmt::Debug for LocalCall<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCall")
            .field("function", &self.function)
            .field("target", &self.target)
            .field("arguments", &self.arguments)
            .field("returns", &std::any::type_name::<R>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FIXED: LocalCall<bool> = LocalCall::fixed("test.ping");

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_static_descriptor() {
        let call = FIXED.clone();
        assert_eq!(call.function(), "test.ping");
        assert!(call.arguments().is_none());
        assert!(call.target().is_none());
        assert_eq!(call, FIXED);
    }

    #[test]
    fn test_with_target_leaves_original_untouched() {
        let base: LocalCall<String> = LocalCall::new(
            "test.echo",
            Some(Arguments::builder().arg("text", "hi").build()),
        );
        let aimed = base.with_target(Target::glob("web*"));
        assert!(base.target().is_none());
        assert_eq!(aimed.target().map(Target::expression), Some("web*"));
        assert_eq!(aimed.arguments(), base.arguments());
    }

    #[test]
    fn test_descriptor_is_send_sync_for_any_result() {
        // Rc is neither Send nor Sync; the witness must not inherit that.
        assert_send_sync::<LocalCall<std::rc::Rc<String>>>();
    }

    #[test]
    fn test_request_carries_descriptor_parts() {
        let call: LocalCall<String> =
            LocalCall::new("test.echo", Some(Arguments::builder().arg("text", "hi").build()))
                .with_target(Target::list(["a", "b"]));
        let request = call.request(ClientKind::Local);
        assert_eq!(request.function(), "test.echo");
        assert_eq!(request.effective_target(), call.target().cloned());
        assert_eq!(request.arguments(), call.arguments());
    }

    #[test]
    fn test_debug_names_result_type() {
        let debug = format!("{:?}", FIXED);
        assert!(debug.contains("test.ping"));
        assert!(debug.contains("bool"));
    }
}
