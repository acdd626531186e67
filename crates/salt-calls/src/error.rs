//! Error types for Salt calls.

use serde::Serialize;
use thiserror::Error;

/// A failure reported by the remote side for one minion.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SaltError {
    #[error("Function '{function}' is not available")]
    FunctionNotAvailable { function: String },

    #[error("Module '{module}' is not supported on this minion")]
    ModuleNotSupported { module: String },

    #[error("Execution failed with retcode {retcode}: {message}")]
    ExecutionFailed { retcode: i64, message: String },

    #[error("Salt error: {message}")]
    Generic { message: String },
}

impl SaltError {
    /// Stable numeric code for scripts reading `saltctl` output.
    ///
    /// These belong to this crate only. The Salt API has no error codes and
    /// the numbers carry no JSON-RPC meaning; they must not change once
    /// published.
    pub fn code(&self) -> i32 {
        match self {
            SaltError::FunctionNotAvailable { .. } => -32601,
            SaltError::ModuleNotSupported { .. } => -32010,
            SaltError::ExecutionFailed { .. } => -32011,
            SaltError::Generic { .. } => -32012,
        }
    }
}

/// Everything that can go wrong between building a call and holding its result.
///
/// Building a [`LocalCall`](crate::LocalCall) never fails; these errors come
/// from executing it or decoding what came back.
#[derive(Error, Debug)]
pub enum CallError {
    #[error("Remote error: {0}")]
    Remote(#[from] SaltError),

    #[error("Cannot decode result of {function}: {source}")]
    Decode {
        function: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl CallError {
    /// Stable numeric code, from the same table as [`SaltError::code`].
    pub fn code(&self) -> i32 {
        match self {
            CallError::Remote(err) => err.code(),
            CallError::Decode { .. } => -32700,
            CallError::Malformed(_) => -32600,
            CallError::Transport(_) => -32001,
        }
    }

    /// The remote failure, if this error came from the minion itself.
    pub fn remote(&self) -> Option<&SaltError> {
        match self {
            CallError::Remote(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, CallError::Decode { .. })
    }
}
