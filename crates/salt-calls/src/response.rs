//! Decoding Salt API responses into typed results.
//!
//! A minion's return is either the bare value or, when `full_return` was
//! requested, `{"ret": <value>, "retcode": <n>, ...}`. Remote failures are
//! recognised before the value is handed to serde, so a call whose result is
//! a string cannot mistake an error message for its result.

use crate::error::{CallError, SaltError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

const NOT_AVAILABLE: &str = " is not available.";
const VIRTUAL_FALSE: &str = " __virtual__ returned False";
const EXCEPTION_PREFIX: &str = "The minion function caused an exception:";
const ERROR_PREFIX: &str = "ERROR: ";

/// Exit code Salt reports for a function that raised
const GENERIC_RETCODE: i64 = 1;

/// Top-level `{"return": [...]}` body of the Salt API
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnEnvelope {
    #[serde(rename = "return")]
    pub returns: Vec<Value>,
}

impl ReturnEnvelope {
    /// Per-minion raw returns of the single lowstate chunk that was sent
    pub fn into_minions(self) -> Result<Map<String, Value>, CallError> {
        let mut returns = self.returns.into_iter();
        let first = returns
            .next()
            .ok_or_else(|| CallError::Malformed("empty return list".to_string()))?;
        if returns.next().is_some() {
            return Err(CallError::Malformed(
                "expected the return of exactly one call".to_string(),
            ));
        }
        match first {
            Value::Object(minions) => Ok(minions),
            other => Err(CallError::Malformed(format!(
                "expected minion map, got {}",
                kind_of(&other)
            ))),
        }
    }
}

/// Decode one minion's return into `R`.
///
/// A full return is trusted: `retcode` and `success` decide failure, and a
/// successful `ret` is decoded as is. Only a bare return is matched against
/// Salt's error strings, since it carries nothing else to go by.
pub fn decode_return<R: DeserializeOwned>(function: &str, raw: Value) -> Result<R, CallError> {
    let value = match unwrap_full_return(raw)? {
        Unwrapped::Full(value) => value,
        Unwrapped::Bare(value) => {
            if let Some(err) = value.as_str().and_then(classify_message) {
                debug!(function, error = %err, "remote side reported an error");
                return Err(err.into());
            }
            value
        }
    };

    let message = value.as_str().map(str::to_string);
    serde_json::from_value(value).map_err(|source| match message {
        // A bare string where something else was expected is Salt's way of
        // reporting a failure it has no dedicated shape for.
        Some(message) => SaltError::Generic { message }.into(),
        None => CallError::Decode {
            function: function.to_string(),
            source,
        },
    })
}

/// Decode a whole API body, one result per minion.
pub fn decode_returns<R: DeserializeOwned>(
    function: &str,
    raw: Value,
) -> Result<BTreeMap<String, Result<R, CallError>>, CallError> {
    let envelope: ReturnEnvelope = serde_json::from_value(raw)
        .map_err(|e| CallError::Malformed(format!("not a Salt API return: {}", e)))?;
    let minions = envelope.into_minions()?;
    debug!(function, minions = minions.len(), "decoding minion returns");

    Ok(minions
        .into_iter()
        .map(|(minion, value)| {
            let result = decode_return(function, value);
            (minion, result)
        })
        .collect())
}

/// A minion's return with the full-return wrapper removed
enum Unwrapped {
    /// `ret` of a successful full return
    Full(Value),
    /// The return as sent, with no status alongside it
    Bare(Value),
}

/// Strip the full-return wrapper, turning a failed retcode into an error.
fn unwrap_full_return(raw: Value) -> Result<Unwrapped, CallError> {
    let mut object = match raw {
        Value::Object(object) if object.contains_key("ret") && object.contains_key("retcode") => {
            object
        }
        other => return Ok(Unwrapped::Bare(other)),
    };

    let ret = object.remove("ret").unwrap_or(Value::Null);
    let retcode = object
        .get("retcode")
        .and_then(Value::as_i64)
        .ok_or_else(|| CallError::Malformed("retcode is not an integer".to_string()))?;
    let success = object.get("success").and_then(Value::as_bool);

    if retcode == 0 && success != Some(false) {
        return Ok(Unwrapped::Full(ret));
    }

    if let Some(err) = ret.as_str().and_then(classify_quoted) {
        return Err(err.into());
    }
    let message = match ret {
        Value::String(message) => message,
        other => other.to_string(),
    };
    Err(SaltError::ExecutionFailed { retcode, message }.into())
}

/// Recognise the error strings Salt returns in place of a bare result.
fn classify_message(message: &str) -> Option<SaltError> {
    if message.starts_with(EXCEPTION_PREFIX) || message.starts_with(ERROR_PREFIX) {
        return Some(SaltError::ExecutionFailed {
            retcode: GENERIC_RETCODE,
            message: message.to_string(),
        });
    }
    classify_quoted(message)
}

/// Match messages that open with a quoted function or module name.
///
/// Only the leading quoted token counts; Salt may append more text after it,
/// such as `Possible reasons: '<mod>' __virtual__ returned False`.
fn classify_quoted(message: &str) -> Option<SaltError> {
    let (name, rest) = message.strip_prefix('\'')?.split_once('\'')?;
    if name.is_empty() {
        return None;
    }

    if rest.starts_with(NOT_AVAILABLE) {
        Some(SaltError::FunctionNotAvailable {
            function: name.to_string(),
        })
    } else if rest.starts_with(VIRTUAL_FALSE) {
        Some(SaltError::ModuleNotSupported {
            module: name.to_string(),
        })
    } else {
        None
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_value() {
        let result: bool = decode_return("test.ping", json!(true)).unwrap();
        assert!(result);
    }

    #[test]
    fn test_full_return_success() {
        let raw = json!({"ret": "hello", "retcode": 0, "jid": "20240101000000000000"});
        let result: String = decode_return("test.echo", raw).unwrap();
        assert_eq!(result, "hello");
    }

    #[test]
    fn test_full_return_failure_is_structured() {
        let raw = json!({"ret": "ERROR: boom", "retcode": 1});
        let err = decode_return::<String>("test.exception", raw).unwrap_err();
        assert_eq!(
            err.remote(),
            Some(&SaltError::ExecutionFailed {
                retcode: 1,
                message: "ERROR: boom".to_string()
            })
        );
    }

    #[test]
    fn test_success_false_overrides_zero_retcode() {
        let raw = json!({"ret": {"detail": "nope"}, "retcode": 0, "success": false});
        let err = decode_return::<bool>("test.ping", raw).unwrap_err();
        assert!(matches!(
            err.remote(),
            Some(SaltError::ExecutionFailed { retcode: 0, message }) if message.contains("nope")
        ));
    }

    #[test]
    fn test_not_available_is_not_a_string_result() {
        let raw = json!("'test.missing_func' is not available.");
        let err = decode_return::<String>("test.missing_func", raw).unwrap_err();
        assert_eq!(
            err.remote(),
            Some(&SaltError::FunctionNotAvailable {
                function: "test.missing_func".to_string()
            })
        );
    }

    #[test]
    fn test_virtual_false() {
        let raw = json!("'zfs' __virtual__ returned False: zfs is not installed");
        let err = decode_return::<bool>("zfs.list", raw).unwrap_err();
        assert_eq!(
            err.remote(),
            Some(&SaltError::ModuleNotSupported {
                module: "zfs".to_string()
            })
        );
    }

    #[test]
    fn test_not_available_with_possible_reasons() {
        let raw = json!(
            "'test.missing_func' is not available. \
             Possible reasons: 'test' __virtual__ returned False"
        );
        let err = decode_return::<String>("test.missing_func", raw).unwrap_err();
        assert_eq!(
            err.remote(),
            Some(&SaltError::FunctionNotAvailable {
                function: "test.missing_func".to_string()
            })
        );
    }

    #[test]
    fn test_successful_full_return_is_not_classified() {
        let raw = json!({"ret": "'x' is not available.", "retcode": 0, "success": true});
        let result: String = decode_return("test.echo", raw).unwrap();
        assert_eq!(result, "'x' is not available.");

        let raw = json!({"ret": "ERROR: not really", "retcode": 0});
        let result: String = decode_return("test.echo", raw).unwrap();
        assert_eq!(result, "ERROR: not really");
    }

    #[test]
    fn test_failed_full_return_keeps_retcode() {
        let raw = json!({"ret": "ERROR: disk full", "retcode": 2});
        let err = decode_return::<bool>("test.ping", raw).unwrap_err();
        assert_eq!(
            err.remote(),
            Some(&SaltError::ExecutionFailed {
                retcode: 2,
                message: "ERROR: disk full".to_string()
            })
        );
    }

    #[test]
    fn test_bare_traceback_is_execution_failure() {
        let message = concat!(
            "The minion function caused an exception: ",
            "Traceback (most recent call last):\n",
            "  File \"salt/modules/test.py\", line 1, in exception\n",
            "Exception: boom",
        );
        let err = decode_return::<String>("test.exception", json!(message)).unwrap_err();
        assert_eq!(
            err.remote(),
            Some(&SaltError::ExecutionFailed {
                retcode: 1,
                message: message.to_string()
            })
        );
    }

    #[test]
    fn test_bare_error_prefix_is_execution_failure() {
        let raw = json!("ERROR: no such package");
        let err = decode_return::<String>("pkg.version", raw).unwrap_err();
        assert_eq!(
            err.remote(),
            Some(&SaltError::ExecutionFailed {
                retcode: 1,
                message: "ERROR: no such package".to_string()
            })
        );
    }

    #[test]
    fn test_unexpected_string_is_generic_error() {
        let err = decode_return::<bool>("test.ping", json!("Minion did not return")).unwrap_err();
        assert!(matches!(err.remote(), Some(SaltError::Generic { .. })));
    }

    #[test]
    fn test_shape_mismatch_is_decode_error() {
        let err = decode_return::<bool>("test.ping", json!({"unexpected": 1})).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_quoted_string_that_is_not_an_error() {
        let result: String = decode_return("test.echo", json!("'quoted' text")).unwrap();
        assert_eq!(result, "'quoted' text");
    }

    #[test]
    fn test_envelope_per_minion() {
        let raw = json!({"return": [{
            "web1": {"ret": true, "retcode": 0},
            "web2": "'test.ping' is not available."
        }]});
        let results = decode_returns::<bool>("test.ping", raw).unwrap();
        assert_eq!(results.len(), 2);
        assert!(*results["web1"].as_ref().unwrap());
        assert!(results["web2"].is_err());
    }

    #[test]
    fn test_envelope_errors() {
        assert!(matches!(
            decode_returns::<bool>("test.ping", json!({"return": []})),
            Err(CallError::Malformed(_))
        ));
        assert!(matches!(
            decode_returns::<bool>("test.ping", json!({"return": [true]})),
            Err(CallError::Malformed(_))
        ));
        assert!(matches!(
            decode_returns::<bool>("test.ping", json!([true])),
            Err(CallError::Malformed(_))
        ));
    }
}
