//! `saltctl decode`

use super::to_json;
use crate::catalog::CatalogCall;
use anyhow::{Context, Result};
use salt_calls::SaltError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// What gets printed for one minion
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Shown {
    Ok(Value),
    Error {
        code: i32,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        remote: Option<SaltError>,
    },
}

/// Rendered decode output plus a failure count for the exit status
#[derive(Debug)]
pub struct DecodeOutput {
    pub rendered: String,
    pub total: usize,
    pub failed: usize,
}

pub fn run(
    function: &str,
    args: &[(String, String)],
    payload: &Path,
    pretty: bool,
) -> Result<DecodeOutput> {
    let call = CatalogCall::build(function, args)?;
    let raw = read_payload(payload)?;
    decode_payload(&call, raw, pretty)
}

/// Read JSON from `path`, or stdin for `-`
pub fn read_payload(path: &Path) -> Result<Value> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading payload {}", path.display()))?
    };
    serde_json::from_str(&content).context("payload is not valid JSON")
}

pub fn decode_payload(call: &CatalogCall, raw: Value, pretty: bool) -> Result<DecodeOutput> {
    let results = call
        .decode(raw)
        .with_context(|| format!("decoding {} response", call.function()))?;

    let total = results.len();
    let mut failed = 0;
    let shown: BTreeMap<String, Shown> = results
        .into_iter()
        .map(|(minion, result)| {
            let shown = match result {
                Ok(value) => Shown::Ok(value),
                Err(err) => {
                    failed += 1;
                    warn!(%minion, code = err.code(), "{}", err);
                    Shown::Error {
                        code: err.code(),
                        message: err.to_string(),
                        remote: err.remote().cloned(),
                    }
                }
            };
            (minion, shown)
        })
        .collect();

    info!(function = call.function(), total, failed, "decoded response");
    Ok(DecodeOutput {
        rendered: to_json(&shown, pretty)?,
        total,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn call(function: &str) -> CatalogCall {
        CatalogCall::build(function, &[]).unwrap()
    }

    #[test]
    fn test_decode_versions_keeps_null_dependency() {
        let raw = json!({"return": [{"minion1": {"ret": {
            "Salt Version": {"Salt": "3006.1"},
            "System Versions": {},
            "Dependency Versions": {"M2Crypto": null, "Jinja2": "3.1.2"}
        }, "retcode": 0}}]});
        let out = decode_payload(&call("test.versions_information"), raw, false).unwrap();
        assert_eq!(out.failed, 0);

        let parsed: Value = serde_json::from_str(&out.rendered).unwrap();
        let deps = &parsed["minion1"]["ok"]["Dependency Versions"];
        assert!(deps.as_object().unwrap().contains_key("M2Crypto"));
        assert!(deps["M2Crypto"].is_null());
        assert_eq!(deps["Jinja2"], "3.1.2");
    }

    #[test]
    fn test_decode_counts_remote_failures() {
        let raw = json!({"return": [{
            "ok1": {"ret": "x", "retcode": 0},
            "bad": "'test.missing_func' is not available."
        }]});
        let out = decode_payload(&call("test.missing_func"), raw, false).unwrap();
        assert_eq!(out.total, 2);
        assert_eq!(out.failed, 1);

        let parsed: Value = serde_json::from_str(&out.rendered).unwrap();
        assert_eq!(parsed["bad"]["error"]["remote"]["kind"], "function_not_available");
        assert_eq!(parsed["bad"]["error"]["code"], -32601);
        assert_eq!(parsed["ok1"]["ok"], "x");
    }

    #[test]
    fn test_malformed_envelope_is_an_error() {
        let raw = json!({"return": []});
        assert!(decode_payload(&call("test.ping"), raw, false).is_err());
    }

    #[test]
    fn test_read_payload_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"return": [{{"m": true}}]}}"#).unwrap();
        let raw = read_payload(file.path()).unwrap();
        assert_eq!(raw["return"][0]["m"], true);
    }

    #[test]
    fn test_read_payload_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(read_payload(file.path()).is_err());
    }
}
