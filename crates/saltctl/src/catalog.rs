//! Maps function names typed on the command line onto typed calls.

use anyhow::{anyhow, bail, Context, Result};
use salt_calls::modules::test::{self, ModuleReport, VersionInformation};
use salt_calls::{CallError, CallRequest, ClientKind, HashType, LocalCall};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// A `test` module call, grouped by what its return decodes into
#[derive(Debug, Clone)]
pub enum CatalogCall {
    Flag(LocalCall<bool>),
    Text(LocalCall<String>),
    Versions(LocalCall<VersionInformation>),
    Report(LocalCall<ModuleReport>),
    Providers(LocalCall<HashMap<String, String>>),
}

/// Result of decoding one minion's return
pub type MinionResult = Result<Value, CallError>;

impl CatalogCall {
    /// Build the call for `function` from `name=value` arguments.
    pub fn build(function: &str, args: &[(String, String)]) -> Result<Self> {
        let info = test::function_info(function)
            .ok_or_else(|| anyhow!("unknown function '{}' (see `saltctl list`)", function))?;
        let args = ArgLookup::new(function, args, info.arguments)?;

        let call = match function {
            "test.ping" => Self::Flag(test::ping()),
            "test.missing_func" => Self::Text(test::missing_func()),
            "test.versions_information" => Self::Versions(test::versions_information()),
            "test.module_report" => Self::Report(test::module_report()),
            "test.providers" => Self::Providers(test::providers()),
            "test.provider" => Self::Text(test::provider(args.required("module")?)),
            "test.echo" => Self::Text(test::echo(args.required("text")?)),
            "test.exception" => Self::Text(test::exception(args.required("message")?)),
            "test.rand_str" => {
                let size = args
                    .optional("size")
                    .map(|s| s.parse::<u32>().context("size must be a non-negative integer"))
                    .transpose()?;
                let hash_type = args
                    .optional("hash_type")
                    .map(|s| s.parse::<HashType>())
                    .transpose()?;
                Self::Text(test::rand_str(size, hash_type))
            }
            "test.sleep" => {
                let length = args.required("length")?;
                let seconds: f64 = length
                    .parse()
                    .with_context(|| format!("length must be seconds, got '{}'", length))?;
                let duration = Duration::try_from_secs_f64(seconds)
                    .with_context(|| format!("length out of range: {}", length))?;
                Self::Flag(test::sleep(duration))
            }
            other => bail!("no call builder for '{}'", other),
        };
        Ok(call)
    }

    pub fn function(&self) -> &str {
        match self {
            Self::Flag(call) => call.function(),
            Self::Text(call) => call.function(),
            Self::Versions(call) => call.function(),
            Self::Report(call) => call.function(),
            Self::Providers(call) => call.function(),
        }
    }

    pub fn request(&self, client: ClientKind) -> CallRequest<'_> {
        match self {
            Self::Flag(call) => call.request(client),
            Self::Text(call) => call.request(client),
            Self::Versions(call) => call.request(client),
            Self::Report(call) => call.request(client),
            Self::Providers(call) => call.request(client),
        }
    }

    pub fn with_target(&self, target: salt_calls::Target) -> Self {
        match self {
            Self::Flag(call) => Self::Flag(call.with_target(target)),
            Self::Text(call) => Self::Text(call.with_target(target)),
            Self::Versions(call) => Self::Versions(call.with_target(target)),
            Self::Report(call) => Self::Report(call.with_target(target)),
            Self::Providers(call) => Self::Providers(call.with_target(target)),
        }
    }

    /// Decode an API body (`{"return": [...]}`) or a single bare return.
    ///
    /// Typed results are turned back into JSON for display; a bare return is
    /// reported under the minion name `local`.
    pub fn decode(&self, raw: Value) -> Result<BTreeMap<String, MinionResult>, CallError> {
        match self {
            Self::Flag(call) => decode_with(call, raw),
            Self::Text(call) => decode_with(call, raw),
            Self::Versions(call) => decode_with(call, raw),
            Self::Report(call) => decode_with(call, raw),
            Self::Providers(call) => decode_with(call, raw),
        }
    }
}

fn decode_with<R>(
    call: &LocalCall<R>,
    raw: Value,
) -> Result<BTreeMap<String, MinionResult>, CallError>
where
    R: serde::de::DeserializeOwned + Serialize,
{
    let typed = if is_envelope(&raw) {
        call.decode_returns(raw)?
    } else {
        BTreeMap::from([("local".to_string(), call.decode(raw))])
    };

    Ok(typed
        .into_iter()
        .map(|(minion, result)| {
            let shown = result.and_then(|value| {
                serde_json::to_value(value).map_err(|e| CallError::Malformed(e.to_string()))
            });
            (minion, shown)
        })
        .collect())
}

fn is_envelope(raw: &Value) -> bool {
    raw.get("return").map_or(false, Value::is_array)
}

/// Checked access to `name=value` arguments of one function
struct ArgLookup<'a> {
    args: &'a [(String, String)],
}

impl<'a> ArgLookup<'a> {
    fn new(function: &str, args: &'a [(String, String)], accepted: &[&str]) -> Result<Self> {
        for (name, _) in args {
            let known = accepted
                .iter()
                .any(|a| a.trim_end_matches('?') == name.as_str());
            if !known {
                bail!("{} takes no argument '{}'", function, name);
            }
        }
        Ok(Self { args })
    }

    fn optional(&self, name: &str) -> Option<&'a str> {
        self.args
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn required(&self, name: &str) -> Result<&'a str> {
        self.optional(name)
            .ok_or_else(|| anyhow!("missing required argument '{}'", name))
    }
}
