//! Salt API request bodies.
//!
//! A call is sent as one lowstate chunk:
//! `{"client": "local", "tgt": "*", "tgt_type": "glob", "fun": "test.echo", "kwarg": {...}}`.
//! The API takes a list of chunks, so bodies are always wrapped in an array.

use crate::arguments::Arguments;
use crate::target::Target;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Salt API client interface a request is dispatched to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
    #[default]
    Local,
    LocalAsync,
    Runner,
    Wheel,
}

impl ClientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::LocalAsync => "local_async",
            Self::Runner => "runner",
            Self::Wheel => "wheel",
        }
    }

    /// Only the minion-facing clients take a target
    pub fn requires_target(&self) -> bool {
        matches!(self, Self::Local | Self::LocalAsync)
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown client kind: {0}")]
pub struct UnknownClientKind(pub String);

impl FromStr for ClientKind {
    type Err = UnknownClientKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "local_async" => Ok(Self::LocalAsync),
            "runner" => Ok(Self::Runner),
            "wheel" => Ok(Self::Wheel),
            other => Err(UnknownClientKind(other.to_string())),
        }
    }
}

/// Borrowed view of a call, ready to be serialized for the API.
#[derive(Debug, Clone, Copy)]
pub struct CallRequest<'a> {
    client: ClientKind,
    function: &'a str,
    target: Option<&'a Target>,
    default_target: Option<&'a Target>,
    arguments: Option<&'a Arguments>,
    full_return: bool,
}

impl<'a> CallRequest<'a> {
    pub(crate) fn new(
        client: ClientKind,
        function: &'a str,
        target: Option<&'a Target>,
        arguments: Option<&'a Arguments>,
    ) -> Self {
        Self {
            client,
            function,
            target,
            default_target: None,
            arguments,
            full_return: true,
        }
    }

    /// Target used when the call itself carries none. Without either, `*` is sent.
    pub fn with_default_target(mut self, target: &'a Target) -> Self {
        self.default_target = Some(target);
        self
    }

    pub fn with_full_return(mut self, full_return: bool) -> Self {
        self.full_return = full_return;
        self
    }

    pub fn client(&self) -> ClientKind {
        self.client
    }

    pub fn function(&self) -> &'a str {
        self.function
    }

    /// The target that will go on the wire, if the client takes one
    pub fn effective_target(&self) -> Option<Target> {
        if !self.client.requires_target() {
            return None;
        }
        Some(
            self.target
                .or(self.default_target)
                .cloned()
                .unwrap_or_default(),
        )
    }

    pub fn arguments(&self) -> Option<&'a Arguments> {
        self.arguments
    }

    pub fn full_return(&self) -> bool {
        self.full_return
    }

    /// JSON body for `POST /`
    pub fn to_body(&self) -> serde_json::Result<String> {
        serde_json::to_string(&[self])
    }

    pub fn to_body_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&[self])
    }
}

impl Serialize for CallRequest<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("client", self.client.as_str())?;
        if let Some(target) = self.effective_target() {
            map.serialize_entry("tgt", target.expression())?;
            map.serialize_entry("tgt_type", target.target_type().as_str())?;
        }
        map.serialize_entry("fun", self.function)?;
        if let Some(arguments) = self.arguments {
            map.serialize_entry("kwarg", arguments)?;
        }
        if self.full_return {
            map.serialize_entry("full_return", &true)?;
        }
        map.end()
    }
}
