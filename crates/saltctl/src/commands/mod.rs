//! Command implementations.
//!
//! Each command renders its output to a `String` so it can be tested without
//! capturing stdout; `main` does the printing.

pub mod decode;
pub mod list;
pub mod render;

/// Serialize for stdout, honouring `[output] pretty`
pub(crate) fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
