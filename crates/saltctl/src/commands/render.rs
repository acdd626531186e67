//! `saltctl render`

use crate::catalog::CatalogCall;
use crate::cli::RequestArgs;
use crate::config::Config;
use anyhow::Result;
use salt_calls::Target;
use tracing::{info, warn};

/// Render the request body for `function`. Flags win over config.
pub fn run(
    function: &str,
    args: &[(String, String)],
    overrides: &RequestArgs,
    config: &Config,
) -> Result<String> {
    let client = overrides.client.unwrap_or(config.request.client);
    let target_type = overrides.target_type.unwrap_or(config.request.target_type);

    let mut call = CatalogCall::build(function, args)?;
    if let Some(expression) = &overrides.target {
        if !client.requires_target() {
            warn!("--target is ignored by the {} client", client);
        }
        call = call.with_target(Target::new(expression.as_str(), target_type));
    }

    let fallback = config
        .request
        .target
        .as_ref()
        .map(|expression| Target::new(expression.as_str(), target_type));

    let mut request = call
        .request(client)
        .with_full_return(config.request.full_return);
    if let Some(target) = &fallback {
        request = request.with_default_target(target);
    }

    info!(function = call.function(), %client, "rendering request");
    let body = if config.output.pretty {
        request.to_body_pretty()?
    } else {
        request.to_body()?
    };
    Ok(body)
}
