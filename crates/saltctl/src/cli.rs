//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::{ArgAction, Parser, Subcommand};
use salt_calls::{ClientKind, TargetType};
use std::path::PathBuf;

/// saltctl - build and decode Salt `test` module calls offline
#[derive(Parser, Debug)]
#[command(name = "saltctl")]
#[command(about = "Build and decode Salt test module calls", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (overrides $SALTCTL_CONFIG and the default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the known test module functions
    List {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Print the Salt API request body for a call
    Render {
        /// Function name, e.g. test.echo
        function: String,

        /// Call argument as name=value (repeatable)
        #[arg(long = "arg", value_parser = parse_key_val)]
        args: Vec<(String, String)>,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Decode a saved Salt API response with the call's result type
    Decode {
        /// Function name, e.g. test.versions_information
        function: String,

        /// Response file, or - for stdin
        #[arg(long)]
        payload: PathBuf,

        /// Call argument as name=value (repeatable)
        #[arg(long = "arg", value_parser = parse_key_val)]
        args: Vec<(String, String)>,
    },
}

/// Request overrides shared by commands that build requests
#[derive(clap::Args, Debug, Default)]
pub struct RequestArgs {
    /// Target expression
    #[arg(long)]
    pub target: Option<String>,

    /// Matcher for --target (glob, list, compound, ...)
    #[arg(long)]
    pub target_type: Option<TargetType>,

    /// Salt API client (local, local_async, runner, wheel)
    #[arg(long)]
    pub client: Option<ClientKind>,
}

/// Parse a `name=value` pair
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("missing argument name in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("text=a=b"),
            Ok(("text".to_string(), "a=b".to_string()))
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_render_args() {
        let cli = Cli::parse_from([
            "saltctl",
            "render",
            "test.rand_str",
            "--arg",
            "size=8",
            "--arg",
            "hash_type=md5",
            "--target",
            "web*",
            "--client",
            "local_async",
        ]);
        match cli.command {
            Commands::Render { function, args, request } => {
                assert_eq!(function, "test.rand_str");
                assert_eq!(args.len(), 2);
                assert_eq!(args[0], ("size".to_string(), "8".to_string()));
                assert_eq!(request.target.as_deref(), Some("web*"));
                assert_eq!(request.client, Some(ClientKind::LocalAsync));
                assert!(request.target_type.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["saltctl", "-vv", "list", "--config", "/tmp/x.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.toml")));
    }
}
