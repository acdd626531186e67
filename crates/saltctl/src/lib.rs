//! saltctl - offline companion for `salt-calls`.
//!
//! Renders `test` module calls into Salt API request bodies and decodes saved
//! responses with each call's result type.

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
