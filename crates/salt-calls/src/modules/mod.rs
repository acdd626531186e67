//! Execution module catalogs.
//!
//! Each submodule mirrors one Salt execution module and exposes a factory per
//! remote function.
