//! Engine context: host capabilities, configuration and the format registry shared by the
//! surfaces an engine creates.

pub(crate) mod caps;
pub(crate) mod config;
pub(crate) mod context;
