//! Logger setup.
//!
//! The engine only talks to the `log` facade; this module wires `env_logger`
//! behind it for binaries that do not bring their own logger.

mod init;

pub use init::{init_logging, LoggingConfig};
