// Harbor - AI visibility audit service
//
// HTTP surface and process wiring around the audit engine. Domain logic
// lives in the `audit-engine` crate; this crate only configures it.

pub mod config;
pub mod kernel;
pub mod server;

pub use config::*;
