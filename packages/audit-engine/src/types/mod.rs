//! Data types shared across the audit pipeline.

pub mod audit;
pub mod batch;
pub mod config;
pub mod finding;
pub mod subject;
