//! Core trait abstractions for the audit engine.
//!
//! These traits are the seams the application fills in: LLM backends and
//! the two storage collaborators (ground truth in, audit results out).

pub mod provider;
pub mod store;
