//! Audit pipeline.
//!
//! Control flow for one subject:
//! prompt -> N providers in parallel -> parser (per reply) -> consensus -> hook.
//! [`batch::BatchOrchestrator`] drives that over pages of subjects.

pub mod audit;
pub mod batch;
pub mod consensus;
pub mod hook;
pub mod parser;
pub mod prompt;

pub use audit::Auditor;
pub use batch::{BatchOrchestrator, DEFAULT_STATUS_SAMPLE};
pub use consensus::{aggregate, consensus_issues, overall_accuracy, tally_fields, worst_issues, FieldTally};
pub use hook::{format_names, generate_hook};
pub use parser::{extract_json_object, parse_response, try_parse_response, ParseOutcome, ParsedAudit};
pub use prompt::build_audit_prompt;
