//! Checkpoint reports for an established SLA.
//!
//! The provider periodically reports how much work it did for the client.
//! Each report carries a sequence number, starting at zero, that the SLA
//! contract accepts exactly once and in order. The [`CheckpointSubmitter`]
//! owns that number and only advances it once the ledger has included the
//! report.

mod error;
pub use error::CheckpointError;

mod source;
pub use source::{FixedUsage, SampledUsage, UsageSource};

mod submitter;
pub use submitter::CheckpointSubmitter;
