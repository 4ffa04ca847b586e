//! Core types shared by every participant of the SLA protocol.
//!
//! These types carry no behaviour beyond validation and formatting: keys and
//! encryption live in `slalink-crypto`, wire encodings in `slalink-codec`,
//! and everything that talks to the ledger in `slalink-ledger`.

#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![warn(
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod address;
mod amount;
mod checkpoint;
mod ids;
mod payload;
mod usage;

pub use address::{Address, ParseAddressError};
pub use amount::Wei;
pub use checkpoint::CheckpointState;
pub use ids::{BlockNumber, ContractId, HardwareId};
pub use payload::{ConnectionPayload, SealedEnvelope, NONCE_LEN, TAG_LEN};
pub use usage::{RequestUsage, UsageReportEntry};
