//! The ledger as seen by the SLA protocol.
//!
//! The ledger itself is an external collaborator. This crate only defines
//! the values exchanged with it, the [`LedgerGateway`] trait through which
//! it is reached, and the [`EventPoller`] that turns its append-only event
//! log into "await exactly one event" confirmations.

pub mod contract;

mod error;
pub use error::LedgerError;

mod token;
pub use token::{Bytes32, Token};

mod call;
pub use call::{Call, SignedCall, TransactionReceipt};

mod event;
pub use event::EventRecord;

mod gateway;
pub use gateway::LedgerGateway;

mod poll;
pub use poll::{EventPoller, EventQuery};
