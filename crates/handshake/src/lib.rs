//! The handshake that binds a client and a provider to an SLA.
//!
//! Both parties only ever talk to the ledger. Each side is modelled as a
//! chain of state values: every transition consumes the current state and
//! returns the next one, so a field can only be read once the step that
//! fills it has run.
//!
//! ```text
//!            client                      ledger                     provider
//!              |                           |    registerProvider       |
//!              |                           |<--------------------------|
//!              |  registerClient           |                           |
//!              |-------------------------->|                           |
//!              |  ProviderRegistered       |                           |
//!              |<--------------------------|                           |
//!              |  proposeContract + stake  |                           |
//!              |-------------------------->|   SlaProposal             |
//!              |                           |-------------------------->|
//!              |                           |   acceptProposal + stake  |
//!              |   SlaProposalAccepted     |<--------------------------|
//!              |<--------------------------|-------------------------->|
//! ```
//!
//! Both sides derive the same shared secret from the key agreement public
//! keys published on the ledger. The provider seals its connection details
//! under that secret in its acceptance; the client opens them.
//!
//! Any failure ends the handshake in [`Aborted`]. Key material held by the
//! failed state is dropped along with it.

mod error;
pub use error::{Aborted, HandshakeError, HandshakeStage};

mod party;

mod record;
pub use record::HandshakeRecord;

pub mod client;
pub mod provider;

mod driver;
pub use driver::{run_client_handshake, run_provider_handshake};
