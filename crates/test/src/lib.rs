mod ledger;
pub use ledger::MockLedger;

mod contracts;
