pub mod games;

mod ledger;

mod state;

pub use ledger::{Ledger, LedgerError, Policy};
pub use state::{Counter, Key, Memory, State, Stats, Status, Value};
