//! Shared domain and API types for dropclub.
//!
//! Everything that crosses a crate boundary lives here: the stored row
//! shapes (accounts, drops, entries, ledger records, feed items), the
//! arcade vocabulary, the billing catalogs, and the JSON envelopes the
//! HTTP surface speaks.

pub mod account;
pub mod api;
pub mod arcade;
pub mod billing;
pub mod constants;
pub mod drop;
pub mod engagement;
pub mod ledger;

pub use account::*;
pub use arcade::*;
pub use billing::*;
pub use constants::*;
pub use drop::*;
pub use engagement::*;
pub use ledger::*;

/// Opaque account identity.
pub type AccountId = uuid::Uuid;

/// Drop identity, allocated from a monotone counter.
pub type DropId = u64;
