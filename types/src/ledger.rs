use crate::{AccountId, LEADERBOARD_SIZE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable fact: one balance change. Append-only; never mutated or
/// deleted. An account's spendable points always equal the sum of its
/// record amounts since the last reset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub seq: u64,
    pub account: AccountId,
    pub amount: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Top accounts by lifetime points, maintained incrementally on every
/// credit rather than scanned at read time.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    /// (account, lifetime points), sorted descending, capped.
    pub standings: Vec<(AccountId, u64)>,
}

impl Leaderboard {
    /// Insert or refresh an account's lifetime total, keeping the board
    /// sorted and capped at [`LEADERBOARD_SIZE`].
    pub fn record(&mut self, account: AccountId, lifetime_points: u64) {
        match self.standings.iter_mut().find(|(a, _)| *a == account) {
            Some(entry) => entry.1 = lifetime_points,
            None => self.standings.push((account, lifetime_points)),
        }
        self.standings.sort_by(|a, b| b.1.cmp(&a.1));
        self.standings.truncate(LEADERBOARD_SIZE);
    }

    /// 1-based rank of an account, if it is on the board.
    pub fn rank(&self, account: AccountId) -> Option<u64> {
        self.standings
            .iter()
            .position(|(a, _)| *a == account)
            .map(|i| i as u64 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_leaderboard_ordering_and_cap() {
        let mut board = Leaderboard::default();
        let accounts: Vec<AccountId> = (0..60).map(|_| Uuid::new_v4()).collect();
        for (i, account) in accounts.iter().enumerate() {
            board.record(*account, i as u64);
        }

        assert_eq!(board.standings.len(), LEADERBOARD_SIZE);
        assert_eq!(board.standings[0], (accounts[59], 59));
        assert_eq!(board.rank(accounts[59]), Some(1));
        // The lowest ten were pushed off the board
        assert_eq!(board.rank(accounts[5]), None);

        // Refreshing an existing account re-sorts instead of duplicating
        board.record(accounts[30], 1_000);
        assert_eq!(board.standings[0], (accounts[30], 1_000));
        assert_eq!(
            board.standings.iter().filter(|(a, _)| *a == accounts[30]).count(),
            1
        );
    }
}
