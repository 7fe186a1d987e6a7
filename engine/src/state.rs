use chrono::{DateTime, Utc};
use dropclub_types::{
    Account, AccountId, Comment, Drop, DropId, Earned, Entry, FeedItem, Leaderboard, LedgerRecord,
    MysteryReward, Notification, Redemption, Referral,
};
use std::collections::BTreeMap;

/// Monotonic id sequences, one row per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Counter {
    Drop,
    Ledger,
    Feed,
    Notification,
    Comment,
    Redemption,
}

/// Storage key. Ordering groups rows of the same kind together so
/// range scans stay cheap.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Key {
    Account(AccountId),
    /// Email index: lowercased email to account id.
    AccountEmail(String),
    /// Referral code index: code to owning account.
    ReferralCode(String),
    /// Keyed by referee; an account can be referred at most once.
    Referral(AccountId),
    Drop(DropId),
    /// One row per (drop, account) pair; presence is the entry gate.
    Entry(DropId, AccountId),
    LedgerRecord(u64),
    FeedItem(u64),
    Notification(u64),
    Comment(u64),
    Achievement(AccountId, dropclub_types::AchievementId),
    Redemption(u64),
    /// The whole mystery box catalog as one maintained row.
    MysteryCatalog,
    /// Processed payment events, keyed by provider event id.
    WebhookEvent(String),
    Leaderboard,
    Counter(Counter),
}

#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum Value {
    Account(Account),
    AccountEmail(AccountId),
    ReferralCode(AccountId),
    Referral(Referral),
    Drop(Drop),
    Entry(Entry),
    LedgerRecord(LedgerRecord),
    FeedItem(FeedItem),
    Notification(Notification),
    Comment(Comment),
    Achievement(Earned),
    Redemption(Redemption),
    MysteryCatalog(Vec<MysteryReward>),
    WebhookEvent(DateTime<Utc>),
    Leaderboard(Leaderboard),
    Counter(u64),
}

#[derive(Clone)]
#[allow(clippy::large_enum_variant)]
pub enum Status {
    Update(Value),
    Delete,
}

pub trait State {
    fn get(&self, key: &Key) -> Option<Value>;
    fn insert(&mut self, key: Key, value: Value);
    fn delete(&mut self, key: &Key);

    fn apply(&mut self, changes: Vec<(Key, Status)>) {
        for (key, status) in changes {
            match status {
                Status::Update(value) => self.insert(key, value),
                Status::Delete => self.delete(&key),
            }
        }
    }
}

/// Counts reported by the operator stats endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub accounts: u64,
    pub drops: u64,
    pub entries: u64,
    pub points_outstanding: u64,
}

#[derive(Default)]
pub struct Memory {
    state: BTreeMap<Key, Value>,
}

impl State for Memory {
    fn get(&self, key: &Key) -> Option<Value> {
        self.state.get(key).cloned()
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.state.insert(key, value);
    }

    fn delete(&mut self, key: &Key) {
        self.state.remove(key);
    }
}

impl Memory {
    pub fn account(&self, id: &AccountId) -> Option<Account> {
        match self.state.get(&Key::Account(*id)) {
            Some(Value::Account(account)) => Some(account.clone()),
            _ => None,
        }
    }

    pub fn account_by_email(&self, email: &str) -> Option<Account> {
        let key = Key::AccountEmail(email.to_lowercase());
        match self.state.get(&key) {
            Some(Value::AccountEmail(id)) => self.account(id),
            _ => None,
        }
    }

    /// All drops, ends-soonest first.
    pub fn drops(&self) -> Vec<Drop> {
        let mut drops: Vec<Drop> = self
            .state
            .range(Key::Drop(0)..=Key::Drop(u64::MAX))
            .filter_map(|(_, value)| match value {
                Value::Drop(drop) => Some(drop.clone()),
                _ => None,
            })
            .collect();
        drops.sort_by_key(|drop| (drop.ends_at, drop.id));
        drops
    }

    pub fn find_drop(&self, id: DropId) -> Option<Drop> {
        match self.state.get(&Key::Drop(id)) {
            Some(Value::Drop(drop)) => Some(drop.clone()),
            _ => None,
        }
    }

    pub fn entries_for(&self, account: &AccountId) -> Vec<Entry> {
        self.state
            .range(Key::Entry(0, AccountId::nil())..=Key::Entry(u64::MAX, AccountId::max()))
            .rev()
            .filter_map(|(_, value)| match value {
                Value::Entry(entry) if entry.account == *account => Some(entry.clone()),
                _ => None,
            })
            .collect()
    }

    /// Completed drops this account won, newest first.
    pub fn wins_for(&self, account: &AccountId) -> Vec<Drop> {
        self.state
            .range(Key::Drop(0)..=Key::Drop(u64::MAX))
            .rev()
            .filter_map(|(_, value)| match value {
                Value::Drop(drop) if drop.winner == Some(*account) => Some(drop.clone()),
                _ => None,
            })
            .collect()
    }

    /// Comments on a drop, newest first.
    pub fn comments_for(&self, drop_id: DropId) -> Vec<Comment> {
        self.state
            .range(Key::Comment(0)..=Key::Comment(u64::MAX))
            .rev()
            .filter_map(|(_, value)| match value {
                Value::Comment(comment) if comment.drop_id == drop_id => Some(comment.clone()),
                _ => None,
            })
            .collect()
    }

    /// Most recent feed items, newest first.
    pub fn feed(&self, limit: usize) -> Vec<FeedItem> {
        self.state
            .range(Key::FeedItem(0)..=Key::FeedItem(u64::MAX))
            .rev()
            .filter_map(|(_, value)| match value {
                Value::FeedItem(item) => Some(item.clone()),
                _ => None,
            })
            .take(limit)
            .collect()
    }

    /// Most recent ledger records for an account, newest first.
    pub fn ledger_for(&self, account: &AccountId, limit: usize) -> Vec<LedgerRecord> {
        self.state
            .range(Key::LedgerRecord(0)..=Key::LedgerRecord(u64::MAX))
            .rev()
            .filter_map(|(_, value)| match value {
                Value::LedgerRecord(record) if record.account == *account => Some(record.clone()),
                _ => None,
            })
            .take(limit)
            .collect()
    }

    pub fn notifications_for(&self, account: &AccountId) -> Vec<Notification> {
        self.state
            .range(Key::Notification(0)..=Key::Notification(u64::MAX))
            .rev()
            .filter_map(|(_, value)| match value {
                Value::Notification(notification) if notification.account == *account => {
                    Some(notification.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn achievements_for(&self, account: &AccountId) -> Vec<Earned> {
        use dropclub_types::AchievementId;
        let low = Key::Achievement(*account, AchievementId::Streak3);
        let high = Key::Achievement(*account, AchievementId::Recruiter);
        self.state
            .range(low..=high)
            .filter_map(|(_, value)| match value {
                Value::Achievement(earned) => Some(earned.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn redemptions_for(&self, account: &AccountId) -> Vec<Redemption> {
        self.state
            .range(Key::Redemption(0)..=Key::Redemption(u64::MAX))
            .rev()
            .filter_map(|(_, value)| match value {
                Value::Redemption(redemption) if redemption.account == *account => {
                    Some(redemption.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Active mystery box catalog.
    pub fn mystery_rewards(&self) -> Vec<MysteryReward> {
        match self.state.get(&Key::MysteryCatalog) {
            Some(Value::MysteryCatalog(catalog)) => {
                catalog.iter().filter(|r| r.active).cloned().collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn leaderboard(&self) -> Leaderboard {
        match self.state.get(&Key::Leaderboard) {
            Some(Value::Leaderboard(board)) => board.clone(),
            _ => Leaderboard::default(),
        }
    }

    pub fn referral_count(&self, referrer: &AccountId) -> u64 {
        self.state
            .range(Key::Referral(AccountId::nil())..=Key::Referral(AccountId::max()))
            .filter(|(_, value)| {
                matches!(value, Value::Referral(referral) if referral.referrer == *referrer)
            })
            .count() as u64
    }

    pub fn stats(&self) -> Stats {
        let mut stats = Stats::default();
        for value in self.state.values() {
            match value {
                Value::Account(account) => {
                    stats.accounts += 1;
                    stats.points_outstanding += account.points;
                }
                Value::Drop(_) => stats.drops += 1,
                Value::Entry(_) => stats.entries += 1,
                _ => {}
            }
        }
        stats
    }
}
