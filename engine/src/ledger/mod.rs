use crate::state::{Counter, Key, State, Status, Value};
use chrono::{DateTime, Duration, Utc};
use dropclub_types::{
    api::Update, Account, AccountId, AchievementId, Earned, FeedItem, FeedKind, Leaderboard,
    LedgerRecord, Notification,
};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use thiserror::Error;

mod handlers;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Account not found")]
    AccountNotFound,
    #[error("That email is already registered")]
    EmailTaken,
    #[error("A valid email address is required")]
    InvalidEmail,
    #[error("Username must be 1-32 characters")]
    InvalidUsername,
    #[error("Drop not found")]
    DropNotFound,
    #[error("This drop has ended")]
    DropClosed,
    #[error("You have already entered this drop.")]
    AlreadyEntered,
    #[error("Not enough points")]
    InsufficientBalance,
    #[error("Title, prize and end time are required")]
    InvalidDrop,
    #[error("End time must be in the future")]
    EndsInPast,
    #[error("Winner already picked")]
    WinnerAlreadyPicked,
    #[error("No entries to draw from")]
    NoEntrants,
    #[error("That account has not entered this drop")]
    WinnerNotEntered,
    #[error("Comment must be 1-500 characters")]
    InvalidComment,
    #[error("Free play is still on cooldown")]
    CooldownActive,
    #[error("Pick higher or lower first")]
    MissingGuess,
    #[error("The mystery box is empty right now")]
    EmptyCatalog,
    #[error("Invalid referral code")]
    InvalidReferralCode,
    #[error("Can't refer yourself!")]
    SelfReferral,
    #[error("Already used a referral code")]
    AlreadyReferred,
    #[error("Reward not found")]
    UnknownReward,
}

/// Tunables that vary by deployment rather than by command.
#[derive(Clone, Copy, Debug)]
pub struct Policy {
    /// Minimum gap between free arcade plays. `None` disables the gate.
    pub arcade_cooldown: Option<Duration>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            arcade_cooldown: Some(Duration::hours(24)),
        }
    }
}

/// One unit of work against the store.
///
/// Every command stages its writes in `pending` and records the updates
/// to broadcast in `events`; nothing touches the backing state until the
/// caller applies what [`Ledger::commit`] returns. A command that errors
/// is simply dropped, leaving no partial state.
pub struct Ledger<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,
    events: Vec<Update>,

    now: DateTime<Utc>,
    rng: ChaCha8Rng,
    policy: Policy,
}

impl<'a, S: State> Ledger<'a, S> {
    pub fn new(state: &'a S, now: DateTime<Utc>, rng: ChaCha8Rng, policy: Policy) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),
            events: Vec::new(),
            now,
            rng,
            policy,
        }
    }

    pub fn commit(self) -> (Vec<(Key, Status)>, Vec<Update>) {
        (self.pending.into_iter().collect(), self.events)
    }

    fn account(&self, id: &AccountId) -> Result<Account, LedgerError> {
        match self.get(&Key::Account(*id)) {
            Some(Value::Account(account)) => Ok(account),
            _ => Err(LedgerError::AccountNotFound),
        }
    }

    fn store_account(&mut self, account: Account) {
        self.insert(Key::Account(account.id), Value::Account(account));
    }

    fn find_drop(&self, id: dropclub_types::DropId) -> Result<dropclub_types::Drop, LedgerError> {
        match self.get(&Key::Drop(id)) {
            Some(Value::Drop(drop)) => Ok(drop),
            _ => Err(LedgerError::DropNotFound),
        }
    }

    /// Next id in a monotone sequence, starting at 1.
    fn next(&mut self, counter: Counter) -> u64 {
        let id = match self.get(&Key::Counter(counter)) {
            Some(Value::Counter(last)) => last + 1,
            _ => 1,
        };
        self.insert(Key::Counter(counter), Value::Counter(id));
        id
    }

    /// Add points. Lifetime total and the leaderboard move with every
    /// credit; the ledger record and the balance update are staged in
    /// the same changeset. The caller persists the account row.
    pub(in crate::ledger) fn credit(
        &mut self,
        account: &mut Account,
        amount: u64,
        reason: impl Into<String>,
    ) {
        account.points += amount;
        account.lifetime_points += amount;
        self.record(account.id, amount as i64, reason.into());
        self.update_leaderboard(account);
        self.emit_balance(account);
    }

    /// Remove points, rejecting rather than going below zero. Lifetime
    /// total is untouched. The caller persists the account row.
    pub(in crate::ledger) fn debit(
        &mut self,
        account: &mut Account,
        amount: u64,
        reason: impl Into<String>,
    ) -> Result<(), LedgerError> {
        if account.points < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        account.points -= amount;
        self.record(account.id, -(amount as i64), reason.into());
        self.emit_balance(account);
        Ok(())
    }

    fn record(&mut self, account: AccountId, amount: i64, reason: String) {
        let seq = self.next(Counter::Ledger);
        let record = LedgerRecord {
            seq,
            account,
            amount,
            reason,
            created_at: self.now,
        };
        self.insert(Key::LedgerRecord(seq), Value::LedgerRecord(record));
    }

    pub(in crate::ledger) fn update_leaderboard(&mut self, account: &Account) {
        let mut board = match self.get(&Key::Leaderboard) {
            Some(Value::Leaderboard(board)) => board,
            _ => Leaderboard::default(),
        };
        board.record(account.id, account.lifetime_points);
        self.insert(Key::Leaderboard, Value::Leaderboard(board));
    }

    pub(in crate::ledger) fn emit_balance(&mut self, account: &Account) {
        self.events.push(Update::Balance {
            account: account.id,
            points: account.points,
            lifetime_points: account.lifetime_points,
        });
    }

    pub(in crate::ledger) fn push_feed(
        &mut self,
        account: Option<AccountId>,
        username: &str,
        kind: FeedKind,
        description: String,
    ) {
        let id = self.next(Counter::Feed);
        let item = FeedItem {
            id,
            account,
            username: username.to_string(),
            kind,
            description,
            created_at: self.now,
        };
        self.insert(Key::FeedItem(id), Value::FeedItem(item.clone()));
        self.events.push(Update::Feed { item });
    }

    pub(in crate::ledger) fn notify(&mut self, account: AccountId, title: &str, body: String) {
        let id = self.next(Counter::Notification);
        let notification = Notification {
            id,
            account,
            title: title.to_string(),
            body,
            read: false,
            created_at: self.now,
        };
        self.insert(Key::Notification(id), Value::Notification(notification.clone()));
        self.events.push(Update::Notification { notification });
    }

    /// Award once; repeat calls are no-ops. Returns whether the
    /// achievement was newly earned.
    pub(in crate::ledger) fn award(&mut self, account: AccountId, id: AchievementId) -> bool {
        if self.get(&Key::Achievement(account, id)).is_some() {
            return false;
        }
        self.insert(
            Key::Achievement(account, id),
            Value::Achievement(Earned {
                account,
                id,
                created_at: self.now,
            }),
        );
        true
    }
}

impl<'a, S: State> State for Ledger<'a, S> {
    fn get(&self, key: &Key) -> Option<Value> {
        match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key),
        }
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    fn delete(&mut self, key: &Key) {
        self.pending.insert(key.clone(), Status::Delete);
    }
}
