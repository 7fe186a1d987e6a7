use crate::{AccountId, DropId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropStatus {
    Active,
    Completed,
}

/// A time-boxed prize drawing users pay points to enter.
///
/// `entrants` is the draw list for winner selection and is always written
/// together with the matching [`Entry`] row; `entry_count` equals its
/// length. Completion is terminal: once `winner` is set nothing mutates
/// the drop again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drop {
    pub id: DropId,
    pub title: String,
    pub prize: String,
    pub image_url: String,
    pub ends_at: DateTime<Utc>,
    pub entry_cost: u64,
    pub entry_count: u64,
    pub status: DropStatus,
    pub winner: Option<AccountId>,
    #[serde(skip)]
    pub entrants: Vec<AccountId>,
    pub created_at: DateTime<Utc>,
}

impl Drop {
    /// Open for entries: no winner yet and the deadline has not passed.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == DropStatus::Active && self.winner.is_none() && self.ends_at > now
    }
}

/// One entry of one account into one drop. Uniqueness of the
/// (drop, account) pair is enforced by the storage key itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub drop_id: DropId,
    pub account: AccountId,
    pub created_at: DateTime<Utc>,
}
