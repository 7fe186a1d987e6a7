use crate::AccountId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Full account row, including credentials. Never serialized to clients
/// directly; see [`crate::api::Profile`] for the public view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
    pub points: u64,
    /// Monotonically non-decreasing: moves only on credits.
    pub lifetime_points: u64,
    pub login_streak: u32,
    /// Calendar-day granularity; drives the streak comparison.
    pub last_login: Option<NaiveDate>,
    /// Wall-clock timestamp of the last free arcade play.
    pub last_played: Option<DateTime<Utc>>,
    pub subscriber: bool,
    pub vip: bool,
    pub admin: bool,
    pub referral_code: Option<String>,
    pub referred_by: Option<AccountId>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        id: AccountId,
        email: String,
        username: String,
        password_hash: String,
        password_salt: String,
        admin: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            username,
            password_hash,
            password_salt,
            points: 0,
            lifetime_points: 0,
            login_streak: 0,
            last_login: None,
            last_played: None,
            subscriber: false,
            vip: false,
            admin,
            referral_code: None,
            referred_by: None,
            created_at,
        }
    }
}
