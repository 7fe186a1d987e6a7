use crate::{AccountId, DropId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One referral, keyed by referee in storage so an account can be
/// referred at most once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub referrer: AccountId,
    pub referee: AccountId,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Win,
    Jackpot,
    MysteryBox,
    Achievement,
    Signup,
    DropNew,
    Entry,
}

/// Public activity feed row, stored and broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: u64,
    pub account: Option<AccountId>,
    pub username: String,
    pub kind: FeedKind,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Per-account notification (winner announcements, referral landings).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub account: AccountId,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Comment on a drop page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub drop_id: DropId,
    pub account: AccountId,
    pub username: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AchievementId {
    #[serde(rename = "streak_3")]
    Streak3,
    #[serde(rename = "streak_7")]
    Streak7,
    #[serde(rename = "streak_30")]
    Streak30,
    #[serde(rename = "first_entry")]
    FirstEntry,
    #[serde(rename = "first_win")]
    FirstWin,
    #[serde(rename = "jackpot")]
    Jackpot,
    #[serde(rename = "recruiter")]
    Recruiter,
}

impl AchievementId {
    /// Milestone achievement for a streak length, if one exists.
    pub fn for_streak(streak: u32) -> Option<Self> {
        match streak {
            3 => Some(Self::Streak3),
            7 => Some(Self::Streak7),
            30 => Some(Self::Streak30),
            _ => None,
        }
    }
}

/// Static achievement catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AchievementDef {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const ACHIEVEMENTS: [AchievementDef; 7] = [
    AchievementDef {
        id: AchievementId::Streak3,
        name: "Warming Up",
        description: "Hit a 3-day login streak.",
        icon: "🔥",
    },
    AchievementDef {
        id: AchievementId::Streak7,
        name: "Regular",
        description: "Hit a 7-day login streak.",
        icon: "📅",
    },
    AchievementDef {
        id: AchievementId::Streak30,
        name: "Die Hard",
        description: "Hit a 30-day login streak.",
        icon: "🏅",
    },
    AchievementDef {
        id: AchievementId::FirstEntry,
        name: "In The Game",
        description: "Enter your first drop.",
        icon: "🎟️",
    },
    AchievementDef {
        id: AchievementId::FirstWin,
        name: "First Blood",
        description: "Win points in the arcade.",
        icon: "🎯",
    },
    AchievementDef {
        id: AchievementId::Jackpot,
        name: "Jackpot",
        description: "Land an arcade payout of 200 or more.",
        icon: "💰",
    },
    AchievementDef {
        id: AchievementId::Recruiter,
        name: "Recruiter",
        description: "Refer another member.",
        icon: "🤝",
    },
];

/// Lookup into the static catalog. The catalog is ordered by variant.
pub fn achievement(id: AchievementId) -> &'static AchievementDef {
    let def = &ACHIEVEMENTS[id as usize];
    debug_assert_eq!(def.id, id);
    def
}

/// One earned achievement for one account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Earned {
    pub account: AccountId,
    pub id: AchievementId,
    pub created_at: DateTime<Utc>,
}
