use crate::{
    Account, AccountId, ArcadeOutcome, Comment, Drop, DropId, FeedItem, GameKind, HiLoGuess,
    LedgerRecord, MysteryReward, Notification, PointPack, RewardItem,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// JSON success envelope: `{"success": true, ...payload}`.
#[derive(Clone, Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Envelope<T> {
    Envelope {
        success: true,
        data,
    }
}

/// JSON failure envelope: `{"success": false, "error": "..."}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Failure {
    pub success: bool,
    pub error: String,
}

impl Failure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Public view of an account; credentials never leave the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: AccountId,
    pub email: String,
    pub username: String,
    pub points: u64,
    pub lifetime_points: u64,
    pub login_streak: u32,
    pub subscriber: bool,
    pub vip: bool,
    pub admin: bool,
    pub referral_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for Profile {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            username: account.username.clone(),
            points: account.points,
            lifetime_points: account.lifetime_points,
            login_streak: account.login_streak,
            subscriber: account.subscriber,
            vip: account.vip,
            admin: account.admin,
            referral_code: account.referral_code.clone(),
            created_at: account.created_at,
        }
    }
}

// === Requests ===

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayRequest {
    pub game: GameKind,
    /// Required for hi-lo, ignored elsewhere.
    #[serde(default)]
    pub guess: Option<HiLoGuess>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferralRequest {
    pub code: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedeemRequest {
    pub reward_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommentRequest {
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub pack_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateDropRequest {
    pub title: String,
    pub prize: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub entry_cost: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateDropRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub prize: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WinnerRequest {
    /// Explicit winner; a uniform draw over entrants when omitted.
    #[serde(default)]
    pub account_id: Option<AccountId>,
}

// === Responses ===

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: Uuid,
    pub profile: Profile,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub entries: u64,
    pub wins: u64,
    pub referrals: u64,
    pub rank: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnterReceipt {
    pub drop_id: DropId,
    pub points: u64,
    pub entry_count: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArcadeReceipt {
    pub outcome: ArcadeOutcome,
    pub points: u64,
    pub lifetime_points: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MysteryReceipt {
    pub reward: MysteryReward,
    pub points: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreakReceipt {
    pub streak: u32,
    pub bonus: u64,
    pub already_claimed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CodeResponse {
    pub code: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub account: AccountId,
    pub username: String,
    pub lifetime_points: u64,
    pub vip: bool,
    pub login_streak: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AchievementView {
    pub id: crate::AchievementId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub earned: bool,
    pub earned_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub accounts: u64,
    pub drops: u64,
    pub entries: u64,
    pub points_outstanding: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedeemReceipt {
    pub reward_id: String,
    pub cost: u64,
    pub points: u64,
}

/// Bare `{"success": true}` acknowledgement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ack {}

/// Payment provider acknowledgement; not enveloped.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

// === List payloads ===

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DropsResponse {
    pub drops: Vec<Drop>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DropResponse {
    pub drop: Drop,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommentsResponse {
    pub comments: Vec<Comment>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommentResponse {
    pub comment: Comment,
}

/// One entered drop on the vault page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntryView {
    pub drop: Drop,
    pub entered_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntriesResponse {
    pub entries: Vec<EntryView>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WinsResponse {
    pub wins: Vec<Drop>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerResponse {
    pub records: Vec<LedgerRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedResponse {
    pub items: Vec<FeedItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub standings: Vec<LeaderboardRow>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AchievementsResponse {
    pub achievements: Vec<AchievementView>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

/// Catalog is static, so this payload only serializes.
#[derive(Clone, Debug, Serialize)]
pub struct RewardsResponse {
    pub rewards: Vec<RewardItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PacksResponse {
    pub packs: Vec<PointPack>,
}

// === Real-time updates ===

/// Broadcast message pushed to live feed subscribers.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Update {
    Feed { item: FeedItem },
    Drop { drop: Drop },
    Balance {
        account: AccountId,
        points: u64,
        lifetime_points: u64,
    },
    Notification { notification: Notification },
    Comment { comment: Comment },
}

impl Update {
    /// Account this update is scoped to; `None` means public.
    pub fn account_scope(&self) -> Option<AccountId> {
        match self {
            Update::Balance { account, .. } => Some(*account),
            Update::Notification { notification } => Some(notification.account),
            Update::Feed { .. } | Update::Drop { .. } | Update::Comment { .. } => None,
        }
    }
}

/// Subscription filter for the updates socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdatesFilter {
    All,
    Account(AccountId),
}

impl UpdatesFilter {
    /// Whether an update should be delivered under this filter.
    pub fn accepts(&self, update: &Update) -> bool {
        match self {
            UpdatesFilter::All => true,
            UpdatesFilter::Account(account) => match update.account_scope() {
                None => true,
                Some(scope) => scope == *account,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseFilterError(String);

impl fmt::Display for ParseFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid updates filter: {}", self.0)
    }
}

impl std::error::Error for ParseFilterError {}

impl FromStr for UpdatesFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "all" {
            return Ok(UpdatesFilter::All);
        }
        match s.strip_prefix("account:") {
            Some(id) => Uuid::parse_str(id)
                .map(UpdatesFilter::Account)
                .map_err(|_| ParseFilterError(s.to_string())),
            None => Err(ParseFilterError(s.to_string())),
        }
    }
}

impl fmt::Display for UpdatesFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdatesFilter::All => write!(f, "all"),
            UpdatesFilter::Account(account) => write!(f, "account:{account}"),
        }
    }
}
