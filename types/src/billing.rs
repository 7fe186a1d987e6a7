use crate::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Purchasable point pack. Credits land only through the verified
/// webhook, never from the checkout call itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointPack {
    pub id: String,
    pub name: String,
    pub points: u64,
    pub price_cents: u64,
    pub description: String,
}

pub fn default_point_packs() -> Vec<PointPack> {
    vec![
        PointPack {
            id: "pack_small".to_string(),
            name: "Handful of Points".to_string(),
            points: 100,
            price_cents: 5_000,
            description: "Enough to enter ~20 standard drops.".to_string(),
        },
        PointPack {
            id: "pack_medium".to_string(),
            name: "Bag of Points".to_string(),
            points: 500,
            price_cents: 20_000,
            description: "Serious players only. Best value.".to_string(),
        },
        PointPack {
            id: "pack_large".to_string(),
            name: "Chest of Points".to_string(),
            points: 1_500,
            price_cents: 50_000,
            description: "Whale status. Dominate the vault.".to_string(),
        },
    ]
}

/// Static redemption catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RewardItem {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: u64,
    pub icon: &'static str,
}

pub const REWARD_CATALOG: [RewardItem; 4] = [
    RewardItem {
        id: "badge_vip",
        name: "VIP Badge",
        description: "Show off your status with a golden profile badge.",
        cost: 500,
        icon: "👑",
    },
    RewardItem {
        id: "early_access",
        name: "Early Drop Alerts",
        description: "Get notified 5 minutes before drops go live.",
        cost: 300,
        icon: "🔔",
    },
    RewardItem {
        id: "theme_neon",
        name: "Neon Dashboard Theme",
        description: "Unlock the exclusive Cyber-Neon color scheme.",
        cost: 200,
        icon: "🎨",
    },
    RewardItem {
        id: "double_xp",
        name: "Double Points Weekend",
        description: "Earn 2x points on all games for 48 hours.",
        cost: 150,
        icon: "✨",
    },
];

/// Lookup into the redemption catalog.
pub fn reward_item(id: &str) -> Option<&'static RewardItem> {
    REWARD_CATALOG.iter().find(|item| item.id == id)
}

/// One redeemed reward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redemption {
    pub id: u64,
    pub account: AccountId,
    pub reward_id: String,
    pub cost: u64,
    pub created_at: DateTime<Utc>,
}

/// Event type carrying point purchases and subscription completions.
pub const EVENT_CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// Metadata marker distinguishing a point purchase from a subscription.
pub const PURCHASE_MARKER: &str = "point_purchase";

/// Provider webhook event, parsed after signature verification.
#[derive(Clone, Debug, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: WebhookPayload,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WebhookPayload {
    pub object: CheckoutSession,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CheckoutSession {
    #[serde(default)]
    pub metadata: CheckoutMetadata,
}

/// Provider metadata values arrive as strings; `points` is parsed at the
/// point of use.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CheckoutMetadata {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub user_id: Option<AccountId>,
    pub points: Option<String>,
    pub pack_id: Option<String>,
}
