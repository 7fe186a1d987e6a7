use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Scratch,
    Wheel,
    Slots,
    CoinFlip,
    HiLo,
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameKind::Scratch => "scratch",
            GameKind::Wheel => "wheel",
            GameKind::Slots => "slots",
            GameKind::CoinFlip => "coinflip",
            GameKind::HiLo => "hilo",
        };
        write!(f, "{name}")
    }
}

/// Slot reel alphabet. Serialized as the emoji shown to players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotSymbol {
    #[serde(rename = "🍒")]
    Cherry,
    #[serde(rename = "🍋")]
    Lemon,
    #[serde(rename = "🔔")]
    Bell,
    #[serde(rename = "💎")]
    Diamond,
    #[serde(rename = "7️⃣")]
    Seven,
    #[serde(rename = "🍀")]
    Clover,
}

pub const SLOT_SYMBOLS: [SlotSymbol; 6] = [
    SlotSymbol::Cherry,
    SlotSymbol::Lemon,
    SlotSymbol::Bell,
    SlotSymbol::Diamond,
    SlotSymbol::Seven,
    SlotSymbol::Clover,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinFace {
    Heads,
    Tails,
    Edge,
}

impl CoinFace {
    /// Points carried by the face; edge pays out unconditionally.
    pub fn value(self) -> u64 {
        match self {
            CoinFace::Heads | CoinFace::Tails => 15,
            CoinFace::Edge => 100,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HiLoGuess {
    Higher,
    Lower,
}

/// Fully resolved arcade play, computed server-side only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum ArcadeOutcome {
    Scratch {
        payout: u64,
    },
    Wheel {
        payout: u64,
        jackpot: bool,
    },
    Slots {
        reels: [SlotSymbol; 3],
        payout: u64,
    },
    CoinFlip {
        landed: CoinFace,
        won: bool,
        payout: u64,
    },
    HiLo {
        first: u8,
        second: u8,
        guess: HiLoGuess,
        payout: u64,
    },
}

impl ArcadeOutcome {
    pub fn payout(&self) -> u64 {
        match self {
            ArcadeOutcome::Scratch { payout }
            | ArcadeOutcome::Wheel { payout, .. }
            | ArcadeOutcome::Slots { payout, .. }
            | ArcadeOutcome::CoinFlip { payout, .. }
            | ArcadeOutcome::HiLo { payout, .. } => *payout,
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            ArcadeOutcome::Scratch { .. } => GameKind::Scratch,
            ArcadeOutcome::Wheel { .. } => GameKind::Wheel,
            ArcadeOutcome::Slots { .. } => GameKind::Slots,
            ArcadeOutcome::CoinFlip { .. } => GameKind::CoinFlip,
            ArcadeOutcome::HiLo { .. } => GameKind::HiLo,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Weighted mystery box reward. The catalog is seeded at startup and
/// drawn from at open time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MysteryReward {
    pub id: u32,
    pub name: String,
    pub icon: String,
    pub rarity: Rarity,
    pub value: u64,
    pub weight: u32,
    pub active: bool,
}

/// Catalog used when the config does not provide one.
pub fn default_mystery_rewards() -> Vec<MysteryReward> {
    let rows = [
        ("Pocket Change", "🪙", Rarity::Common, 25, 40),
        ("Coin Stack", "💰", Rarity::Common, 50, 25),
        ("Point Surge", "⚡", Rarity::Rare, 75, 18),
        ("Gem Cache", "💎", Rarity::Rare, 100, 10),
        ("Golden Vault", "🏆", Rarity::Epic, 200, 6),
        ("Motherlode", "🌟", Rarity::Legendary, 500, 1),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(i, (name, icon, rarity, value, weight))| MysteryReward {
            id: i as u32 + 1,
            name: name.to_string(),
            icon: icon.to_string(),
            rarity,
            value,
            weight,
            active: true,
        })
        .collect()
}
