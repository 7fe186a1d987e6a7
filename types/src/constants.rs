/// Maximum username length at registration
pub const MAX_NAME_LENGTH: usize = 32;

/// Maximum body length for drop comments
pub const MAX_COMMENT_LENGTH: usize = 500;

/// Points credited to both sides of a referral
pub const REFERRAL_BONUS: u64 = 50;

/// Referral codes are this many uppercase alphanumeric characters
pub const REFERRAL_CODE_LENGTH: usize = 8;

/// Cost of opening a mystery box
pub const MYSTERY_BOX_COST: u64 = 100;

/// Arcade payouts at or above this land in the activity feed
pub const FEED_THRESHOLD: u64 = 50;

/// Arcade payouts at or above this are tagged as a jackpot
pub const JACKPOT_THRESHOLD: u64 = 200;

/// Streaks of exactly these lengths emit an achievement feed item
pub const STREAK_MILESTONES: [u32; 3] = [3, 7, 30];

/// Items returned by the activity feed endpoint
pub const FEED_PAGE_SIZE: usize = 20;

/// Records returned by the per-account ledger endpoint
pub const LEDGER_PAGE_SIZE: usize = 50;

/// Accounts tracked on the leaderboard
pub const LEADERBOARD_SIZE: usize = 50;

/// Image shown for drops created without one
pub const DEFAULT_DROP_IMAGE: &str = "/placeholder.jpg";
