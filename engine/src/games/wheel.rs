use super::WeightedTable;
use dropclub_types::{constants::JACKPOT_THRESHOLD, ArcadeOutcome};
use rand::Rng;

/// Wheel segments. The 500 band is the jackpot slice.
const SEGMENTS: [(u64, u32); 5] = [(10, 40), (25, 30), (50, 20), (100, 9), (500, 1)];

pub fn resolve(rng: &mut impl Rng) -> ArcadeOutcome {
    let payout = WeightedTable::new(&SEGMENTS).draw(rng);
    ArcadeOutcome::Wheel {
        payout,
        jackpot: payout >= JACKPOT_THRESHOLD,
    }
}
