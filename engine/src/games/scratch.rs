use super::WeightedTable;
use dropclub_types::ArcadeOutcome;
use rand::Rng;

/// Prize bands: every ticket pays something.
const PRIZES: [(u64, u32); 4] = [(10, 60), (25, 30), (50, 8), (100, 2)];

pub fn resolve(rng: &mut impl Rng) -> ArcadeOutcome {
    let payout = WeightedTable::new(&PRIZES).draw(rng);
    ArcadeOutcome::Scratch { payout }
}
