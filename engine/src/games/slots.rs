//! Three-reel slots. Reels spin independently and uniformly.
//!
//! Payouts: triple sevens 500, triple diamonds 200, any other triple
//! 75, exactly two matching 15, all different 0.

use dropclub_types::{ArcadeOutcome, SlotSymbol, SLOT_SYMBOLS};
use rand::Rng;

pub fn payout_for(reels: [SlotSymbol; 3]) -> u64 {
    let [a, b, c] = reels;
    if a == b && b == c {
        return match a {
            SlotSymbol::Seven => 500,
            SlotSymbol::Diamond => 200,
            _ => 75,
        };
    }
    if a == b || b == c || a == c {
        return 15;
    }
    0
}

pub fn resolve(rng: &mut impl Rng) -> ArcadeOutcome {
    let mut spin = || SLOT_SYMBOLS[rng.gen_range(0..SLOT_SYMBOLS.len())];
    let reels = [spin(), spin(), spin()];
    ArcadeOutcome::Slots {
        reels,
        payout: payout_for(reels),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use SlotSymbol::*;

    #[test]
    fn test_payout_ladder() {
        assert_eq!(payout_for([Seven, Seven, Seven]), 500);
        assert_eq!(payout_for([Diamond, Diamond, Diamond]), 200);
        assert_eq!(payout_for([Cherry, Cherry, Cherry]), 75);
        assert_eq!(payout_for([Clover, Clover, Clover]), 75);
        assert_eq!(payout_for([Cherry, Cherry, Lemon]), 15);
        assert_eq!(payout_for([Bell, Cherry, Bell]), 15);
        assert_eq!(payout_for([Lemon, Bell, Bell]), 15);
        assert_eq!(payout_for([Cherry, Lemon, Bell]), 0);
    }

    #[test]
    fn test_resolve_reports_its_own_reels() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let ArcadeOutcome::Slots { reels, payout } = resolve(&mut rng) else {
                panic!("wrong outcome kind");
            };
            assert_eq!(payout, payout_for(reels));
        }
    }
}
