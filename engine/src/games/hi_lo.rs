//! Hi-lo rank call. Two ranks (ace low, 1..=13) are drawn; the player
//! calls the second against the first before seeing it. A push pays a
//! flat 50, a correct call pays more the closer the ranks were, and a
//! wrong call pays nothing.

use dropclub_types::{ArcadeOutcome, HiLoGuess};
use rand::Rng;

pub fn score(first: u8, second: u8, guess: HiLoGuess) -> u64 {
    if second == first {
        return 50;
    }
    let correct = match guess {
        HiLoGuess::Higher => second > first,
        HiLoGuess::Lower => second < first,
    };
    if !correct {
        return 0;
    }
    if first.abs_diff(second) <= 2 {
        25
    } else {
        10
    }
}

pub fn resolve(rng: &mut impl Rng, guess: HiLoGuess) -> ArcadeOutcome {
    let first = rng.gen_range(1..=13);
    let second = rng.gen_range(1..=13);
    ArcadeOutcome::HiLo {
        first,
        second,
        guess,
        payout: score(first, second, guess),
    }
}
