//! Coin flip with a trick edge. The face draw is weighted; landing on
//! the edge pays out unconditionally. Heads and tails settle with an
//! independent fair coin, so the face shown does not decide the win.

use super::WeightedTable;
use dropclub_types::{ArcadeOutcome, CoinFace};
use rand::Rng;

const FACES: [(CoinFace, u32); 3] = [
    (CoinFace::Heads, 48),
    (CoinFace::Tails, 48),
    (CoinFace::Edge, 4),
];

pub fn resolve(rng: &mut impl Rng) -> ArcadeOutcome {
    let landed = WeightedTable::new(&FACES).draw(rng);
    if landed == CoinFace::Edge {
        return ArcadeOutcome::CoinFlip {
            landed,
            won: true,
            payout: landed.value(),
        };
    }

    let won = rng.gen_bool(0.5);
    ArcadeOutcome::CoinFlip {
        landed,
        won,
        payout: if won { landed.value() } else { 0 },
    }
}
