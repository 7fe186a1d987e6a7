//! One-shot arcade resolvers.
//!
//! Every game settles in a single call against the caller's RNG and
//! returns an [`ArcadeOutcome`](dropclub_types::ArcadeOutcome) carrying
//! the points won. Payout tables live next to each game; the weighted
//! draw most of them share lives here.

use rand::Rng;

pub mod coin_flip;
pub mod hi_lo;
pub mod scratch;
pub mod slots;
pub mod wheel;

/// Weighted outcome table. Weights are relative shares of the total.
pub struct WeightedTable<T> {
    entries: Vec<(T, u32)>,
    total: u32,
}

impl<T: Copy> WeightedTable<T> {
    pub fn new(entries: &[(T, u32)]) -> Self {
        debug_assert!(!entries.is_empty());
        let total = entries.iter().map(|(_, weight)| weight).sum();
        Self {
            entries: entries.to_vec(),
            total,
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Map a raw draw onto the cumulative bands. Draws at or past the
    /// total land on the first entry.
    pub fn pick_at(&self, draw: u32) -> T {
        let mut remaining = draw;
        for (value, weight) in &self.entries {
            if remaining < *weight {
                return *value;
            }
            remaining -= *weight;
        }
        self.entries[0].0
    }

    pub fn draw(&self, rng: &mut impl Rng) -> T {
        self.pick_at(rng.gen_range(0..self.total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_bands_are_cumulative() {
        let table = WeightedTable::new(&[("a", 60), ("b", 30), ("c", 10)]);
        assert_eq!(table.total(), 100);
        assert_eq!(table.pick_at(0), "a");
        assert_eq!(table.pick_at(59), "a");
        assert_eq!(table.pick_at(60), "b");
        assert_eq!(table.pick_at(89), "b");
        assert_eq!(table.pick_at(90), "c");
        assert_eq!(table.pick_at(99), "c");
    }

    #[test]
    fn test_overshoot_falls_back_to_first() {
        let table = WeightedTable::new(&[("a", 1), ("b", 1)]);
        assert_eq!(table.pick_at(2), "a");
        assert_eq!(table.pick_at(u32::MAX), "a");
    }

    #[test]
    fn test_draw_stays_in_table() {
        let table = WeightedTable::new(&[(1u64, 5), (2, 5), (3, 1)]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let value = table.draw(&mut rng);
            assert!((1..=3).contains(&value));
        }
    }
}
