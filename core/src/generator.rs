use alloc::collections::BTreeSet;
use rand::prelude::*;

use crate::*;

/// Source of mine layouts for `Board::start`. Kept behind a trait so trials
/// can seed placement deterministically and alternate front ends can bring
/// their own distribution.
pub trait MineGenerator {
    fn generate(
        &mut self,
        config: GameConfig,
        start: Coord2,
        neighbors: &NeighborIndex,
    ) -> Result<BTreeSet<Coord2>>;
}

/// Uniform rejection sampling: draw random coordinates, skipping the start
/// tile, its whole neighborhood, and anything already mined, until the
/// requested count is placed.
#[derive(Clone, Debug)]
pub struct RandomMineGenerator {
    rng: SmallRng,
}

impl RandomMineGenerator {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(
        &mut self,
        config: GameConfig,
        start: Coord2,
        neighbors: &NeighborIndex,
    ) -> Result<BTreeSet<Coord2>> {
        let (rows, cols) = config.size;
        let start_zone = neighbors.of(start);
        let mut mined = BTreeSet::new();

        // The validated config keeps rejection sampling finite in
        // expectation; the cap turns anything it cannot see into an error
        // instead of a hang.
        let max_attempts = u64::from(config.total_cells())
            .saturating_mul(64)
            .max(100_000);
        let mut attempts: u64 = 0;

        while mined.len() < config.mines as usize {
            attempts += 1;
            if attempts > max_attempts {
                log::warn!(
                    "mine placement gave up after {} attempts ({} of {} placed)",
                    max_attempts,
                    mined.len(),
                    config.mines
                );
                return Err(GameError::PlacementFailed);
            }

            let coords = (
                self.rng.random_range(0..rows),
                self.rng.random_range(0..cols),
            );
            if coords == start || start_zone.contains(&coords) || mined.contains(&coords) {
                continue;
            }
            mined.insert(coords);
        }

        Ok(mined)
    }
}
