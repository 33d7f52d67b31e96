use ndarray::Array2;
use rand::prelude::*;

use super::FieldGenerator;
use crate::{AsIndex, CellCount, Field, GameConfig};

/// Scatters mines by rejection sampling: draw a random position, retry while
/// it already holds a mine, until the requested count is placed. Deterministic
/// for a given seed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScatterGenerator {
    seed: u64,
}

impl ScatterGenerator {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl FieldGenerator for ScatterGenerator {
    fn generate(self, config: &GameConfig) -> Field {
        let (width, height) = config.size();
        let total = config.total_cells();

        // full boards have nothing to sample
        if config.mines >= total {
            if config.mines > total {
                log::warn!(
                    "field already full, requested {} mines but only {} cells",
                    config.mines,
                    total
                );
            }
            return Field::from_mask(Array2::from_elem(config.size().as_index(), true));
        }

        let mut mines: Array2<bool> = Array2::default(config.size().as_index());
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut placed: CellCount = 0;
        while placed < config.mines {
            let pos = (rng.random_range(0..width), rng.random_range(0..height));
            let slot = &mut mines[pos.as_index()];
            if !*slot {
                *slot = true;
                placed += 1;
            }
        }

        Field::from_mask(mines)
    }
}
