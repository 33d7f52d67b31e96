use crate::{Field, GameConfig};
pub use random::*;

mod random;

/// Produces the mine layout for a new game.
pub trait FieldGenerator {
    fn generate(self, config: &GameConfig) -> Field;
}
