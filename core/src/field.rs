use ndarray::Array2;

use crate::{AsIndex, CellCount, GameError, Pos, Result, neighbors};

/// Mine layout of one game, fixed once generated.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    mines: Array2<bool>,
    mine_count: CellCount,
}

impl Field {
    pub fn from_mask(mines: Array2<bool>) -> Self {
        let mine_count = mines.iter().filter(|&&mine| mine).count() as CellCount;
        Self { mines, mine_count }
    }

    /// Builds a field with mines at exactly the given positions, for
    /// embedders and tests that need a known layout.
    pub fn from_mine_positions(size: Pos, positions: &[Pos]) -> Result<Self> {
        let mut mines: Array2<bool> = Array2::default(size.as_index());
        for &pos in positions {
            if pos.0 >= size.0 || pos.1 >= size.1 {
                return Err(GameError::OutOfBounds);
            }
            mines[pos.as_index()] = true;
        }
        Ok(Self::from_mask(mines))
    }

    pub fn size(&self) -> Pos {
        let dim = self.mines.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn total_cells(&self) -> CellCount {
        self.mines.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn is_mine(&self, pos: Pos) -> bool {
        self.mines[pos.as_index()]
    }

    pub fn check_pos(&self, pos: Pos) -> Result<Pos> {
        let size = self.size();
        if pos.0 < size.0 && pos.1 < size.1 {
            Ok(pos)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + use<> {
        neighbors(pos, self.size())
    }

    /// Number of mines among the up-to-8 surrounding cells.
    pub fn adjacent_mines(&self, pos: Pos) -> u8 {
        self.neighbors(pos).filter(|&p| self.is_mine(p)).count() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_mines_in_the_mask() {
        let field = Field::from_mine_positions((4, 3), &[(0, 0), (3, 2), (1, 1)]).unwrap();
        assert_eq!(field.size(), (4, 3));
        assert_eq!(field.total_cells(), 12);
        assert_eq!(field.mine_count(), 3);
        assert_eq!(field.safe_count(), 9);
        assert!(field.is_mine((1, 1)));
        assert!(!field.is_mine((2, 1)));
    }

    #[test]
    fn duplicate_positions_collapse() {
        let field = Field::from_mine_positions((2, 2), &[(0, 0), (0, 0)]).unwrap();
        assert_eq!(field.mine_count(), 1);
    }

    #[test]
    fn rejects_positions_outside_the_grid() {
        let err = Field::from_mine_positions((2, 2), &[(2, 0)]).unwrap_err();
        assert_eq!(err, GameError::OutOfBounds);
    }

    #[test]
    fn adjacency_matches_a_brute_force_recount() {
        let field =
            Field::from_mine_positions((4, 4), &[(0, 0), (1, 0), (2, 2), (3, 3)]).unwrap();

        for x in 0..4u16 {
            for y in 0..4u16 {
                let mut expected = 0;
                for dx in -1i32..=1 {
                    for dy in -1i32..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x as i32 + dx;
                        let ny = y as i32 + dy;
                        if (0..4).contains(&nx)
                            && (0..4).contains(&ny)
                            && field.is_mine((nx as u16, ny as u16))
                        {
                            expected += 1;
                        }
                    }
                }
                assert_eq!(field.adjacent_mines((x, y)), expected, "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn bounds_check() {
        let field = Field::from_mine_positions((3, 2), &[]).unwrap();
        assert_eq!(field.check_pos((2, 1)), Ok((2, 1)));
        assert_eq!(field.check_pos((3, 0)), Err(GameError::OutOfBounds));
        assert_eq!(field.check_pos((0, 2)), Err(GameError::OutOfBounds));
    }
}
