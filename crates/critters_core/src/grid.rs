//! Dense occupancy map of the world.
//!
//! [`WorldGrid`] is the ground truth for what occupies which cell. Entity
//! cells carry the arena id plus the role tag, so sensing never needs to
//! touch the population.

use crate::config::RectConfig;
use crate::error::{CoreError, Result};
use crate::population::EntityId;
use critters_data::{EntityKind, Position};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Obstacle,
    Entity { id: EntityId, kind: EntityKind },
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Result of an inspection query at a grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    OutOfBounds,
    Empty,
    Obstacle,
    Entity(EntityId, EntityKind),
}

/// Static cells pre-occupied by obstacles, supplied once per generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleMask {
    width: u16,
    height: u16,
    cells: Vec<bool>,
}

impl ObstacleMask {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![false; usize::from(width) * usize::from(height)],
        }
    }

    /// Rasterizes rectangles into a mask. Parts outside the world are clipped.
    #[must_use]
    pub fn from_rects(width: u16, height: u16, rects: &[RectConfig]) -> Self {
        let mut mask = Self::new(width, height);
        for rect in rects {
            let x_end = rect.x.saturating_add(rect.width).min(width);
            let y_end = rect.y.saturating_add(rect.height).min(height);
            for y in rect.y..y_end {
                for x in rect.x..x_end {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn set(&mut self, x: u16, y: u16, blocked: bool) {
        if x < self.width && y < self.height {
            let idx = usize::from(y) * usize::from(self.width) + usize::from(x);
            self.cells[idx] = blocked;
        }
    }

    /// Out-of-range coordinates are never blocked.
    #[must_use]
    pub fn is_blocked(&self, x: u16, y: u16) -> bool {
        x < self.width
            && y < self.height
            && self.cells[usize::from(y) * usize::from(self.width) + usize::from(x)]
    }

    #[must_use]
    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|&&b| b).count()
    }
}

#[derive(Debug, Clone)]
pub struct WorldGrid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl WorldGrid {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; usize::from(width) * usize::from(height)],
        }
    }

    /// A fresh grid with every masked cell holding an obstacle.
    pub fn from_mask(width: u16, height: u16, mask: &ObstacleMask) -> Result<Self> {
        if mask.width() != width || mask.height() != height {
            return Err(CoreError::MaskMismatch {
                mask_width: mask.width(),
                mask_height: mask.height(),
                width,
                height,
            });
        }
        let mut grid = Self::new(width, height);
        for (cell, &blocked) in grid.cells.iter_mut().zip(&mask.cells) {
            if blocked {
                *cell = Cell::Obstacle;
            }
        }
        Ok(grid)
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    #[must_use]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < i32::from(self.width) && pos.y < i32::from(self.height)
    }

    #[inline]
    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * usize::from(self.width) + pos.x as usize)
    }

    /// `None` when `pos` lies outside the grid.
    #[inline]
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Writes a cell and returns its previous content, or `None` (and writes
    /// nothing) when `pos` lies outside the grid.
    pub fn set(&mut self, pos: Position, cell: Cell) -> Option<Cell> {
        let idx = self.index(pos)?;
        Some(std::mem::replace(&mut self.cells[idx], cell))
    }

    /// Resets every cell, obstacles included, to empty.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    #[must_use]
    pub fn occupant_at(&self, pos: Position) -> Occupant {
        match self.get(pos) {
            None => Occupant::OutOfBounds,
            Some(Cell::Empty) => Occupant::Empty,
            Some(Cell::Obstacle) => Occupant::Obstacle,
            Some(Cell::Entity { id, kind }) => Occupant::Entity(id, kind),
        }
    }

    fn position_of(&self, idx: usize) -> Position {
        let w = usize::from(self.width);
        Position::new((idx % w) as i32, (idx / w) as i32)
    }

    /// Empty cells in row-major order.
    #[must_use]
    pub fn free_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_empty())
            .map(|(i, _)| self.position_of(i))
            .collect()
    }

    /// A uniformly random empty cell, or `None` if the grid is full.
    pub fn random_free_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        if self.cells.is_empty() {
            return None;
        }
        // Rejection sampling is fast while the grid is sparse.
        for _ in 0..32 {
            let idx = rng.gen_range(0..self.cells.len());
            if self.cells[idx].is_empty() {
                return Some(self.position_of(idx));
            }
        }
        let free = self.free_cells();
        if free.is_empty() {
            None
        } else {
            Some(free[rng.gen_range(0..free.len())])
        }
    }

    /// Every entity cell as `(position, id)`, row-major.
    pub fn entity_cells(&self) -> impl Iterator<Item = (Position, EntityId)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, c)| match c {
            Cell::Entity { id, .. } => Some((self.position_of(i), *id)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_mask_from_rects_clips() {
        let mask = ObstacleMask::from_rects(10, 10, &[RectConfig::new(8, 8, 5, 5)]);
        assert_eq!(mask.blocked_count(), 4);
        assert!(mask.is_blocked(9, 9));
        assert!(!mask.is_blocked(10, 10));
    }

    #[test]
    fn test_from_mask_seeds_obstacles() {
        let mut mask = ObstacleMask::new(4, 3);
        mask.set(1, 2, true);
        let grid = WorldGrid::from_mask(4, 3, &mask).unwrap();
        assert_eq!(grid.get(Position::new(1, 2)), Some(Cell::Obstacle));
        assert_eq!(grid.free_cells().len(), 11);
    }

    #[test]
    fn test_from_mask_rejects_wrong_size() {
        let mask = ObstacleMask::new(4, 4);
        let err = WorldGrid::from_mask(5, 4, &mask).unwrap_err();
        assert!(matches!(err, CoreError::MaskMismatch { .. }));
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut grid = WorldGrid::new(3, 3);
        assert!(!grid.in_bounds(Position::new(-1, 0)));
        assert!(!grid.in_bounds(Position::new(0, 3)));
        assert_eq!(grid.get(Position::new(3, 0)), None);
        assert_eq!(grid.set(Position::new(0, -1), Cell::Obstacle), None);
        assert_eq!(grid.occupant_at(Position::new(7, 7)), Occupant::OutOfBounds);
    }

    #[test]
    fn test_set_returns_previous() {
        let mut grid = WorldGrid::new(3, 3);
        let cell = Cell::Entity {
            id: EntityId(4),
            kind: EntityKind::Prey,
        };
        assert_eq!(grid.set(Position::new(1, 1), cell), Some(Cell::Empty));
        assert_eq!(
            grid.occupant_at(Position::new(1, 1)),
            Occupant::Entity(EntityId(4), EntityKind::Prey)
        );
        assert_eq!(grid.set(Position::new(1, 1), Cell::Empty), Some(cell));
    }

    #[test]
    fn test_clear_empties_everything() {
        let mask = ObstacleMask::from_rects(5, 5, &[RectConfig::new(0, 0, 5, 5)]);
        let mut grid = WorldGrid::from_mask(5, 5, &mask).unwrap();
        assert!(grid.free_cells().is_empty());
        grid.clear();
        assert_eq!(grid.free_cells().len(), 25);
    }

    #[test]
    fn test_random_free_cell() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mask = ObstacleMask::from_rects(6, 6, &[RectConfig::new(0, 0, 6, 5)]);
        let grid = WorldGrid::from_mask(6, 6, &mask).unwrap();
        for _ in 0..50 {
            let pos = grid.random_free_cell(&mut rng).unwrap();
            assert_eq!(pos.y, 5);
        }

        let full = WorldGrid::from_mask(
            2,
            2,
            &ObstacleMask::from_rects(2, 2, &[RectConfig::new(0, 0, 2, 2)]),
        )
        .unwrap();
        assert_eq!(full.random_free_cell(&mut rng), None);
    }
}
