use glam::Vec2;
use ndarray::Array2;

use super::util::Index;

/// Static classification of a grid cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    #[default]
    Empty,
    Obstacle,
    Target,
}

/// Discretization of the scenario field into a cell lattice.
///
/// Cell contents are fixed after construction; pedestrians only read them.
pub struct SpatialGrid {
    /// Unit of length (in meters)
    pub unit: f32,
    /// Shape of 2D grid (y, x)
    pub shape: (usize, usize),
    cells: Array2<CellState>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        SpatialGrid {
            unit: 1.0,
            shape: (0, 0),
            cells: Array2::from_elem((0, 0), CellState::Empty),
        }
    }
}

impl SpatialGrid {
    pub fn new(size: Vec2, unit: f32) -> Self {
        let grid_size = (size / unit).ceil();
        let shape = (grid_size.y as usize, grid_size.x as usize);

        SpatialGrid {
            unit,
            shape,
            cells: Array2::from_elem(shape, CellState::Empty),
        }
    }

    /// Grid size as (cols, rows).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.shape.1, self.shape.0)
    }

    pub fn contains(&self, cell: Index) -> bool {
        self.cells.get(cell).is_some()
    }

    /// Cell classification, or `None` out of bounds.
    pub fn classify(&self, cell: Index) -> Option<CellState> {
        self.cells.get(cell).copied()
    }

    /// Cell containing a world position. The result may lie outside the
    /// grid; callers bounds-check before indexing with it.
    pub fn world_to_cell(&self, position: Vec2) -> Index {
        let scaled = (position / self.unit).floor();
        Index::new(scaled.x as i32, scaled.y as i32)
    }

    /// Center point of a cell in world coordinates.
    pub fn cell_to_world(&self, cell: Index) -> Vec2 {
        Vec2::new(cell.x as f32 + 0.5, cell.y as f32 + 0.5) * self.unit
    }

    /// Mark every cell overlapping the world-space box with `state`.
    /// Later markings overwrite earlier ones.
    pub fn mark_region(&mut self, min: Vec2, max: Vec2, state: CellState) {
        let start = self.world_to_cell(min);
        let end = self.world_to_cell(max);

        let x_start = start.x.max(0);
        let y_start = start.y.max(0);
        let x_end = end.x.min(self.shape.1 as i32 - 1);
        let y_end = end.y.min(self.shape.0 as i32 - 1);

        for y in y_start..=y_end {
            for x in x_start..=x_end {
                self.cells[Index::new(x, y)] = state;
            }
        }
    }

    /// Non-obstacle cells of the 3x3 block around `cell`, clipped to the
    /// grid. The center cell itself is included when walkable.
    pub fn walkable_neighborhood(&self, cell: Index) -> impl Iterator<Item = Index> + '_ {
        let x_start = (cell.x - 1).max(0);
        let y_start = (cell.y - 1).max(0);
        let x_end = (cell.x + 1).min(self.shape.1 as i32 - 1);
        let y_end = (cell.y + 1).min(self.shape.0 as i32 - 1);

        (y_start..=y_end)
            .flat_map(move |y| (x_start..=x_end).map(move |x| Index::new(x, y)))
            .filter(|&ix| self.cells[ix] != CellState::Obstacle)
    }

    pub fn count_cells(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }
}

#[cfg(test)]
mod tests {
    use glam::vec2;

    use super::*;

    #[test]
    fn test_world_to_cell() {
        let grid = SpatialGrid::new(vec2(5.0, 5.0), 1.0);
        assert_eq!(grid.world_to_cell(vec2(0.0, 0.0)), Index::new(0, 0));
        assert_eq!(grid.world_to_cell(vec2(4.9, 4.9)), Index::new(4, 4));
        assert_eq!(grid.world_to_cell(vec2(2.0, 3.7)), Index::new(2, 3));

        let grid = SpatialGrid::new(vec2(5.0, 6.0), 0.5);
        assert_eq!(grid.world_to_cell(vec2(2.0, 3.7)), Index::new(4, 7));
    }

    #[test]
    fn test_cell_to_world_roundtrip() {
        let grid = SpatialGrid::new(vec2(8.0, 4.0), 1.0);
        let center = grid.cell_to_world(Index::new(3, 2));
        assert_eq!(center, vec2(3.5, 2.5));
        assert_eq!(grid.world_to_cell(center), Index::new(3, 2));
    }

    #[test]
    fn test_mark_region_clips_and_overwrites() {
        let mut grid = SpatialGrid::new(vec2(5.0, 5.0), 1.0);
        grid.mark_region(vec2(1.2, 1.2), vec2(3.8, 2.8), CellState::Obstacle);

        assert_eq!(grid.classify(Index::new(1, 1)), Some(CellState::Obstacle));
        assert_eq!(grid.classify(Index::new(3, 2)), Some(CellState::Obstacle));
        assert_eq!(grid.classify(Index::new(0, 1)), Some(CellState::Empty));
        assert_eq!(grid.classify(Index::new(4, 1)), Some(CellState::Empty));

        // a region reaching past the grid is clipped, not an error
        grid.mark_region(vec2(-2.0, 4.0), vec2(10.0, 9.0), CellState::Target);
        assert_eq!(grid.classify(Index::new(0, 4)), Some(CellState::Target));
        assert_eq!(grid.classify(Index::new(4, 4)), Some(CellState::Target));
        assert_eq!(grid.classify(Index::new(5, 4)), None);

        // later markings win
        grid.mark_region(vec2(1.2, 1.2), vec2(3.8, 2.8), CellState::Empty);
        assert_eq!(grid.classify(Index::new(2, 2)), Some(CellState::Empty));
        assert_eq!(grid.count_cells(CellState::Obstacle), 0);
    }

    #[test]
    fn test_walkable_neighborhood() {
        let mut grid = SpatialGrid::new(vec2(3.0, 3.0), 1.0);
        grid.mark_region(vec2(1.0, 0.0), vec2(1.9, 0.9), CellState::Obstacle);

        let neighbors: Vec<_> = grid.walkable_neighborhood(Index::new(0, 0)).collect();
        assert_eq!(
            neighbors,
            vec![Index::new(0, 0), Index::new(0, 1), Index::new(1, 1)]
        );

        let center: Vec<_> = grid.walkable_neighborhood(Index::new(1, 1)).collect();
        assert_eq!(center.len(), 8);
        assert!(!center.contains(&Index::new(1, 0)));
    }
}
