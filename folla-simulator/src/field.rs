use std::{cmp::Reverse, collections::BinaryHeap, f32::consts::SQRT_2};

use ndarray::Array2;
use ordered_float::NotNan;

use super::{
    grid::{CellState, SpatialGrid},
    util::Index,
};

/// Shortest-path cost from every walkable cell to the nearest target cell,
/// over the 8-connected non-obstacle subgraph. Axis steps cost 1, diagonal
/// steps sqrt(2), in cell units. Unreachable cells hold infinity.
///
/// Computed once per scenario and read-only afterwards.
pub struct DistanceField {
    /// Shape of 2D grid (y, x)
    pub shape: (usize, usize),
    values: Array2<f32>,
    max_finite: f32,
}

impl Default for DistanceField {
    fn default() -> Self {
        DistanceField {
            shape: (0, 0),
            values: Array2::from_elem((0, 0), f32::INFINITY),
            max_finite: 0.0,
        }
    }
}

impl DistanceField {
    pub fn from_grid(grid: &SpatialGrid) -> Self {
        type Float = Reverse<NotNan<f32>>;

        let shape = grid.shape;
        let mut values = Array2::from_elem(shape, f32::INFINITY);
        let mut settled = Array2::from_elem(shape, false);
        let mut queue = BinaryHeap::<(Float, Index)>::new();
        let float = |x: f32| Reverse(NotNan::new(x).unwrap());

        for y in 0..shape.0 {
            for x in 0..shape.1 {
                let ix = Index::new(x, y);
                if grid.classify(ix) == Some(CellState::Target) {
                    values[ix] = 0.0;
                    queue.push((float(0.0), ix));
                }
            }
        }

        while let Some((u, ix)) = queue.pop() {
            if settled[ix] {
                continue;
            }
            settled[ix] = true;
            let u = u.0.into_inner();

            for neighbor in grid.walkable_neighborhood(ix) {
                if neighbor == ix || settled[neighbor] {
                    continue;
                }

                let step = if neighbor.x != ix.x && neighbor.y != ix.y {
                    SQRT_2
                } else {
                    1.0
                };
                let relaxed = u + step;
                if relaxed < values[neighbor] {
                    values[neighbor] = relaxed;
                    queue.push((float(relaxed), neighbor));
                }
            }
        }

        let max_finite = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0, f32::max);

        let field = DistanceField {
            shape,
            values,
            max_finite,
        };
        debug_assert!(field.is_locally_optimal(grid));
        field
    }

    /// Field value at `cell`, infinity when out of bounds.
    pub fn value(&self, cell: Index) -> f32 {
        self.values.get(cell).copied().unwrap_or(f32::INFINITY)
    }

    /// Dense read-only view for heat-map rendering.
    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    /// Largest finite value, for color normalization.
    pub fn max_finite(&self) -> f32 {
        self.max_finite
    }

    /// Shortest-path optimality: every walkable non-target cell holds the
    /// minimum over its walkable neighbors of value + step distance.
    pub fn is_locally_optimal(&self, grid: &SpatialGrid) -> bool {
        for y in 0..self.shape.0 {
            for x in 0..self.shape.1 {
                let ix = Index::new(x, y);
                match grid.classify(ix) {
                    Some(CellState::Obstacle) => {
                        if self.values[ix].is_finite() {
                            return false;
                        }
                        continue;
                    }
                    Some(CellState::Target) => {
                        if self.values[ix] != 0.0 {
                            return false;
                        }
                        continue;
                    }
                    _ => {}
                }

                let best = grid
                    .walkable_neighborhood(ix)
                    .filter(|&n| n != ix)
                    .map(|n| {
                        let step = if n.x != ix.x && n.y != ix.y { SQRT_2 } else { 1.0 };
                        self.value(n) + step
                    })
                    .fold(f32::INFINITY, f32::min);

                let value = self.values[ix];
                if value.is_finite() {
                    if (value - best).abs() > 1e-4 {
                        return false;
                    }
                } else if best.is_finite() {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use glam::vec2;

    use super::*;

    fn open_grid_with_target() -> SpatialGrid {
        let mut grid = SpatialGrid::new(vec2(5.0, 5.0), 1.0);
        grid.mark_region(vec2(4.0, 4.0), vec2(4.9, 4.9), CellState::Target);
        grid
    }

    #[test]
    fn test_diagonal_distance() {
        let field = DistanceField::from_grid(&open_grid_with_target());

        assert_float_absolute_eq!(field.value(Index::new(4, 4)), 0.0);
        assert_float_absolute_eq!(field.value(Index::new(0, 0)), 4.0 * SQRT_2, 1e-4);
        assert_float_absolute_eq!(field.value(Index::new(0, 4)), 4.0, 1e-4);
        assert_float_absolute_eq!(field.value(Index::new(3, 3)), SQRT_2, 1e-4);
        assert_float_absolute_eq!(field.max_finite(), 4.0 * SQRT_2, 1e-4);
    }

    #[test]
    fn test_wall_forces_detour() {
        let mut grid = open_grid_with_target();
        // vertical wall at x = 3, open only at the top row
        grid.mark_region(vec2(3.0, 1.0), vec2(3.9, 4.9), CellState::Obstacle);

        let field = DistanceField::from_grid(&grid);
        assert!(field.is_locally_optimal(&grid));

        // the straight diagonal is blocked, the path detours through (3, 0)
        assert!(field.value(Index::new(0, 0)) > 4.0 * SQRT_2);
        assert!(field.value(Index::new(3, 2)).is_infinite());
    }

    #[test]
    fn test_unreachable_is_infinite() {
        let mut grid = open_grid_with_target();
        // seal off the left column entirely
        grid.mark_region(vec2(1.0, 0.0), vec2(1.9, 4.9), CellState::Obstacle);

        let field = DistanceField::from_grid(&grid);
        for y in 0..5 {
            assert!(field.value(Index::new(0, y)).is_infinite());
        }
        assert!(field.value(Index::new(2, 2)).is_finite());
        assert!(field.is_locally_optimal(&grid));
    }

    #[test]
    fn test_no_targets_leaves_field_infinite() {
        let grid = SpatialGrid::new(vec2(3.0, 3.0), 1.0);
        let field = DistanceField::from_grid(&grid);
        assert!(field.values().iter().all(|v| v.is_infinite()));
        assert_float_absolute_eq!(field.max_finite(), 0.0);
    }
}
