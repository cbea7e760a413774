use ndarray::Array2;
use thin_vec::ThinVec;

use super::util::Index;

/// Per-cell bookkeeping of which pedestrians currently occupy a cell and how
/// many have claimed it as their next destination. The stepper is the only
/// writer; it applies each pedestrian's updates before moving to the next.
pub struct OccupancyTracker {
    occupants: Array2<ThinVec<u32>>,
    reserved: Array2<u16>,
}

impl OccupancyTracker {
    pub fn new(shape: (usize, usize)) -> Self {
        OccupancyTracker {
            occupants: Array2::from_elem(shape, ThinVec::new()),
            reserved: Array2::from_elem(shape, 0),
        }
    }

    /// Drop all occupants and reservations, keeping the shape.
    pub fn clear(&mut self) {
        self.occupants.fill(ThinVec::new());
        self.reserved.fill(0);
    }

    pub fn enter(&mut self, cell: Index, id: u32) {
        let occupants = &mut self.occupants[cell];
        if !occupants.has_capacity() {
            occupants.reserve(4);
        }
        occupants.push(id);
    }

    pub fn leave(&mut self, cell: Index, id: u32) {
        let occupants = &mut self.occupants[cell];
        if let Some(at) = occupants.iter().position(|&p| p == id) {
            occupants.remove(at);
        }
    }

    pub fn reserve(&mut self, cell: Index) {
        self.reserved[cell] += 1;
    }

    pub fn release(&mut self, cell: Index) {
        debug_assert!(self.reserved[cell] > 0);
        self.reserved[cell] -= 1;
    }

    /// Ids of the pedestrians occupying `cell`; empty out of bounds.
    pub fn occupants(&self, cell: Index) -> &[u32] {
        self.occupants.get(cell).map(|o| o.as_slice()).unwrap_or(&[])
    }

    pub fn occupant_count(&self, cell: Index) -> usize {
        self.occupants(cell).len()
    }

    pub fn reserved_count(&self, cell: Index) -> usize {
        self.reserved.get(cell).copied().unwrap_or(0) as usize
    }

    /// Total occupants across all cells; equals the pedestrian count
    /// whenever a tick is not in progress.
    pub fn total_occupants(&self) -> usize {
        self.occupants.iter().map(|o| o.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_leave_conservation() {
        let mut tracker = OccupancyTracker::new((4, 4));
        tracker.enter(Index::new(1, 1), 0);
        tracker.enter(Index::new(1, 1), 1);
        tracker.enter(Index::new(2, 3), 2);
        assert_eq!(tracker.occupant_count(Index::new(1, 1)), 2);
        assert_eq!(tracker.total_occupants(), 3);

        tracker.leave(Index::new(1, 1), 0);
        tracker.enter(Index::new(2, 1), 0);
        assert_eq!(tracker.occupants(Index::new(1, 1)), &[1]);
        assert_eq!(tracker.occupants(Index::new(2, 1)), &[0]);
        assert_eq!(tracker.total_occupants(), 3);
    }

    #[test]
    fn test_reservations() {
        let mut tracker = OccupancyTracker::new((4, 4));
        let cell = Index::new(3, 0);
        tracker.reserve(cell);
        tracker.reserve(cell);
        assert_eq!(tracker.reserved_count(cell), 2);
        tracker.release(cell);
        assert_eq!(tracker.reserved_count(cell), 1);
        assert_eq!(tracker.reserved_count(Index::new(0, 0)), 0);
    }

    #[test]
    fn test_out_of_bounds_queries_are_empty() {
        let tracker = OccupancyTracker::new((2, 2));
        assert_eq!(tracker.occupant_count(Index::new(-1, 0)), 0);
        assert_eq!(tracker.reserved_count(Index::new(5, 5)), 0);
    }
}
