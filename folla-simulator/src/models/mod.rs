mod hard_block;
mod reservation;
mod social;

use glam::Vec2;

use super::{grid::SpatialGrid, occupancy::OccupancyTracker, util::Index};

pub use self::{
    hard_block::OccupancyBlockModel, reservation::ReservationModel, social::SocialDistanceModel,
};

/// Congestion-cost policy, chosen explicitly at initialization.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CongestionPolicy {
    /// Soft exponential social-distance penalty.
    #[default]
    SocialDistance,
    /// Occupied cells are never selected.
    OccupancyBlock,
    /// Weighted count of occupied and reserved cells nearby.
    Reservation,
}

/// Read-only view handed to a congestion model while scoring one candidate
/// cell for one pedestrian.
pub struct CostContext<'a> {
    pub grid: &'a SpatialGrid,
    pub occupancy: &'a OccupancyTracker,
    pub pedestrians: &'a [Pedestrian],
    pub ped_id: u32,
    pub step_length: f32,
}

impl CostContext<'_> {
    pub fn ped_position(&self) -> Vec2 {
        self.pedestrians[self.ped_id as usize].position
    }
}

/// Dynamic penalty added to the static field value of a candidate cell.
/// Returning infinity vetoes the candidate.
pub trait CongestionModel: Send + Sync {
    fn penalty(&self, ctx: &CostContext, candidate: Index) -> f32;
}

/// Pedestrian instance
#[derive(Debug, Clone)]
pub struct Pedestrian {
    pub id: u32,
    /// Cleared once the pedestrian reaches a target; inactive pedestrians
    /// stand outside the occupancy grid and no longer move.
    pub active: bool,
    pub position: Vec2,
    pub cell: Index,
    /// Cell left most recently; excluded from candidate selection.
    pub previous_cell: Option<Index>,
    pub previous_previous_cell: Option<Index>,
    /// Cell claimed as this tick's destination, released next tick.
    pub reserved_target: Option<Index>,
    /// Pedestrian currently governing the speed adaptation.
    pub nearest: Option<u32>,
    /// Per-tick step cap in world units.
    pub step_length: f32,
}

impl Pedestrian {
    pub fn new(id: u32, position: Vec2, cell: Index, step_length: f32) -> Self {
        Pedestrian {
            id,
            active: true,
            position,
            cell,
            previous_cell: None,
            previous_previous_cell: None,
            reserved_target: None,
            nearest: None,
            step_length,
        }
    }

    /// Forget all per-run motion state, keeping id and step length.
    pub fn reset(&mut self, position: Vec2, cell: Index) {
        self.active = true;
        self.position = position;
        self.cell = cell;
        self.previous_cell = None;
        self.previous_previous_cell = None;
        self.reserved_target = None;
        self.nearest = None;
    }
}
