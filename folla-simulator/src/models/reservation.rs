use super::{CongestionModel, CostContext};
use crate::util::Index;

/// Reservation-based congestion cost: a weighted count of pedestrians
/// occupying, and reservations claimed on, the candidate's 3x3 neighborhood.
/// Occupants weigh more than claims since a claim may still be abandoned.
pub struct ReservationModel {
    pub occupant_weight: f32,
    pub reservation_weight: f32,
}

impl Default for ReservationModel {
    fn default() -> Self {
        ReservationModel {
            occupant_weight: 2.0,
            reservation_weight: 1.0,
        }
    }
}

impl CongestionModel for ReservationModel {
    fn penalty(&self, ctx: &CostContext, candidate: Index) -> f32 {
        let mut cost = 0.0;
        for neighbor in ctx.grid.walkable_neighborhood(candidate) {
            let occupants = ctx
                .occupancy
                .occupants(neighbor)
                .iter()
                .filter(|&&other| other != ctx.ped_id)
                .count();
            cost += self.occupant_weight * occupants as f32;
            cost += self.reservation_weight * ctx.occupancy.reserved_count(neighbor) as f32;
        }
        cost
    }
}
