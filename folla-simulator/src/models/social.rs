use super::{CongestionModel, CostContext};
use crate::util::Index;

/// Weight of the repulsion felt from one nearby pedestrian at distance zero.
const REPULSION_WEIGHT: f32 = 5.0;

/// Soft social-distance cost: project the pedestrian one step toward the
/// candidate's center, then accumulate an exponentially decaying repulsion
/// from every other pedestrian occupying the candidate's 3x3 neighborhood.
pub struct SocialDistanceModel;

impl CongestionModel for SocialDistanceModel {
    fn penalty(&self, ctx: &CostContext, candidate: Index) -> f32 {
        let pos = ctx.ped_position();
        let heading = (ctx.grid.cell_to_world(candidate) - pos).normalize_or_zero();
        let projected = pos + heading * ctx.step_length;

        let mut cost = 0.0;
        for neighbor in ctx.grid.walkable_neighborhood(candidate) {
            for &other in ctx.occupancy.occupants(neighbor) {
                if other == ctx.ped_id {
                    continue;
                }
                let distance = ctx.pedestrians[other as usize].position.distance(projected);
                cost += REPULSION_WEIGHT * (-distance).exp();
            }
        }

        cost
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use glam::vec2;

    use crate::{
        grid::SpatialGrid, models::Pedestrian, occupancy::OccupancyTracker, util::Index,
    };

    use super::*;

    #[test]
    fn test_crowded_candidate_costs_more() {
        let grid = SpatialGrid::new(vec2(5.0, 5.0), 1.0);
        let mut occupancy = OccupancyTracker::new(grid.shape);

        let walker = Pedestrian::new(0, vec2(1.5, 1.5), Index::new(1, 1), 0.1);
        let other = Pedestrian::new(1, vec2(2.5, 1.5), Index::new(2, 1), 0.1);
        occupancy.enter(walker.cell, 0);
        occupancy.enter(other.cell, 1);

        let pedestrians = vec![walker, other];
        let ctx = CostContext {
            grid: &grid,
            occupancy: &occupancy,
            pedestrians: &pedestrians,
            ped_id: 0,
            step_length: 0.1,
        };

        let model = SocialDistanceModel;
        let toward = model.penalty(&ctx, Index::new(2, 1));
        let skirting = model.penalty(&ctx, Index::new(1, 0));
        let away = model.penalty(&ctx, Index::new(0, 1));
        // heading straight at the other pedestrian costs the most, skirting
        // past costs less, and stepping out of their neighborhood is free
        assert!(toward > skirting);
        assert!(skirting > 0.0);
        assert_float_absolute_eq!(away, 0.0);
    }

    #[test]
    fn test_lone_pedestrian_pays_nothing() {
        let grid = SpatialGrid::new(vec2(4.0, 4.0), 1.0);
        let mut occupancy = OccupancyTracker::new(grid.shape);
        let walker = Pedestrian::new(0, vec2(0.5, 0.5), Index::new(0, 0), 0.1);
        occupancy.enter(walker.cell, 0);

        let pedestrians = vec![walker];
        let ctx = CostContext {
            grid: &grid,
            occupancy: &occupancy,
            pedestrians: &pedestrians,
            ped_id: 0,
            step_length: 0.1,
        };

        assert_float_absolute_eq!(SocialDistanceModel.penalty(&ctx, Index::new(1, 1)), 0.0);
    }
}
