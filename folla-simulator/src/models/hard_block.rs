use super::{CongestionModel, CostContext};
use crate::util::Index;

/// Hard congestion rule: a cell holding any other pedestrian is vetoed.
pub struct OccupancyBlockModel;

impl CongestionModel for OccupancyBlockModel {
    fn penalty(&self, ctx: &CostContext, candidate: Index) -> f32 {
        let blocked = ctx
            .occupancy
            .occupants(candidate)
            .iter()
            .any(|&other| other != ctx.ped_id);

        if blocked {
            f32::INFINITY
        } else {
            0.0
        }
    }
}
