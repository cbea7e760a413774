use std::f32::consts::FRAC_1_SQRT_2;

use glam::Vec2;

use super::{
    field::DistanceField,
    grid::SpatialGrid,
    models::{CongestionModel, CostContext, Pedestrian},
    occupancy::OccupancyTracker,
    playback::PlaybackRecorder,
    util::Index,
};

/// Counts reported back to the session after one tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepCounts {
    /// Pedestrians that committed a move this tick.
    pub moved: usize,
    /// Pedestrians that reached a target cell this tick.
    pub arrived: usize,
}

/// Per-tick pedestrian update.
///
/// Pedestrians are processed in ascending id order. A pedestrian observes
/// the moves already committed by lower ids within the same tick, so the
/// first claimant wins a contested cell.
pub struct CrowdStepper {
    /// How many trailing cells are excluded from candidate selection:
    /// 3 excludes the previous and the one before it, 2 only the previous.
    pub history_depth: usize,
    /// Field values below this count as "standing on a target".
    pub arrival_epsilon: f32,
}

impl Default for CrowdStepper {
    fn default() -> Self {
        CrowdStepper {
            history_depth: 3,
            arrival_epsilon: 1e-4,
        }
    }
}

enum Action {
    Stay,
    /// The field is (near) zero here: stand down and vacate the grid.
    Arrive,
    Move {
        target: Index,
        position: Vec2,
        nearest: Option<u32>,
    },
}

impl CrowdStepper {
    pub fn step(
        &self,
        grid: &SpatialGrid,
        field: &DistanceField,
        occupancy: &mut OccupancyTracker,
        model: &dyn CongestionModel,
        pedestrians: &mut [Pedestrian],
        recorder: &mut PlaybackRecorder,
    ) -> StepCounts {
        let mut counts = StepCounts::default();

        for i in 0..pedestrians.len() {
            if pedestrians[i].active {
                Self::update_cell_bookkeeping(grid, occupancy, &mut pedestrians[i]);

                match self.decide(grid, field, occupancy, model, pedestrians, i) {
                    Action::Stay => {}
                    Action::Arrive => {
                        let ped = &mut pedestrians[i];
                        ped.active = false;
                        occupancy.leave(ped.cell, ped.id);
                        counts.arrived += 1;
                    }
                    Action::Move {
                        target,
                        position,
                        nearest,
                    } => {
                        occupancy.reserve(target);
                        let ped = &mut pedestrians[i];
                        ped.reserved_target = Some(target);
                        if nearest.is_some() {
                            ped.nearest = nearest;
                        }
                        ped.position = position;
                        counts.moved += 1;
                    }
                }
            }

            recorder.record(i as u32, pedestrians[i].position);
        }

        counts
    }

    /// Sync the occupancy tracker and cell history with the position the
    /// pedestrian reached last tick, and let go of last tick's claim.
    fn update_cell_bookkeeping(
        grid: &SpatialGrid,
        occupancy: &mut OccupancyTracker,
        ped: &mut Pedestrian,
    ) {
        let cell = grid.world_to_cell(ped.position);
        if cell != ped.cell {
            occupancy.leave(ped.cell, ped.id);
            occupancy.enter(cell, ped.id);
            ped.previous_previous_cell = ped.previous_cell;
            ped.previous_cell = Some(ped.cell);
            ped.cell = cell;
        }

        if let Some(target) = ped.reserved_target.take() {
            occupancy.release(target);
        }
    }

    fn decide(
        &self,
        grid: &SpatialGrid,
        field: &DistanceField,
        occupancy: &OccupancyTracker,
        model: &dyn CongestionModel,
        pedestrians: &[Pedestrian],
        i: usize,
    ) -> Action {
        let ped = &pedestrians[i];
        let cell = ped.cell;

        if field.value(cell) < self.arrival_epsilon {
            return Action::Arrive;
        }

        let ctx = CostContext {
            grid,
            occupancy,
            pedestrians,
            ped_id: ped.id,
            step_length: ped.step_length,
        };

        let candidates: Vec<Index> = grid
            .walkable_neighborhood(cell)
            .filter(|&c| c != cell)
            .collect();

        // Candidate passes with progressively relaxed exclusions, so a
        // pedestrian only steps back onto a cell it just left when nothing
        // else is selectable.
        let deep = [ped.previous_cell, ped.previous_previous_cell];
        let shallow = [ped.previous_cell];
        let mut passes: Vec<&[Option<Index>]> = Vec::with_capacity(3);
        if self.history_depth >= 3 {
            passes.push(&deep);
        }
        if self.history_depth >= 2 {
            passes.push(&shallow);
        }
        passes.push(&[]);

        let mut selected: Option<(Index, f32)> = None;
        for pass in passes {
            let mut min_cost = f32::INFINITY;
            for &candidate in &candidates {
                if pass.iter().any(|&excluded| excluded == Some(candidate)) {
                    continue;
                }
                let cost = field.value(candidate) + model.penalty(&ctx, candidate);
                if cost < min_cost {
                    min_cost = cost;
                    selected = Some((candidate, cost));
                }
            }
            if selected.is_some() {
                break;
            }
        }

        let Some((chosen, chosen_cost)) = selected else {
            return Action::Stay;
        };

        // Standing still competes under the same cost formula.
        let stay_cost = field.value(cell) + model.penalty(&ctx, cell);
        if stay_cost <= chosen_cost {
            return Action::Stay;
        }

        let pos = ped.position;
        let mut direction = (grid.cell_to_world(chosen) - pos).normalize_or_zero();

        // A diagonal step gets bent away from occupied cells around the
        // pedestrian, trading the zig-zag for a curve.
        if chosen.x != cell.x && chosen.y != cell.y {
            let mut lateral = Vec2::ZERO;
            for neighbor in grid.walkable_neighborhood(cell) {
                if neighbor == cell || neighbor == chosen {
                    continue;
                }
                let occupied = occupancy
                    .occupants(neighbor)
                    .iter()
                    .any(|&other| other != ped.id);
                if occupied {
                    lateral += (pos - grid.cell_to_world(neighbor)).normalize_or_zero();
                }
            }
            direction = (direction + lateral * FRAC_1_SQRT_2).normalize_or_zero();
        }

        // Slow down for the nearest pedestrian this move approaches. Pairs
        // never slow for each other: if the other already yields to us, we
        // keep going.
        let mut nearest_distance = f32::INFINITY;
        let mut nearest = None;
        for neighbor in grid.walkable_neighborhood(cell) {
            for &other in occupancy.occupants(neighbor) {
                if other == ped.id || pedestrians[other as usize].nearest == Some(ped.id) {
                    continue;
                }
                let other_pos = pedestrians[other as usize].position;
                let before = other_pos.distance(pos);
                let after = other_pos.distance(pos + direction * ped.step_length);
                if after < before && before < nearest_distance {
                    nearest_distance = before;
                    nearest = Some(other);
                }
            }
        }

        let speed = ((nearest_distance - 1.0) / 10.0)
            .min(ped.step_length)
            .max(0.0);

        Action::Move {
            target: chosen,
            position: pos + direction * speed,
            nearest,
        }
    }
}
