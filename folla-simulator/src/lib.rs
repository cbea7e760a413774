pub mod diagnostic;
pub mod field;
pub mod grid;
mod models;
pub mod occupancy;
pub mod playback;
pub mod scenario;
mod stepper;
pub mod util;

use std::time::Instant;

use anyhow::{bail, ensure, Result};
use fastrand_contrib::RngExt;
use glam::{vec2, Vec2};
use log::info;

use diagnostic::{DiagnosticLog, PreprocessMetrics, StepMetrics};
use field::DistanceField;
use grid::{CellState, SpatialGrid};
use occupancy::OccupancyTracker;
use playback::PlaybackRecorder;
use scenario::{PedestrianConfig, Scenario};
use stepper::CrowdStepper;

pub use models::{
    CongestionModel, CongestionPolicy, CostContext, OccupancyBlockModel, Pedestrian,
    ReservationModel, SocialDistanceModel,
};

/// Simulator instance.
///
/// Owns the whole session: the static grid and distance field, the mutable
/// occupancy and pedestrian state, and the recorded playback history. The
/// driving loop lives outside; it calls [`Simulator::tick`].
pub struct Simulator {
    pub scenario: Scenario,
    pub grid: SpatialGrid,
    pub field: DistanceField,
    pub diagnostic_log: DiagnosticLog,
    occupancy: OccupancyTracker,
    pedestrians: Vec<Pedestrian>,
    model: Box<dyn CongestionModel>,
    stepper: CrowdStepper,
    recorder: PlaybackRecorder,
    current_frame: usize,
    recorded_frames: usize,
    simulating: bool,
}

impl Simulator {
    pub fn new() -> Self {
        Simulator {
            scenario: Scenario::default(),
            grid: SpatialGrid::default(),
            field: DistanceField::default(),
            diagnostic_log: DiagnosticLog::default(),
            occupancy: OccupancyTracker::new((0, 0)),
            pedestrians: Vec::new(),
            model: Box::new(SocialDistanceModel),
            stepper: CrowdStepper::default(),
            recorder: PlaybackRecorder::default(),
            current_frame: 0,
            recorded_frames: 0,
            simulating: false,
        }
    }

    /// Build the session from scenario geometry. Fails fast on a scenario
    /// the simulation could not run: degenerate field size, no target
    /// cells, or a pedestrian placed outside the grid.
    pub fn initialize(&mut self, scenario: Scenario, options: &SimulatorOptions) -> Result<()> {
        ensure!(
            scenario.field.size.x > 0.0 && scenario.field.size.y > 0.0,
            "field size must be positive, got {}",
            scenario.field.size
        );
        ensure!(options.grid_unit > 0.0, "grid unit must be positive");
        ensure!(options.step_length > 0.0, "step length must be positive");

        let instant = Instant::now();
        let mut grid = SpatialGrid::new(scenario.field.size, options.grid_unit);
        for region in &scenario.obstacles {
            grid.mark_region(region.min, region.max, CellState::Obstacle);
        }
        for region in &scenario.targets {
            grid.mark_region(region.min, region.max, CellState::Target);
        }
        ensure!(
            grid.count_cells(CellState::Target) > 0,
            "scenario contains no target cells"
        );
        let time_build_grid = instant.elapsed().as_secs_f64();

        let instant = Instant::now();
        let field = DistanceField::from_grid(&grid);
        let time_calc_field = instant.elapsed().as_secs_f64();
        info!("Distance field calculated in {time_calc_field:.4} s");

        let mut rng = fastrand::Rng::with_seed(options.spawn_seed);
        let mut positions = Vec::new();
        for config in &scenario.pedestrians {
            match *config {
                PedestrianConfig::Fixed { position } => positions.push(position),
                PedestrianConfig::Area { min, max, count } => {
                    for _ in 0..count {
                        positions.push(min + (max - min) * vec2(rng.f32(), rng.f32()));
                    }
                }
            }
        }

        let mut occupancy = OccupancyTracker::new(grid.shape);
        let mut recorder = PlaybackRecorder::default();
        recorder.reset(positions.len());

        let mut pedestrians = Vec::with_capacity(positions.len());
        for (id, &position) in positions.iter().enumerate() {
            let id = id as u32;
            let cell = grid.world_to_cell(position);
            if !grid.contains(cell) {
                bail!("pedestrian {id} placed outside the field at {position}");
            }

            let step_length = rng
                .f32_normal_approx(options.step_length, options.step_length * 0.1)
                .clamp(options.step_length * 0.5, options.step_length * 1.5);

            occupancy.enter(cell, id);
            recorder.record(id, position);
            pedestrians.push(Pedestrian::new(id, position, cell, step_length));
        }

        let model: Box<dyn CongestionModel> = match options.policy {
            CongestionPolicy::SocialDistance => Box::new(SocialDistanceModel),
            CongestionPolicy::OccupancyBlock => Box::new(OccupancyBlockModel),
            CongestionPolicy::Reservation => Box::new(ReservationModel::default()),
        };

        self.diagnostic_log = DiagnosticLog {
            model: format!("{:?}", options.policy),
            preprocess_metrics: PreprocessMetrics {
                time_build_grid,
                time_calc_field,
            },
            ..Default::default()
        };
        self.scenario = scenario;
        self.grid = grid;
        self.field = field;
        self.occupancy = occupancy;
        self.pedestrians = pedestrians;
        self.model = model;
        self.stepper = CrowdStepper {
            history_depth: options.history_depth,
            ..Default::default()
        };
        self.recorder = recorder;
        self.current_frame = 0;
        self.recorded_frames = 0;
        self.simulating = false;

        info!("Simulator initialization finished");
        info!("Simulator options: {options:#?}");
        Ok(())
    }

    /// Begin simulating. A fresh session just starts; once frames have been
    /// recorded, every pedestrian returns to its first recorded position,
    /// occupancy is rebuilt from scratch and the recording starts over.
    pub fn start(&mut self) {
        if self.recorded_frames > 0 {
            self.occupancy.clear();
            for ped in &mut self.pedestrians {
                let position = self.recorder.position_at(ped.id, 0).unwrap_or(ped.position);
                let cell = self.grid.world_to_cell(position);
                ped.reset(position, cell);
                self.occupancy.enter(cell, ped.id);
            }

            self.recorder.reset(self.pedestrians.len());
            for ped in &self.pedestrians {
                self.recorder.record(ped.id, ped.position);
            }

            self.current_frame = 0;
            self.recorded_frames = 0;
        }
        self.simulating = true;
    }

    pub fn stop(&mut self) {
        self.simulating = false;
    }

    /// Replay a recorded frame: set every pedestrian's displayed position
    /// from its history, clamped to the recorded range. Purely a read of
    /// the recording; simulation state is untouched.
    pub fn seek(&mut self, frame: usize) {
        self.current_frame = frame.min(self.recorded_frames);
        for ped in &mut self.pedestrians {
            if let Some(position) = self.recorder.position_at(ped.id, self.current_frame) {
                ped.position = position;
            }
        }
    }

    /// Advance one frame. Does nothing while stopped.
    pub fn tick(&mut self) -> StepMetrics {
        if !self.simulating {
            return StepMetrics::default();
        }

        let instant = Instant::now();
        self.current_frame += 1;
        self.recorded_frames += 1;

        self.stepper.step(
            &self.grid,
            &self.field,
            &mut self.occupancy,
            self.model.as_ref(),
            &mut self.pedestrians,
            &mut self.recorder,
        );

        let active = self.active_pedestrian_count();
        let metrics = StepMetrics {
            active_ped_count: active as i32,
            arrived_ped_count: (self.pedestrians.len() - active) as i32,
            time_step: instant.elapsed().as_secs_f64(),
        };
        self.diagnostic_log.push(metrics.clone());
        metrics
    }

    pub fn is_simulating(&self) -> bool {
        self.simulating
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn recorded_frame_count(&self) -> usize {
        self.recorded_frames
    }

    pub fn pedestrians(&self) -> &[Pedestrian] {
        &self.pedestrians
    }

    pub fn pedestrian_positions(&self) -> Vec<Vec2> {
        self.pedestrians.iter().map(|p| p.position).collect()
    }

    pub fn active_pedestrian_count(&self) -> usize {
        self.pedestrians.iter().filter(|p| p.active).count()
    }

    /// Recorded position history of one pedestrian, one sample per frame
    /// plus the initial placement.
    pub fn history(&self, id: u32) -> &[Vec2] {
        self.recorder.history(id)
    }
}

/// Simulator options.
#[derive(Debug, Clone)]
pub struct SimulatorOptions {
    /// Congestion-cost policy applied during candidate selection.
    pub policy: CongestionPolicy,
    /// Unit length of the field grid cells. (meters)
    pub grid_unit: f32,
    /// Per-tick step cap. (meters)
    pub step_length: f32,
    /// Trailing cells excluded from candidate selection (2 or 3).
    pub history_depth: usize,
    /// Seed for pedestrian placement and step-length variation.
    pub spawn_seed: u64,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        SimulatorOptions {
            policy: CongestionPolicy::SocialDistance,
            grid_unit: 1.0,
            step_length: 0.1,
            history_depth: 3,
            spawn_seed: 0,
        }
    }
}
