use std::path::PathBuf;

use folla_simulator::{CongestionPolicy, SimulatorOptions};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Policy {
    SocialDistance,
    OccupancyBlock,
    Reservation,
}

#[derive(Debug, clap::Parser)]
pub struct Args {
    /// Path to scenario file
    #[arg(default_value = "scenarios/default.toml")]
    pub scenario: PathBuf,
    /// Stop after this many frames
    #[arg(short = 'n', long)]
    pub frames: Option<usize>,
    /// Congestion-cost policy
    #[arg(value_enum, short, long, default_value_t = Policy::SocialDistance)]
    pub policy: Policy,
    /// Max playback speed
    #[arg(short, long, default_value_t = 100.0)]
    pub speed: f32,

    /// Unit length of field grid cells
    #[arg(long)]
    pub grid_unit: Option<f32>,
    /// Per-tick step length
    #[arg(long)]
    pub step_length: Option<f32>,
    /// Anti-oscillation history depth (2 or 3)
    #[arg(long)]
    pub history_depth: Option<usize>,
    /// Seed for pedestrian placement
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    pub fn to_simulator_options(&self) -> SimulatorOptions {
        let mut options = SimulatorOptions {
            policy: match self.policy {
                Policy::SocialDistance => CongestionPolicy::SocialDistance,
                Policy::OccupancyBlock => CongestionPolicy::OccupancyBlock,
                Policy::Reservation => CongestionPolicy::Reservation,
            },
            ..Default::default()
        };

        if let Some(grid_unit) = self.grid_unit {
            options.grid_unit = grid_unit;
        }
        if let Some(step_length) = self.step_length {
            options.step_length = step_length;
        }
        if let Some(history_depth) = self.history_depth {
            options.history_depth = history_depth;
        }
        if let Some(seed) = self.seed {
            options.spawn_seed = seed;
        }

        options
    }
}
