mod args;

use std::{
    fs::{self, File},
    path::PathBuf,
    sync::{atomic::AtomicBool, Mutex},
    thread,
    time::{Duration, Instant},
};

use args::Args;
use clap::Parser;
use folla_simulator::{diagnostic::DiagnosticLog, scenario::Scenario, Pedestrian, Simulator};
use log::{info, warn};
use once_cell::sync::Lazy;

static SIMULATOR_STATE: Lazy<Mutex<SimulatorState>> =
    Lazy::new(|| Mutex::new(SimulatorState::default()));
static CONTROL_STATE: Mutex<ControlState> = Mutex::new(ControlState {
    paused: true,
    playback_speed: 4.0,
});
static SIG_INT: AtomicBool = AtomicBool::new(false);

pub const DELTA_TIME: f32 = 0.1;

#[derive(Default)]
pub struct SimulatorState {
    pub pedestrians: Vec<Pedestrian>,
    pub diagnostic_log: DiagnosticLog,
    pub finished: bool,
}

#[derive(Clone)]
pub struct ControlState {
    pub paused: bool,
    pub playback_speed: f32,
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_module("folla", log::LevelFilter::Info)
        .init();

    if cfg!(debug_assertions) {
        warn!("Debug build");
    }

    let args = Args::parse();
    CONTROL_STATE.lock().unwrap().playback_speed = args.speed;

    let scenario: Scenario = toml::from_str(&fs::read_to_string(&args.scenario)?)?;

    let mut simulator = Simulator::new();
    simulator.initialize(scenario, &args.to_simulator_options())?;
    simulator.diagnostic_log.scenario = args.scenario.display().to_string();
    simulator.start();

    let max_frames = args.frames;
    thread::spawn(move || loop {
        let start = Instant::now();
        let state = CONTROL_STATE.lock().unwrap().clone();

        if !state.paused {
            let step_metrics = simulator.tick();
            if simulator.current_frame() % 100 == 0 {
                info!(
                    "Frame: {:6}, Active pedestrians: {:6}",
                    simulator.current_frame(),
                    step_metrics.active_ped_count
                );
            }

            let mut shared = SIMULATOR_STATE.lock().unwrap();
            shared.pedestrians = simulator.pedestrians().to_vec();
            shared.diagnostic_log = simulator.diagnostic_log.clone();

            let exhausted =
                max_frames.is_some_and(|limit| simulator.recorded_frame_count() >= limit);
            if exhausted || simulator.active_pedestrian_count() == 0 {
                info!(
                    "Simulation finished after {} frames",
                    simulator.recorded_frame_count()
                );
                simulator.stop();
                shared.finished = true;
                break;
            }
        }

        let step_time = Instant::now() - start;
        let min_interval = Duration::from_secs_f32(DELTA_TIME / state.playback_speed);
        if step_time < min_interval {
            thread::sleep(min_interval - step_time);
        }
    });

    info!("Run as headless mode");
    ctrlc::set_handler(|| SIG_INT.store(true, std::sync::atomic::Ordering::SeqCst))?;

    CONTROL_STATE.lock().unwrap().paused = false;

    loop {
        let finished = SIMULATOR_STATE.lock().unwrap().finished;
        if SIG_INT.load(std::sync::atomic::Ordering::SeqCst) || finished {
            let current_time = chrono::Local::now();
            fs::create_dir("logs").ok();
            let log_path: PathBuf = [
                "logs",
                &current_time.format("%Y-%m-%d_%H%M%S_log.json").to_string(),
            ]
            .iter()
            .collect();
            let mut log_file = File::create(&log_path)?;
            let state = SIMULATOR_STATE.lock().unwrap();

            serde_json::to_writer(&mut log_file, &state.diagnostic_log)?;
            info!("Exported log file: {}", log_path.display());

            break;
        }

        thread::sleep(Duration::from_millis(100));
    }

    Ok(())
}
