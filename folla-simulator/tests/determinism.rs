use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use folla_simulator::{
    scenario::{FieldConfig, PedestrianConfig, RegionConfig, Scenario},
    CongestionPolicy, Simulator, SimulatorOptions,
};
use glam::vec2;

#[test]
fn deterministic_replay_produces_identical_histories() {
    let first = replay(150);
    let second = replay(150);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(fingerprint(&first), fingerprint(&second));
}

#[test]
fn replay_never_skips_cells() {
    for history in replay(150) {
        for pair in history.windows(2) {
            let (ax, ay) = cell_of(pair[0]);
            let (bx, by) = cell_of(pair[1]);
            assert!(
                (ax - bx).abs() <= 1 && (ay - by).abs() <= 1,
                "teleport from ({ax}, {ay}) to ({bx}, {by})"
            );
        }
    }
}

/// Run the bottleneck scenario for `ticks` frames and return every
/// pedestrian's recorded history as f32 bit patterns.
fn replay(ticks: usize) -> Vec<Vec<(u32, u32)>> {
    let scenario = Scenario {
        field: FieldConfig {
            size: vec2(12.0, 9.0),
        },
        obstacles: vec![
            RegionConfig {
                min: vec2(4.0, 0.0),
                max: vec2(7.9, 3.9),
            },
            RegionConfig {
                min: vec2(4.0, 5.0),
                max: vec2(7.9, 8.9),
            },
        ],
        targets: vec![RegionConfig {
            min: vec2(11.0, 3.0),
            max: vec2(11.9, 5.9),
        }],
        pedestrians: vec![
            PedestrianConfig::Area {
                min: vec2(0.5, 0.5),
                max: vec2(3.5, 8.5),
                count: 12,
            },
            PedestrianConfig::Fixed {
                position: vec2(1.0, 4.5),
            },
        ],
    };
    let options = SimulatorOptions {
        policy: CongestionPolicy::Reservation,
        spawn_seed: 7,
        ..Default::default()
    };

    let mut simulator = Simulator::new();
    simulator.initialize(scenario, &options).unwrap();
    simulator.start();
    for _ in 0..ticks {
        simulator.tick();
    }

    (0..simulator.pedestrians().len())
        .map(|id| {
            simulator
                .history(id as u32)
                .iter()
                .map(|p| (p.x.to_bits(), p.y.to_bits()))
                .collect()
        })
        .collect()
}

fn fingerprint(histories: &[Vec<(u32, u32)>]) -> u64 {
    let mut hasher = DefaultHasher::new();
    histories.hash(&mut hasher);
    hasher.finish()
}

fn cell_of(bits: (u32, u32)) -> (i32, i32) {
    (
        f32::from_bits(bits.0).floor() as i32,
        f32::from_bits(bits.1).floor() as i32,
    )
}
