use std::fmt::Debug;

use serde::Serialize;

#[derive(Debug, Default, Clone, Serialize)]
pub struct DiagnosticLog {
    pub model: String,
    pub scenario: String,
    pub total_steps: usize,
    pub preprocess_metrics: PreprocessMetrics,
    pub step_metrics: StepMetricsCollection,
}

impl DiagnosticLog {
    pub fn push(&mut self, step_metrics: StepMetrics) {
        self.step_metrics.push(step_metrics);
        self.total_steps += 1;
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct StepMetricsCollection {
    pub active_ped_count: Vec<i32>,
    pub arrived_ped_count: Vec<i32>,
    pub time_step: Vec<f64>,
}

impl StepMetricsCollection {
    pub fn push(&mut self, metrics: StepMetrics) {
        self.active_ped_count.push(metrics.active_ped_count);
        self.arrived_ped_count.push(metrics.arrived_ped_count);
        self.time_step.push(metrics.time_step);
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct PreprocessMetrics {
    pub time_build_grid: f64,
    pub time_calc_field: f64,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct StepMetrics {
    pub active_ped_count: i32,
    pub arrived_ped_count: i32,
    pub time_step: f64,
}
