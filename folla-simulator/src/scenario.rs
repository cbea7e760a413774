use glam::Vec2;
use serde::Deserialize;

/// Scenario data: static geometry plus initial pedestrian placement, as
/// supplied by the scene/configuration layer.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Scenario {
    pub field: FieldConfig,
    #[serde(default)]
    pub obstacles: Vec<RegionConfig>,
    #[serde(default)]
    pub targets: Vec<RegionConfig>,
    #[serde(default)]
    pub pedestrians: Vec<PedestrianConfig>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FieldConfig {
    pub size: Vec2,
}

/// Axis-aligned world-space box, the extent of one static obstacle or
/// target.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RegionConfig {
    pub min: Vec2,
    pub max: Vec2,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PedestrianConfig {
    /// One pedestrian at an exact position.
    Fixed { position: Vec2 },
    /// `count` pedestrians placed uniformly inside a box.
    Area { min: Vec2, max: Vec2, count: u32 },
}
