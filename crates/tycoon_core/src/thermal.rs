//! Rig temperature model.
//!
//! Temperature approaches a target set by heat generation versus cooling with
//! first-order smoothing, so it never snaps to the target in one tick.

use crate::Stats;

pub const AMBIENT_TEMP: f64 = 30.0;
/// Degrees added per unit of the heat/cooling ratio.
pub const HEAT_RATIO_SCALE: f64 = 50.0;
/// Passive cooling every rig has even with no cooler equipped.
pub const PASSIVE_COOLING: f64 = 5.0;
pub const SMOOTHING_FACTOR: f64 = 0.1;
pub const OVERHEAT_THRESHOLD: f64 = 90.0;
/// Code-generation efficiency while overheating.
pub const THROTTLED_EFFICIENCY: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalStep {
    pub temperature: f64,
    pub is_overheating: bool,
    pub efficiency: f64,
}

#[inline]
pub fn target_temperature(stats: &Stats) -> f64 {
    AMBIENT_TEMP + (stats.heat_gen / (stats.cooling + PASSIVE_COOLING)) * HEAT_RATIO_SCALE
}

#[inline]
pub fn efficiency(is_overheating: bool) -> f64 {
    if is_overheating {
        THROTTLED_EFFICIENCY
    } else {
        1.0
    }
}

/// One smoothing step from `temperature` toward the target for `stats`.
pub fn step(temperature: f64, stats: &Stats) -> ThermalStep {
    let target = target_temperature(stats);
    let temperature = temperature + (target - temperature) * SMOOTHING_FACTOR;
    let is_overheating = temperature > OVERHEAT_THRESHOLD;
    ThermalStep {
        temperature,
        is_overheating,
        efficiency: efficiency(is_overheating),
    }
}
