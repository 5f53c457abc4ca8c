//! Upgrade cost scaling
//!
//! Cost and build time compound by the building's growth factor per level.
//! Advanced buildings (growth 1.4 or 1.6) also cost iron from level 10 on.

use crate::city::data::GameData;
use crate::core::error::{Result, SettlementError};
use crate::core::types::{BuildingKind, Cost, ResourceKind};

/// Stone derived per timber when a base cost names only one of them
const STONE_PER_TIMBER: f64 = 0.5;

/// Resource charged to advanced buildings at high levels
pub const BOTTLENECK_RESOURCE: ResourceKind = ResourceKind::Iron;

const BOTTLENECK_START_LEVEL: u32 = 10;
const BOTTLENECK_GROWTH: f64 = 1.6;
const BOTTLENECK_BASE: f64 = 10.0;
const ADVANCED_GROWTH_FACTORS: [f64; 2] = [1.6, 1.4];

/// Build time used when a building has no spec
pub const FALLBACK_BUILD_SECONDS: u32 = 60;

fn is_advanced(growth_factor: f64) -> bool {
    ADVANCED_GROWTH_FACTORS
        .iter()
        .any(|g| (g - growth_factor).abs() < 1e-9)
}

/// Cost of upgrading `building` from `current_level` to the next level
///
/// A missing spec is a data defect and is reported as a configuration error.
pub fn upgrade_cost(data: &GameData, building: BuildingKind, current_level: u32) -> Result<Cost> {
    let spec = data.buildings.get(building).ok_or_else(|| {
        SettlementError::Configuration(format!("no building spec for {:?}", building))
    })?;

    let mut base: Vec<(ResourceKind, f64)> = spec
        .base_cost
        .iter()
        .map(|(res, amount)| (*res, *amount as f64))
        .collect();

    // Timber and stone always scale together
    let timber = spec.base_cost.get(&ResourceKind::Timber).copied();
    let stone = spec.base_cost.get(&ResourceKind::Stone).copied();
    match (timber, stone) {
        (Some(t), None) => base.push((ResourceKind::Stone, t as f64 * STONE_PER_TIMBER)),
        (None, Some(s)) => base.push((ResourceKind::Timber, s as f64 / STONE_PER_TIMBER)),
        _ => {}
    }

    let scale = spec.growth_factor.powi(current_level as i32);
    let mut cost: Cost = base
        .into_iter()
        .map(|(res, amount)| (res, (amount * scale).floor() as u32))
        .collect();

    if is_advanced(spec.growth_factor) && current_level >= BOTTLENECK_START_LEVEL {
        let extra = (BOTTLENECK_BASE
            * BOTTLENECK_GROWTH.powi((current_level - (BOTTLENECK_START_LEVEL - 1)) as i32))
        .floor() as u32;
        *cost.entry(BOTTLENECK_RESOURCE).or_insert(0) += extra;
    }

    Ok(cost)
}

/// Seconds needed to upgrade `building` from `current_level`
///
/// Never fails: a missing spec falls back to 60 seconds so a queue can not
/// stall on old data.
pub fn build_time(data: &GameData, building: BuildingKind, current_level: u32) -> u32 {
    match data.buildings.get(building) {
        Some(spec) => {
            let seconds = spec.base_seconds as f64 * spec.growth_factor.powi(current_level as i32);
            seconds.floor() as u32
        }
        None => {
            tracing::warn!(
                "No building spec for {:?}, using {}s build time",
                building,
                FALLBACK_BUILD_SECONDS
            );
            FALLBACK_BUILD_SECONDS
        }
    }
}
