//! Worker assignment - idle villagers to buildings
//!
//! Villagers are a shared pool. Auto-assignment fills flagged buildings in
//! canonical building order; when the pool shrinks, workers are released
//! from the end of that order first.

use crate::city::data::GameData;
use crate::city::settlement::Settlement;
use crate::core::types::{ActionResult, BuildingKind};

/// Workforce cap for a building at its current level (0 if not staffable)
pub fn max_workforce(settlement: &Settlement, data: &GameData, building: BuildingKind) -> u32 {
    data.buildings
        .get(building)
        .filter(|spec| spec.is_staffable())
        .map(|spec| spec.max_workforce(settlement.level(building)))
        .unwrap_or(0)
}

/// Place idle villagers into auto-assign buildings
///
/// Returns the buildings that received workers and how many.
pub fn auto_assign_workers(
    settlement: &mut Settlement,
    data: &GameData,
) -> Vec<(BuildingKind, u32)> {
    let mut idle = settlement.idle_villagers();
    let mut placed = Vec::new();

    for building in BuildingKind::ALL {
        if idle == 0 {
            break;
        }
        if !settlement.auto_assign_enabled(building) || settlement.level(building) == 0 {
            continue;
        }

        let open = max_workforce(settlement, data, building)
            .saturating_sub(settlement.assigned(building));
        let fill = idle.min(open);
        if fill == 0 {
            continue;
        }

        *settlement.assignments.entry(building).or_insert(0) += fill;
        idle -= fill;
        placed.push((building, fill));
    }

    placed
}

/// Drop assignments until they fit the villager count
///
/// Returns the buildings that lost workers and how many.
pub fn release_excess_workers(settlement: &mut Settlement) -> Vec<(BuildingKind, u32)> {
    let mut excess = settlement.total_assigned().saturating_sub(settlement.villagers());
    let mut released = Vec::new();

    for building in BuildingKind::ALL.iter().rev() {
        if excess == 0 {
            break;
        }
        let current = settlement.assigned(*building);
        let take = current.min(excess);
        if take == 0 {
            continue;
        }
        settlement.assignments.insert(*building, current - take);
        excess -= take;
        released.push((*building, take));
    }

    settlement.assignments.retain(|_, workers| *workers > 0);
    released
}

/// Set the worker count of a building directly
pub fn assign_workers(
    settlement: &mut Settlement,
    building: BuildingKind,
    count: u32,
    data: &GameData,
) -> ActionResult {
    if settlement.level(building) == 0 {
        return ActionResult::fail(format!("{:?} has not been built", building));
    }

    let cap = max_workforce(settlement, data, building);
    if cap == 0 {
        return ActionResult::fail(format!("{:?} does not employ workers", building));
    }
    if count > cap {
        return ActionResult::fail(format!("{:?} can employ at most {} workers", building, cap));
    }

    let available = settlement.idle_villagers() + settlement.assigned(building);
    if count > available {
        return ActionResult::fail(format!(
            "Only {} villagers available for {:?}",
            available, building
        ));
    }

    if count == 0 {
        settlement.assignments.remove(&building);
    } else {
        settlement.assignments.insert(building, count);
    }
    ActionResult::ok(format!("{:?} now has {} workers", building, count))
}

/// Toggle auto-assignment for a building
pub fn set_auto_assign(
    settlement: &mut Settlement,
    building: BuildingKind,
    enabled: bool,
) -> ActionResult {
    settlement.auto_assign.insert(building, enabled);
    ActionResult::ok(format!(
        "Auto-assign {} for {:?}",
        if enabled { "enabled" } else { "disabled" },
        building
    ))
}
