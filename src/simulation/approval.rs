//! Approval - how content the citizens are
//!
//! Approval drifts toward a target set by taxes, rations, hunger and
//! crowding, moving at most `approval_step` points per tick.

use crate::city::settlement::Settlement;
use crate::core::config::SimulationConfig;
use crate::core::types::ActionResult;

/// Where approval is heading given the current policies
pub fn approval_target(settlement: &Settlement, starving: bool, config: &SimulationConfig) -> u8 {
    let mut target = config.approval_base - settlement.tax_rate as i32 / 2
        + config.ration_approval[settlement.ration_level.min(3) as usize];

    if starving {
        target -= config.starvation_approval_penalty;
    }
    if settlement.housing_capacity > 0 && settlement.population >= settlement.housing_capacity {
        target -= config.crowding_approval_penalty;
    }

    target.clamp(0, 100) as u8
}

/// Move approval one step toward its target and return the new value
pub fn recompute_approval(
    settlement: &mut Settlement,
    starving: bool,
    config: &SimulationConfig,
) -> u8 {
    let target = approval_target(settlement, starving, config) as i32;
    let current = settlement.approval.min(100) as i32;
    let step = config.approval_step as i32;

    let next = current + (target - current).clamp(-step, step);
    settlement.approval = next.clamp(0, 100) as u8;
    settlement.approval
}

pub fn set_tax_rate(settlement: &mut Settlement, rate: u32) -> ActionResult {
    if rate > 100 {
        return ActionResult::fail(format!("Tax rate {} is outside 0-100", rate));
    }
    settlement.tax_rate = rate as u8;
    ActionResult::ok(format!("Tax rate set to {}%", rate))
}

/// Ration levels: 0 none, 1 half, 2 normal, 3 double
pub fn set_ration_level(settlement: &mut Settlement, level: u8) -> ActionResult {
    if level > 3 {
        return ActionResult::fail(format!("Ration level {} is outside 0-3", level));
    }
    settlement.ration_level = level;
    ActionResult::ok(format!("Ration level set to {}", level))
}
