//! Construction system - sequential build/recruit queue
//!
//! Only the head of the queue progresses. Building items raise a level when
//! they finish; unit items produce one unit per countdown until their batch
//! is exhausted. Cancellation happens between ticks and refunds the unspent
//! share of the cost.

use crate::city::cost::{build_time, upgrade_cost};
use crate::city::data::GameData;
use crate::city::building::BuildingTag;
use crate::city::settlement::{QueueItem, QueueKind, Settlement, SettlementEvent};
use crate::core::error::Result;
use crate::core::types::{ActionResult, BuildingKind, Cost, Seconds, UnitKind};

/// Remaining time at or below this counts as finished
const COMPLETION_EPSILON: f64 = 1e-9;

/// What happened to the head of the queue this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueueProgress {
    /// Nothing queued
    Idle,
    /// Head still counting down
    InProgress { remaining: Seconds },
    /// Head produced its building level or one unit
    Completed { kind: QueueKind },
}

/// Advance the head of the queue by `elapsed` seconds
///
/// Time left over after a completion is not carried to the next item.
pub fn advance_queue(
    settlement: &mut Settlement,
    elapsed: Seconds,
    data: &GameData,
    housing_multiplier: f64,
    events: &mut Vec<SettlementEvent>,
) -> QueueProgress {
    let Some(head) = settlement.queue.first_mut() else {
        return QueueProgress::Idle;
    };

    head.ticks_remaining -= elapsed.max(0.0);
    if head.ticks_remaining > COMPLETION_EPSILON {
        return QueueProgress::InProgress {
            remaining: head.ticks_remaining,
        };
    }

    let kind = head.kind;
    match kind {
        QueueKind::Building(building) => {
            settlement.queue.remove(0);
            let spec = data.buildings.get(building);
            let max_level = spec.map(|s| s.max_level).unwrap_or(u32::MAX);
            let level = settlement.buildings.entry(building).or_insert(0);
            *level = (*level + 1).min(max_level);
            let level = *level;

            if spec.map(|s| s.tag == BuildingTag::Housing).unwrap_or(false) {
                settlement.recompute_housing(data, housing_multiplier);
            }

            tracing::info!("{}: {:?} reached level {}", settlement.name, building, level);
            events.push(SettlementEvent::ConstructionComplete { building, level });
        }
        QueueKind::Unit(unit) => {
            *settlement.units.entry(unit).or_insert(0) += 1;
            head.count = head.count.saturating_sub(1);
            let remaining_in_batch = head.count;

            if remaining_in_batch > 0 {
                let per_unit = data
                    .units
                    .get(unit)
                    .map(|spec| spec.train_seconds as f64)
                    .unwrap_or(head.total_ticks);
                head.ticks_remaining = per_unit;
                head.total_ticks = per_unit;
            } else {
                settlement.queue.remove(0);
            }

            tracing::debug!(
                "{}: trained {:?}, {} left in batch",
                settlement.name,
                unit,
                remaining_in_batch
            );
            events.push(SettlementEvent::UnitTrained {
                unit,
                remaining_in_batch,
            });
        }
    }

    QueueProgress::Completed { kind }
}

/// Queue an upgrade of `building`, paying its cost up front
///
/// Idempotent: a building already in the queue is reported as success
/// without charging again. Returns `Err` only for missing reference data.
pub fn start_construction(
    settlement: &mut Settlement,
    building: BuildingKind,
    data: &GameData,
) -> Result<ActionResult> {
    if settlement.is_queued(building) {
        return Ok(ActionResult::ok(format!("{:?} is already under construction", building)));
    }

    let level = settlement.level(building);
    let cost = upgrade_cost(data, building, level)?;

    if let Some(spec) = data.buildings.get(building) {
        if level >= spec.max_level {
            return Ok(ActionResult::fail(format!(
                "{:?} is already at maximum level {}",
                building, spec.max_level
            )));
        }
    }

    if !settlement.resources.consume_materials(&cost) {
        let missing = settlement
            .resources
            .shortfall(&cost)
            .into_iter()
            .map(|(res, amount)| format!("{:.0} {:?}", amount.ceil(), res))
            .collect::<Vec<_>>()
            .join(", ");
        return Ok(ActionResult::fail(format!(
            "Not enough resources for {:?}: missing {}",
            building, missing
        )));
    }

    let seconds = build_time(data, building, level);
    settlement
        .queue
        .push(QueueItem::building(building, seconds, cost));

    Ok(ActionResult::ok(format!(
        "{:?} upgrade to level {} queued ({}s)",
        building,
        level + 1,
        seconds
    )))
}

/// Queue a batch of `count` units, paying for all of them up front
pub fn start_recruitment(
    settlement: &mut Settlement,
    unit: UnitKind,
    count: u32,
    data: &GameData,
) -> ActionResult {
    if count == 0 {
        return ActionResult::fail("Recruit count must be positive");
    }
    let Some(spec) = data.units.get(unit) else {
        return ActionResult::fail(format!("{:?} can not be trained", unit));
    };
    if settlement.level(BuildingKind::Barracks) == 0 {
        return ActionResult::fail("A barracks is required to train units");
    }

    let total: Cost = spec
        .cost
        .iter()
        .map(|(res, amount)| (*res, amount.saturating_mul(count)))
        .collect();
    if !settlement.resources.consume_materials(&total) {
        return ActionResult::fail(format!("Not enough resources to train {} {:?}", count, unit));
    }

    settlement
        .queue
        .push(QueueItem::units(unit, count, spec.train_seconds, spec.cost.clone()));
    ActionResult::ok(format!("{} {:?} queued", count, unit))
}

/// Refund for cancelling a queue item in its current state
///
/// Building: floor(cost * (1 - progress)).
/// Unit batch: floor(unit_cost * ((count - 1) + (1 - progress))).
pub fn cancellation_refund(item: &QueueItem) -> Cost {
    let unspent = match item.kind {
        QueueKind::Building(_) => 1.0 - item.progress(),
        QueueKind::Unit(_) => item.count.saturating_sub(1) as f64 + (1.0 - item.progress()),
    };
    item.cost
        .iter()
        .map(|(res, amount)| (*res, (*amount as f64 * unspent).floor() as u32))
        .collect()
}

/// Remove the queue entry at `index` and refund the unspent cost
pub fn cancel_queue_item(settlement: &mut Settlement, index: usize) -> ActionResult {
    if index >= settlement.queue.len() {
        return ActionResult::fail(format!("No queue entry at position {}", index));
    }

    let item = settlement.queue.remove(index);
    let refund = cancellation_refund(&item);
    settlement.resources.refund(&refund);

    tracing::debug!("{}: cancelled {:?}, refunded {:?}", settlement.name, item.kind, refund);
    ActionResult::ok(format!("Cancelled {:?}", item.kind))
}
