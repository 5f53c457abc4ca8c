//! Tick system - orchestrates one settlement update
//!
//! Each tick is a pure CPU transform of one settlement over an elapsed
//! interval. Independent settlements can be advanced in parallel with
//! `tick_all`, which uses rayon.

use rayon::prelude::*;

use crate::city::assignment::{auto_assign_workers, release_excess_workers};
use crate::city::construction::advance_queue;
use crate::city::data::GameData;
use crate::city::production::resolve_production;
use crate::city::settlement::{IdleReason, Settlement, SettlementEvent};
use crate::city::storage::{allocate, capacities};
use crate::core::config::SimulationConfig;
use crate::core::types::{BuildingKind, ResourceKind, Seconds, UnitKind};
use crate::simulation::approval::recompute_approval;
use crate::simulation::context::TickContext;
use crate::simulation::missions::advance_missions;
use crate::simulation::population::{tick_population, PopulationInput, PopulationOutcome};

/// Run a single settlement tick
///
/// Order of systems:
/// 1. Migrate legacy queue fields, rescan housing capacity
/// 2. Resolve production for every producer
/// 3. Allocate the deltas under storage capacity
/// 4. Population (food, starvation, growth), sync villagers, release
///    excess workers, recompute approval
/// 5. Advance the construction queue, resolve arriving missions
/// 6. Auto-assign idle villagers, normalize resources
///
/// Returns the events of this tick for logs and UI.
pub fn tick(
    settlement: &mut Settlement,
    elapsed: Seconds,
    ctx: &TickContext<'_>,
    data: &GameData,
    config: &SimulationConfig,
) -> Vec<SettlementEvent> {
    let mut events = Vec::new();
    let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };

    settlement.migrate_legacy_fields();
    settlement.idle_reasons.clear();
    settlement.recompute_housing(data, ctx.research.housing_multiplier);

    run_production(settlement, elapsed, ctx, data, config, &mut events);

    let outcome = run_population(settlement, elapsed, ctx, config, &mut events);
    sync_villagers(settlement);
    for (building, workers) in release_excess_workers(settlement) {
        events.push(SettlementEvent::WorkersReleased { building, workers });
    }
    recompute_approval(settlement, !outcome.fed, config);

    advance_queue(
        settlement,
        elapsed,
        data,
        ctx.research.housing_multiplier,
        &mut events,
    );
    advance_missions(settlement, elapsed, ctx, data, config, &mut events);

    for (building, workers) in auto_assign_workers(settlement, data) {
        events.push(SettlementEvent::WorkersAutoAssigned { building, workers });
    }

    settlement.resources.normalize();
    settlement.last_tick_seconds = elapsed;
    settlement.tick_count += 1;

    events
}

/// Tick many independent settlements in parallel
///
/// Returns each settlement's events in input order.
pub fn tick_all(
    settlements: &mut [Settlement],
    elapsed: Seconds,
    ctx: &TickContext<'_>,
    data: &GameData,
    config: &SimulationConfig,
) -> Vec<Vec<SettlementEvent>> {
    settlements
        .par_iter_mut()
        .map(|settlement| tick(settlement, elapsed, ctx, data, config))
        .collect()
}

/// Production and storage allocation
fn run_production(
    settlement: &mut Settlement,
    elapsed: Seconds,
    ctx: &TickContext<'_>,
    data: &GameData,
    config: &SimulationConfig,
    events: &mut Vec<SettlementEvent>,
) {
    let caps = capacities(settlement, data, config);
    let records = resolve_production(settlement, data, config, &caps, elapsed);
    let report = allocate(settlement, &records, &caps, ctx.gates());

    for (building, resource, reason) in report.throttled {
        events.push(SettlementEvent::ProducerThrottled {
            building,
            resource,
            reason,
        });
    }

    for record in records.iter().filter(|r| r.input_limited) {
        if settlement.idle_reasons.contains_key(&record.building) {
            continue;
        }
        tracing::debug!("{:?} is missing inputs for {:?}", record.building, record.resource);
        settlement
            .idle_reasons
            .insert(record.building, IdleReason::MissingInput);
        events.push(SettlementEvent::ProducerThrottled {
            building: record.building,
            resource: record.resource,
            reason: IdleReason::MissingInput,
        });
    }
}

/// Feed the population and apply deaths, growth and emigration
fn run_population(
    settlement: &mut Settlement,
    elapsed: Seconds,
    ctx: &TickContext<'_>,
    config: &SimulationConfig,
    events: &mut Vec<SettlementEvent>,
) -> PopulationOutcome {
    let input = PopulationInput {
        population: settlement.population,
        captives: settlement.captives,
        housing_capacity: settlement.housing_capacity,
        town_hall_level: settlement.level(BuildingKind::TownHall),
        approval: settlement.approval,
        ration_level: settlement.ration_level,
        growth_carry: settlement.growth_carry,
        food: ResourceKind::FOODS
            .iter()
            .map(|res| (*res, settlement.resources.get(*res)))
            .collect(),
        elapsed,
        growth_multiplier: ctx.research.growth_multiplier,
        timer_multiplier: ctx.research.timer_multiplier,
    };
    let outcome = tick_population(&input, config);

    for (food, amount) in &outcome.consumed_food {
        settlement.resources.remove(*food, *amount);
    }
    settlement.population = outcome.new_population;
    settlement.growth_carry = outcome.growth_carry;
    settlement.captives = settlement.captives.saturating_sub(outcome.captive_deaths);

    if outcome.starvation_deaths > 0 {
        tracing::info!(
            "{}: {} citizens starved",
            settlement.name,
            outcome.starvation_deaths
        );
        events.push(SettlementEvent::Starvation {
            deaths: outcome.starvation_deaths,
        });
    }
    if outcome.emigrants > 0 {
        events.push(SettlementEvent::Emigration {
            emigrants: outcome.emigrants,
        });
    }
    if outcome.captive_deaths > 0 {
        events.push(SettlementEvent::CaptivesDied {
            deaths: outcome.captive_deaths,
        });
    }
    if outcome.born > 0 {
        events.push(SettlementEvent::PopulationGrew { born: outcome.born });
    }

    outcome
}

/// Villagers follow the population after losses and growth
fn sync_villagers(settlement: &mut Settlement) {
    settlement
        .units
        .insert(UnitKind::Villager, settlement.population);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Settlement, GameData, SimulationConfig) {
        let data = GameData::with_defaults();
        let settlement = Settlement::new("Tickham", &data);
        (settlement, data, SimulationConfig::default())
    }

    #[test]
    fn test_tick_advances_counter_and_assigns() {
        let (mut settlement, data, config) = setup();
        let events = tick(&mut settlement, 1.0, &TickContext::default(), &data, &config);

        assert_eq!(settlement.tick_count, 1);
        assert_eq!(settlement.last_tick_seconds, 1.0);
        assert_eq!(settlement.assigned(BuildingKind::Farm), 6);
        assert!(events.contains(&SettlementEvent::WorkersAutoAssigned {
            building: BuildingKind::Woodcutter,
            workers: 5
        }));
    }

    #[test]
    fn test_second_tick_produces_with_assigned_workers() {
        let (mut settlement, data, config) = setup();
        let ctx = TickContext::default();
        tick(&mut settlement, 1.0, &ctx, &data, &config);
        let timber = settlement.resources.get(ResourceKind::Timber);

        tick(&mut settlement, 60.0, &ctx, &data, &config);
        assert!(settlement.resources.get(ResourceKind::Timber) > timber);
    }

    #[test]
    fn test_negative_or_nan_elapsed_is_zero() {
        let (mut settlement, data, config) = setup();
        let before = settlement.resources.clone();
        tick(&mut settlement, f64::NAN, &TickContext::default(), &data, &config);
        tick(&mut settlement, -50.0, &TickContext::default(), &data, &config);
        assert_eq!(settlement.resources, before);
        assert_eq!(settlement.tick_count, 2);
    }

    #[test]
    fn test_missing_input_reason_reported() {
        let (mut settlement, data, config) = setup();
        settlement.buildings.insert(BuildingKind::Smelter, 1);
        settlement.assignments.insert(BuildingKind::Smelter, 2);

        let events = tick(&mut settlement, 60.0, &TickContext::default(), &data, &config);
        assert_eq!(
            settlement.idle_reason(BuildingKind::Smelter),
            Some(IdleReason::MissingInput)
        );
        assert!(events.iter().any(|e| matches!(
            e,
            SettlementEvent::ProducerThrottled {
                building: BuildingKind::Smelter,
                reason: IdleReason::MissingInput,
                ..
            }
        )));
    }

    #[test]
    fn test_villagers_follow_population() {
        let (mut settlement, data, config) = setup();
        settlement.population = 500;
        settlement.units.insert(UnitKind::Villager, 500);
        settlement.assignments.insert(BuildingKind::Farm, 6);
        settlement.assignments.insert(BuildingKind::Woodcutter, 5);

        tick(&mut settlement, 1.0, &TickContext::default(), &data, &config);
        // Housing is 25, so population is clamped and workers released
        assert_eq!(settlement.population, 25);
        assert_eq!(settlement.villagers(), 25);
        assert!(settlement.total_assigned() <= settlement.villagers());
    }

    #[test]
    fn test_tick_all_matches_sequential() {
        let (settlement, data, config) = setup();
        let ctx = TickContext::default();
        let mut batch = vec![settlement.clone(), settlement.clone(), settlement.clone()];
        let mut single = settlement;

        for _ in 0..5 {
            tick_all(&mut batch, 120.0, &ctx, &data, &config);
            tick(&mut single, 120.0, &ctx, &data, &config);
        }
        for s in &batch {
            assert_eq!(s.to_json().unwrap(), single.to_json().unwrap());
        }
    }
}
