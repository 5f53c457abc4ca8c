//! Missions - units sent away from the settlement
//!
//! Units leave the garrison on dispatch and count down while away. When a
//! mission finishes, the context's resolver for its kind decides who comes
//! back and what they bring.

use std::collections::BTreeMap;

use crate::city::data::GameData;
use crate::city::settlement::{Mission, MissionKind, Settlement, SettlementEvent};
use crate::city::storage::{capacities, deposit};
use crate::core::config::SimulationConfig;
use crate::core::types::{ActionResult, Seconds, UnitKind};
use crate::simulation::context::{MissionOutcome, TickContext};

/// Send units away on a mission
pub fn dispatch_mission(
    settlement: &mut Settlement,
    kind: MissionKind,
    target: impl Into<String>,
    units: BTreeMap<UnitKind, u32>,
    travel_seconds: Seconds,
) -> ActionResult {
    let units: BTreeMap<UnitKind, u32> = units.into_iter().filter(|(_, n)| *n > 0).collect();
    if units.is_empty() {
        return ActionResult::fail("A mission needs at least one unit");
    }
    if units.contains_key(&UnitKind::Villager) {
        return ActionResult::fail("Villagers can not be sent on missions");
    }
    if !travel_seconds.is_finite() || travel_seconds < 0.0 {
        return ActionResult::fail("Travel time must be a non-negative number of seconds");
    }
    for (unit, count) in &units {
        let garrison = settlement.unit_count(*unit);
        if garrison < *count {
            return ActionResult::fail(format!(
                "Only {} {:?} available, {} requested",
                garrison, unit, count
            ));
        }
    }

    for (unit, count) in &units {
        if let Some(garrison) = settlement.units.get_mut(unit) {
            *garrison -= count;
        }
    }

    let id = settlement.next_mission_id;
    settlement.next_mission_id += 1;
    let target = target.into();
    let message = format!("{:?} mission {} sent to {}", kind, id, target);
    settlement.missions.push(Mission {
        id,
        kind,
        target,
        units,
        seconds_remaining: travel_seconds,
    });

    ActionResult::ok(message)
}

/// Count down every mission and resolve those that arrive
pub fn advance_missions(
    settlement: &mut Settlement,
    elapsed: Seconds,
    ctx: &TickContext<'_>,
    data: &GameData,
    config: &SimulationConfig,
    events: &mut Vec<SettlementEvent>,
) {
    if settlement.missions.is_empty() {
        return;
    }

    let mut arrived = Vec::new();
    let mut away = Vec::with_capacity(settlement.missions.len());
    for mut mission in settlement.missions.drain(..) {
        mission.seconds_remaining -= elapsed.max(0.0);
        if mission.seconds_remaining <= 0.0 {
            arrived.push(mission);
        } else {
            away.push(mission);
        }
    }
    settlement.missions = away;

    if arrived.is_empty() {
        return;
    }

    let caps = capacities(settlement, data, config);
    for mission in arrived {
        let (outcome, resolved) = match ctx.handler(mission.kind) {
            Some(handler) => (handler.resolve(&mission), true),
            None => (MissionOutcome::unharmed(&mission), false),
        };

        // Nobody comes back who was not sent
        for (unit, sent) in &mission.units {
            let survivors = outcome.surviving_units.get(unit).copied().unwrap_or(0).min(*sent);
            *settlement.units.entry(*unit).or_insert(0) += survivors;
        }
        for (resource, amount) in &outcome.loot {
            deposit(settlement, *resource, *amount, &caps, ctx.gates());
        }
        settlement.captives = settlement.captives.saturating_add(outcome.captives);

        tracing::debug!(
            "{}: {:?} mission {} returned from {}",
            settlement.name,
            mission.kind,
            mission.id,
            mission.target
        );
        events.push(SettlementEvent::MissionReturned {
            id: mission.id,
            kind: mission.kind,
            resolved,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ResourceKind;

    fn garrisoned() -> (Settlement, GameData, SimulationConfig) {
        let data = GameData::with_defaults();
        let mut settlement = Settlement::new("Outpost", &data);
        settlement.units.insert(UnitKind::Militia, 10);
        settlement.units.insert(UnitKind::Scout, 2);
        (settlement, data, SimulationConfig::default())
    }

    fn party(entries: &[(UnitKind, u32)]) -> BTreeMap<UnitKind, u32> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_dispatch_removes_units() {
        let (mut settlement, _, _) = garrisoned();
        let result = dispatch_mission(
            &mut settlement,
            MissionKind::Attack,
            "Bandit Camp",
            party(&[(UnitKind::Militia, 6)]),
            300.0,
        );
        assert!(result.success, "{}", result.message);
        assert_eq!(settlement.unit_count(UnitKind::Militia), 4);
        assert_eq!(settlement.missions.len(), 1);
        assert_eq!(settlement.next_mission_id, 1);
    }

    #[test]
    fn test_dispatch_validation() {
        let (mut settlement, _, _) = garrisoned();
        let empty = BTreeMap::new();
        let villagers = party(&[(UnitKind::Villager, 1)]);
        let too_many = party(&[(UnitKind::Scout, 3)]);
        for units in [empty, villagers, too_many] {
            let result = dispatch_mission(&mut settlement, MissionKind::Scout, "x", units, 10.0);
            assert!(!result.success);
        }
        assert_eq!(settlement.unit_count(UnitKind::Scout), 2);
        assert!(settlement.missions.is_empty());
    }

    #[test]
    fn test_missing_handler_returns_units_unharmed() {
        let (mut settlement, data, config) = garrisoned();
        let scouts = party(&[(UnitKind::Scout, 2)]);
        dispatch_mission(&mut settlement, MissionKind::Scout, "Ridge", scouts, 60.0);

        let mut events = Vec::new();
        let ctx = TickContext::default();
        advance_missions(&mut settlement, 30.0, &ctx, &data, &config, &mut events);
        assert_eq!(settlement.missions.len(), 1);
        assert!(events.is_empty());

        advance_missions(&mut settlement, 30.0, &ctx, &data, &config, &mut events);
        assert!(settlement.missions.is_empty());
        assert_eq!(settlement.unit_count(UnitKind::Scout), 2);
        assert_eq!(
            events,
            vec![SettlementEvent::MissionReturned {
                id: 0,
                kind: MissionKind::Scout,
                resolved: false
            }]
        );
    }

    #[test]
    fn test_handler_outcome_applied() {
        let (mut settlement, data, config) = garrisoned();
        let militia = party(&[(UnitKind::Militia, 5)]);
        dispatch_mission(&mut settlement, MissionKind::Attack, "Keep", militia, 10.0);

        let battle = |mission: &Mission| MissionOutcome {
            // Claims more survivors than were sent
            surviving_units: mission.units.iter().map(|(u, _)| (*u, 99)).collect(),
            loot: [(ResourceKind::Gold, 40.0), (ResourceKind::Iron, 1.0e9)]
                .into_iter()
                .collect(),
            captives: 4,
        };
        let ctx = TickContext::new().with_handler(MissionKind::Attack, &battle);
        let gold_before = settlement.resources.get(ResourceKind::Gold);
        let mut events = Vec::new();
        advance_missions(&mut settlement, 10.0, &ctx, &data, &config, &mut events);

        assert_eq!(settlement.unit_count(UnitKind::Militia), 10);
        assert_eq!(settlement.captives, 4);
        assert_eq!(settlement.resources.get(ResourceKind::Gold), gold_before + 40.0);
        let caps = capacities(&settlement, &data, &config);
        assert_eq!(settlement.resources.get(ResourceKind::Iron), caps[&ResourceKind::Iron]);
    }

    #[test]
    fn test_gated_loot_discarded() {
        let (mut settlement, data, config) = garrisoned();
        let militia = party(&[(UnitKind::Militia, 1)]);
        dispatch_mission(&mut settlement, MissionKind::Expedition, "Hills", militia, 0.0);

        let haul = |mission: &Mission| MissionOutcome {
            surviving_units: mission.units.clone(),
            loot: [(ResourceKind::IronOre, 50.0)].into_iter().collect(),
            captives: 0,
        };
        let mut ctx = TickContext::new().with_handler(MissionKind::Expedition, &haul);
        ctx.allow_ore_storage = false;
        let mut events = Vec::new();
        advance_missions(&mut settlement, 1.0, &ctx, &data, &config, &mut events);

        assert_eq!(settlement.resources.get(ResourceKind::IronOre), 0.0);
        assert_eq!(settlement.unit_count(UnitKind::Militia), 10);
    }
}
