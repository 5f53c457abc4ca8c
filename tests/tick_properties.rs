//! Property tests for tick invariants
//!
//! Random policies, stockpiles, build orders and intervals. After every
//! tick: no negative resources, assignments fit the villagers, population
//! fits the housing, and replays are byte-identical.

use arc_settlement::city::{start_construction, GameData, Settlement};
use arc_settlement::core::{BuildingKind, ResourceKind, SimulationConfig, UnitKind};
use arc_settlement::simulation::{tick, ResearchModifiers, TickContext};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Scenario {
    population: u32,
    tax_rate: u8,
    ration_level: u8,
    approval: u8,
    stock: Vec<f64>,
    builds: Vec<usize>,
    intervals: Vec<f64>,
    housing_multiplier: f64,
    allow_gold: bool,
    allow_ore: bool,
}

fn scenario() -> impl Strategy<Value = Scenario> {
    (
        0_u32..200,
        0_u8..=100,
        0_u8..=3,
        0_u8..=100,
        prop::collection::vec(0.0_f64..2_000.0, ResourceKind::ALL.len()),
        prop::collection::vec(0_usize..BuildingKind::ALL.len(), 0..6),
        prop::collection::vec(0.0_f64..7_200.0, 1..25),
        0.5_f64..2.0,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(pop, tax, ration, approval, stock, builds, intervals, housing, gold, ore)| Scenario {
                population: pop,
                tax_rate: tax,
                ration_level: ration,
                approval,
                stock,
                builds,
                intervals,
                housing_multiplier: housing,
                allow_gold: gold,
                allow_ore: ore,
            },
        )
}

fn build(scenario: &Scenario, data: &GameData) -> Settlement {
    let mut settlement = Settlement::new("Proptown", data);
    settlement.population = scenario.population;
    settlement.units.insert(UnitKind::Villager, scenario.population);
    settlement.tax_rate = scenario.tax_rate;
    settlement.ration_level = scenario.ration_level;
    settlement.approval = scenario.approval;
    settlement.buildings.insert(BuildingKind::Mill, 1);
    settlement.buildings.insert(BuildingKind::Smelter, 1);
    settlement.buildings.insert(BuildingKind::Mine, 1);
    for building in [BuildingKind::Mill, BuildingKind::Smelter, BuildingKind::Mine] {
        settlement.auto_assign.insert(building, true);
    }
    for (resource, amount) in ResourceKind::ALL.iter().zip(&scenario.stock) {
        settlement.resources.set(*resource, *amount);
    }
    for index in &scenario.builds {
        let _ = start_construction(&mut settlement, BuildingKind::ALL[*index], data);
    }
    settlement
}

fn run(scenario: &Scenario, data: &GameData, config: &SimulationConfig) -> Vec<Settlement> {
    let ctx = TickContext {
        allow_gold_storage: scenario.allow_gold,
        allow_ore_storage: scenario.allow_ore,
        research: ResearchModifiers {
            housing_multiplier: scenario.housing_multiplier,
            ..ResearchModifiers::default()
        },
        ..TickContext::default()
    };
    let mut settlement = build(scenario, data);
    let mut states = Vec::with_capacity(scenario.intervals.len());
    for elapsed in &scenario.intervals {
        tick(&mut settlement, *elapsed, &ctx, data, config);
        states.push(settlement.clone());
    }
    states
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn property_resources_never_negative(scenario in scenario()) {
        let data = GameData::with_defaults();
        let config = SimulationConfig::default();
        for state in run(&scenario, &data, &config) {
            for (resource, amount) in state.resources.iter() {
                prop_assert!(amount >= 0.0, "{:?} = {}", resource, amount);
            }
        }
    }

    #[test]
    fn property_assignments_fit_villagers(scenario in scenario()) {
        let data = GameData::with_defaults();
        let config = SimulationConfig::default();
        for state in run(&scenario, &data, &config) {
            prop_assert!(state.total_assigned() <= state.villagers());
        }
    }

    #[test]
    fn property_population_fits_housing(scenario in scenario()) {
        let data = GameData::with_defaults();
        let config = SimulationConfig::default();
        for state in run(&scenario, &data, &config) {
            prop_assert!(
                state.population <= state.housing_capacity,
                "population {} housing {}",
                state.population,
                state.housing_capacity
            );
            prop_assert!(state.growth_carry >= 0.0 && state.growth_carry < 1.0);
            prop_assert!(state.approval <= 100);
        }
    }

    #[test]
    fn property_replay_is_byte_identical(scenario in scenario()) {
        let data = GameData::with_defaults();
        let config = SimulationConfig::default();
        let a = run(&scenario, &data, &config);
        let b = run(&scenario, &data, &config);
        let last_a = a.last().map(|s| s.to_json().unwrap());
        let last_b = b.last().map(|s| s.to_json().unwrap());
        prop_assert_eq!(last_a, last_b);
    }

    #[test]
    fn property_start_construction_idempotent(index in 0_usize..14, level in 0_u32..8) {
        let data = GameData::with_defaults();
        let mut settlement = Settlement::new("Twice", &data);
        let building = BuildingKind::ALL[index];
        settlement.buildings.insert(building, level);
        for resource in ResourceKind::ALL {
            settlement.resources.set(resource, 1.0e7);
        }

        let first = start_construction(&mut settlement, building, &data).unwrap();
        let after_first = settlement.resources.clone();
        let second = start_construction(&mut settlement, building, &data).unwrap();

        prop_assert!(first.success && second.success);
        prop_assert_eq!(&settlement.resources, &after_first);
        prop_assert_eq!(settlement.queue.len(), 1);
    }
}
