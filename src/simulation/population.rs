//! Population system - food, starvation, growth, emigration
//!
//! Pure function over a snapshot of the settlement's population inputs.
//! The caller applies the outcome.
//!
//! Four feeding regimes:
//! - ration 0: nobody is fed, full starvation rate, no food eaten
//! - no food at all: same as ration 0
//! - partial food: all food eaten, starvation scaled by the unmet share
//! - fed: exactly the need is eaten, no deaths, growth possible

use std::collections::BTreeMap;

use crate::core::config::SimulationConfig;
use crate::core::types::{round_amount, ResourceKind, Seconds};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Everything the population step reads
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationInput {
    pub population: u32,
    pub captives: u32,
    /// Effective housing capacity (research applied)
    pub housing_capacity: u32,
    pub town_hall_level: u32,
    pub approval: u8,
    pub ration_level: u8,
    pub growth_carry: f64,
    /// Stock of each food kind
    pub food: BTreeMap<ResourceKind, f64>,
    pub elapsed: Seconds,
    pub growth_multiplier: f64,
    pub timer_multiplier: f64,
}

/// Result of one population step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationOutcome {
    pub new_population: u32,
    /// Units of each food kind eaten
    pub consumed_food: BTreeMap<ResourceKind, f64>,
    pub starvation_deaths: u32,
    pub captive_deaths: u32,
    pub emigrants: u32,
    /// Citizens added this step
    pub born: u32,
    pub growth_per_hour: f64,
    pub growth_carry: f64,
    /// Food need fully met
    pub fed: bool,
}

/// Sustenance needed for `elapsed` seconds at the given ration level
pub fn sustenance_needed(input: &PopulationInput, config: &SimulationConfig) -> f64 {
    let ration = config.ration_multipliers[input.ration_level.min(3) as usize];
    (input.population as f64 * config.sustenance_per_citizen_per_second
        + input.captives as f64 * config.sustenance_per_captive_per_second)
        * ration
        * input.elapsed
}

/// Total sustenance held in the food stock
pub fn sustenance_available(food: &BTreeMap<ResourceKind, f64>) -> f64 {
    ResourceKind::FOODS
        .iter()
        .map(|res| food.get(res).copied().unwrap_or(0.0).max(0.0) * res.sustenance())
        .sum()
}

/// Citizens per hour while fed
pub fn growth_rate(input: &PopulationInput, config: &SimulationConfig) -> f64 {
    let mut rate = config.growth_per_town_hall_level
        * input.town_hall_level as f64
        * (input.approval as f64 / 100.0)
        * config.global_pop_growth_multiplier
        * input.growth_multiplier
        * input.timer_multiplier;

    match input.ration_level {
        0 | 1 => rate = 0.0,
        3 => rate *= 2.0,
        _ => {}
    }
    if input.ration_level >= 2 {
        rate = rate.max(config.min_fed_growth_per_hour);
    }
    rate
}

/// Drain `needed` sustenance from food kinds in draining order
fn drain_food(food: &BTreeMap<ResourceKind, f64>, needed: f64) -> BTreeMap<ResourceKind, f64> {
    let mut remaining = needed;
    let mut consumed = BTreeMap::new();
    for res in ResourceKind::FOODS {
        if remaining <= 0.0 {
            break;
        }
        let stock = food.get(&res).copied().unwrap_or(0.0).max(0.0);
        let take = round_amount(stock.min(remaining / res.sustenance()));
        if take > 0.0 {
            consumed.insert(res, take);
            remaining -= take * res.sustenance();
        }
    }
    consumed
}

/// Advance population for one tick
pub fn tick_population(input: &PopulationInput, config: &SimulationConfig) -> PopulationOutcome {
    let elapsed = input.elapsed.max(0.0);
    let hours = elapsed / SECONDS_PER_HOUR;
    let population = input.population;
    let mut outcome = PopulationOutcome {
        new_population: population,
        growth_carry: input.growth_carry,
        ..Default::default()
    };

    let needed = sustenance_needed(input, config);
    let available = sustenance_available(&input.food);
    let full_starvation =
        (population as f64 * config.starvation_rate_per_hour * hours).floor() as u32;

    if input.ration_level == 0 {
        outcome.starvation_deaths = full_starvation;
    } else if needed <= 0.0 {
        outcome.fed = true;
    } else if available <= 0.0 {
        outcome.starvation_deaths = full_starvation;
    } else if available < needed {
        let unmet = 1.0 - available / needed;
        outcome.starvation_deaths =
            (population as f64 * config.starvation_rate_per_hour * hours * unmet).floor() as u32;
        outcome.consumed_food = input
            .food
            .iter()
            .filter(|(res, amount)| res.is_food() && **amount > 0.0)
            .map(|(res, amount)| (*res, *amount))
            .collect();
    } else {
        outcome.consumed_food = drain_food(&input.food, needed);
        outcome.fed = true;
    }

    let mut current = population.saturating_sub(outcome.starvation_deaths);

    if outcome.fed {
        let rate = growth_rate(input, config);
        outcome.growth_per_hour = rate;

        if current >= input.housing_capacity {
            outcome.growth_carry = 0.0;
        } else {
            let total = input.growth_carry.max(0.0) + rate * hours;
            let born = total.floor();
            outcome.growth_carry = total - born;
            let room = input.housing_capacity - current;
            let born = (born as u32).min(room);
            current += born;
            outcome.born = born;
            if current >= input.housing_capacity {
                outcome.growth_carry = 0.0;
            }
        }
    }

    if input.approval == 0 {
        outcome.emigrants =
            (current as f64 * config.emigration_rate_per_hour * hours).floor() as u32;
        current = current.saturating_sub(outcome.emigrants);
    }

    outcome.new_population = current.min(input.housing_capacity);
    outcome.captive_deaths =
        (input.captives as f64 * config.captive_morbidity_per_hour * hours).floor() as u32;
    outcome.captive_deaths = outcome.captive_deaths.min(input.captives);

    outcome
}
