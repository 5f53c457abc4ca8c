//! Production system - resolves each producer's resource delta for a tick
//!
//! For every configured producer with a built building and workers (or a
//! level-scaled producer), this computes:
//! - the uncapped potential from workers, level and elapsed time
//! - the input-bounded output and matching input consumption for
//!   processing producers
//!
//! Records are returned in catalog order. Negative amounts are consumption
//! and authoritative; positive amounts are tentative until the storage
//! allocator deposits them. Simple producers are clamped there, after the
//! whole tick's consumption has freed its space.

use std::collections::BTreeMap;

use crate::city::data::GameData;
use crate::city::settlement::Settlement;
use crate::core::config::SimulationConfig;
use crate::core::types::{round_amount, BuildingKind, ResourceKind, Seconds};

/// Signed resource delta of one producer for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerRecord {
    pub building: BuildingKind,
    pub resource: ResourceKind,
    /// Negative = consumption, positive = tentative production
    pub amount: f64,
    pub workers: u32,
    /// Processor output was cut to the free storage space
    pub storage_clamped: bool,
    /// Output was cut by a missing input
    pub input_limited: bool,
}

impl ProducerRecord {
    fn new(building: BuildingKind, resource: ResourceKind, amount: f64, workers: u32) -> Self {
        Self {
            building,
            resource,
            amount: round_amount(amount),
            workers,
            storage_clamped: false,
            input_limited: false,
        }
    }
}

/// Compute every producer's delta for `elapsed` seconds
///
/// Does not mutate the settlement; the caller applies the records through
/// `storage::allocate`.
pub fn resolve_production(
    settlement: &Settlement,
    data: &GameData,
    config: &SimulationConfig,
    capacities: &BTreeMap<ResourceKind, f64>,
    elapsed: Seconds,
) -> Vec<ProducerRecord> {
    let mut records = Vec::new();
    if elapsed <= 0.0 {
        return records;
    }

    // Inputs still available to processors this tick
    let mut available: BTreeMap<ResourceKind, f64> = ResourceKind::ALL
        .iter()
        .map(|res| (*res, settlement.resources.get(*res)))
        .collect();
    // Output already promised to earlier producers
    let mut claimed: BTreeMap<ResourceKind, f64> = BTreeMap::new();
    // Stock already drawn down by earlier processors
    let mut consumed: BTreeMap<ResourceKind, f64> = BTreeMap::new();

    for spec in data.production.all() {
        let level = settlement.level(spec.building);
        if level == 0 {
            continue;
        }
        let workers = settlement.assigned(spec.building);
        if workers == 0 && !spec.level_scaled {
            continue;
        }

        let potential = spec.potential(
            workers,
            level,
            elapsed,
            config.global_production_multiplier,
        );

        if !spec.is_processing() {
            let record = ProducerRecord::new(spec.building, spec.output, potential, workers);
            *claimed.entry(spec.output).or_insert(0.0) += record.amount;
            records.push(record);
            continue;
        }

        let cap = capacities.get(&spec.output).copied().unwrap_or(0.0);
        let stock = settlement.resources.get(spec.output)
            - consumed.get(&spec.output).copied().unwrap_or(0.0);
        let space_left =
            (cap - stock.max(0.0) - claimed.get(&spec.output).copied().unwrap_or(0.0)).max(0.0);
        let mut output = potential;
        let mut input_limited = false;
        for (input, ratio) in &spec.inputs {
            let limit = available.get(input).copied().unwrap_or(0.0) / ratio;
            if limit < output {
                output = limit;
                input_limited = true;
            }
        }
        let mut storage_clamped = false;
        if space_left < output {
            output = space_left;
            storage_clamped = true;
            input_limited = false;
        }
        let output = round_amount(output.max(0.0));

        if output > 0.0 {
            for (input, ratio) in &spec.inputs {
                let used = round_amount(output * ratio);
                if let Some(stock) = available.get_mut(input) {
                    *stock = (*stock - used).max(0.0);
                }
                *consumed.entry(*input).or_insert(0.0) += used;
                records.push(ProducerRecord::new(spec.building, *input, -used, workers));
            }
        }

        let mut record = ProducerRecord::new(spec.building, spec.output, output, workers);
        record.storage_clamped = storage_clamped;
        record.input_limited = input_limited;
        *claimed.entry(spec.output).or_insert(0.0) += output;
        records.push(record);
    }

    let town_hall = settlement.level(BuildingKind::TownHall);
    if town_hall > 0 && settlement.tax_rate > 0 && settlement.population > 0 {
        let taxes = settlement.population as f64
            * (settlement.tax_rate as f64 / 100.0)
            * config.tax_gold_per_citizen_per_second
            * elapsed;
        records.push(ProducerRecord::new(
            BuildingKind::TownHall,
            ResourceKind::Gold,
            taxes,
            0,
        ));
    }

    records
}
