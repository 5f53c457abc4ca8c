//! Storage capacity and allocation of producer deltas
//!
//! Consumption is authoritative and always applied. Production is tentative
//! and deposited against remaining headroom in record order, so the first
//! registered producer of a resource is served first.

use std::collections::BTreeMap;

use crate::city::cost::upgrade_cost;
use crate::city::data::GameData;
use crate::city::production::ProducerRecord;
use crate::city::settlement::{IdleReason, Settlement};
use crate::core::config::SimulationConfig;
use crate::core::types::{round_amount, BuildingKind, ResourceKind, StorageClass};

/// Which gated resource classes may be stored this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageGates {
    pub allow_gold: bool,
    pub allow_ore: bool,
}

impl Default for StorageGates {
    fn default() -> Self {
        Self {
            allow_gold: true,
            allow_ore: true,
        }
    }
}

impl StorageGates {
    pub fn allows(&self, resource: ResourceKind) -> bool {
        match resource.storage_class() {
            Some(StorageClass::Gold) => self.allow_gold,
            Some(StorageClass::Ore) => self.allow_ore,
            None => true,
        }
    }
}

/// Capacity for one resource at a storehouse level
///
/// Formula: floor(storage_base * storage_multiplier^level), raised to at
/// least `storage_upgrade_headroom` times the next storehouse upgrade cost.
pub fn storage_capacity(
    data: &GameData,
    config: &SimulationConfig,
    resource: ResourceKind,
    storehouse_level: u32,
) -> f64 {
    let scaled = (data.storage_base(resource)
        * config.storage_multiplier.powi(storehouse_level as i32))
    .floor();

    let next_upgrade = upgrade_cost(data, BuildingKind::Storehouse, storehouse_level)
        .ok()
        .and_then(|cost| cost.get(&resource).copied())
        .unwrap_or(0);
    let floor = (next_upgrade as f64 * config.storage_upgrade_headroom).ceil();

    scaled.max(floor)
}

/// Capacities for every resource at the settlement's storehouse level
pub fn capacities(
    settlement: &Settlement,
    data: &GameData,
    config: &SimulationConfig,
) -> BTreeMap<ResourceKind, f64> {
    let level = settlement.level(BuildingKind::Storehouse);
    ResourceKind::ALL
        .iter()
        .map(|res| (*res, storage_capacity(data, config, *res, level)))
        .collect()
}

/// Remaining space for a resource
pub fn headroom(
    settlement: &Settlement,
    capacities: &BTreeMap<ResourceKind, f64>,
    resource: ResourceKind,
) -> f64 {
    let cap = capacities.get(&resource).copied().unwrap_or(0.0);
    (cap - settlement.resources.get(resource)).max(0.0)
}

/// Result of applying one tick's producer records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationReport {
    /// Amount actually applied per record, same order as the input
    pub applied: Vec<f64>,
    /// Producers that could not deposit everything
    pub throttled: Vec<(BuildingKind, ResourceKind, IdleReason)>,
}

/// Apply producer records to the settlement's stockpile
pub fn allocate(
    settlement: &mut Settlement,
    records: &[ProducerRecord],
    capacities: &BTreeMap<ResourceKind, f64>,
    gates: StorageGates,
) -> AllocationReport {
    let mut report = AllocationReport {
        applied: vec![0.0; records.len()],
        throttled: Vec::new(),
    };

    // Consumption first, unconditionally
    for (i, record) in records.iter().enumerate() {
        if record.amount < 0.0 {
            let removed = settlement.resources.remove(record.resource, -record.amount);
            report.applied[i] = -removed;
        }
    }

    // Production against headroom, first registered wins
    for (i, record) in records.iter().enumerate() {
        if record.amount < 0.0 {
            continue;
        }

        if !gates.allows(record.resource) {
            if record.amount > 0.0 {
                mark(settlement, &mut report, record, IdleReason::StorageLocked);
            }
            continue;
        }

        let space = headroom(settlement, capacities, record.resource);
        let deposit = round_amount(record.amount.min(space));
        if deposit > 0.0 {
            settlement.resources.add(record.resource, deposit);
        }
        report.applied[i] = deposit;

        if record.storage_clamped || deposit + 1e-9 < record.amount {
            mark(settlement, &mut report, record, IdleReason::StorageLimit);
        }
    }

    report
}

fn mark(
    settlement: &mut Settlement,
    report: &mut AllocationReport,
    record: &ProducerRecord,
    reason: IdleReason,
) {
    tracing::debug!(
        "{:?} throttled on {:?}: {}",
        record.building,
        record.resource,
        reason.label()
    );
    settlement.idle_reasons.insert(record.building, reason);
    report.throttled.push((record.building, record.resource, reason));
}

/// Deposit a single amount outside the producer pipeline (mission loot)
///
/// Returns the amount stored; the rest is discarded.
pub fn deposit(
    settlement: &mut Settlement,
    resource: ResourceKind,
    amount: f64,
    capacities: &BTreeMap<ResourceKind, f64>,
    gates: StorageGates,
) -> f64 {
    if amount <= 0.0 || !gates.allows(resource) {
        return 0.0;
    }
    let stored = round_amount(amount.min(headroom(settlement, capacities, resource)));
    settlement.resources.add(resource, stored);
    stored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(building: BuildingKind, resource: ResourceKind, amount: f64) -> ProducerRecord {
        ProducerRecord {
            building,
            resource,
            amount,
            workers: 1,
            storage_clamped: false,
            input_limited: false,
        }
    }

    fn setup() -> (Settlement, GameData, SimulationConfig) {
        let data = GameData::with_defaults();
        let config = SimulationConfig::default();
        let settlement = Settlement::new("Storeton", &data);
        (settlement, data, config)
    }

    #[test]
    fn test_storage_capacity_scales_with_level() {
        let data = GameData::with_defaults();
        let config = SimulationConfig::default();
        assert_eq!(storage_capacity(&data, &config, ResourceKind::Timber, 0), 500.0);
        // floor(500 * 1.3^2) = 845
        assert_eq!(storage_capacity(&data, &config, ResourceKind::Timber, 2), 845.0);
    }

    #[test]
    fn test_storage_capacity_covers_next_storehouse() {
        let data = GameData::with_defaults();
        let config = SimulationConfig::default();
        for level in 0..30 {
            let next = upgrade_cost(&data, BuildingKind::Storehouse, level).unwrap();
            for (res, amount) in next {
                let cap = storage_capacity(&data, &config, res, level);
                assert!(
                    cap >= amount as f64 * 1.05,
                    "level {} {:?}: capacity {} below next cost {}",
                    level,
                    res,
                    cap,
                    amount
                );
            }
        }
    }

    #[test]
    fn test_consumption_always_applied() {
        let (mut settlement, data, config) = setup();
        let caps = capacities(&settlement, &data, &config);
        settlement.resources.set(ResourceKind::Grain, 10.0);

        let records = vec![record(BuildingKind::Mill, ResourceKind::Grain, -25.0)];
        let report = allocate(&mut settlement, &records, &caps, StorageGates::default());

        assert_eq!(settlement.resources.get(ResourceKind::Grain), 0.0);
        assert_eq!(report.applied[0], -10.0);
    }

    #[test]
    fn test_consumption_frees_space_for_production() {
        let (mut settlement, data, config) = setup();
        let caps = capacities(&settlement, &data, &config);
        let cap = caps[&ResourceKind::Timber];
        settlement.resources.set(ResourceKind::Timber, cap);

        // Producer registered ahead of the consumer
        let records = vec![
            record(BuildingKind::Woodcutter, ResourceKind::Timber, 80.0),
            record(BuildingKind::Bakery, ResourceKind::Timber, -50.0),
        ];
        let report = allocate(&mut settlement, &records, &caps, StorageGates::default());

        assert_eq!(report.applied, vec![50.0, -50.0]);
        assert_eq!(settlement.resources.get(ResourceKind::Timber), cap);
    }

    #[test]
    fn test_first_registered_producer_gets_headroom() {
        let (mut settlement, data, config) = setup();
        let caps = capacities(&settlement, &data, &config);
        let cap = caps[&ResourceKind::Gold];
        settlement.resources.set(ResourceKind::Gold, cap - 30.0);

        let records = vec![
            record(BuildingKind::GoldMine, ResourceKind::Gold, 20.0),
            record(BuildingKind::TownHall, ResourceKind::Gold, 20.0),
        ];
        let report = allocate(&mut settlement, &records, &caps, StorageGates::default());

        assert_eq!(report.applied, vec![20.0, 10.0]);
        assert_eq!(settlement.resources.get(ResourceKind::Gold), cap);
        assert_eq!(settlement.idle_reason(BuildingKind::GoldMine), None);
        assert_eq!(
            settlement.idle_reason(BuildingKind::TownHall),
            Some(IdleReason::StorageLimit)
        );
    }

    #[test]
    fn test_gated_resource_discarded() {
        let (mut settlement, data, config) = setup();
        let caps = capacities(&settlement, &data, &config);

        let records = vec![record(BuildingKind::Mine, ResourceKind::IronOre, 12.0)];
        let gates = StorageGates {
            allow_gold: true,
            allow_ore: false,
        };
        let report = allocate(&mut settlement, &records, &caps, gates);

        assert_eq!(settlement.resources.get(ResourceKind::IronOre), 0.0);
        assert_eq!(report.applied[0], 0.0);
        assert_eq!(
            settlement.idle_reason(BuildingKind::Mine),
            Some(IdleReason::StorageLocked)
        );
    }

    #[test]
    fn test_clamped_record_marks_storage_limit() {
        let (mut settlement, data, config) = setup();
        let caps = capacities(&settlement, &data, &config);

        let mut full = record(BuildingKind::Woodcutter, ResourceKind::Timber, 0.0);
        full.storage_clamped = true;
        allocate(&mut settlement, &[full], &caps, StorageGates::default());

        assert_eq!(
            settlement.idle_reason(BuildingKind::Woodcutter).map(|r| r.label()),
            Some("Storage Limit")
        );
    }

    #[test]
    fn test_deposit_respects_capacity() {
        let (mut settlement, data, config) = setup();
        let caps = capacities(&settlement, &data, &config);
        let cap = caps[&ResourceKind::Stone];
        settlement.resources.set(ResourceKind::Stone, cap - 5.0);

        let gates = StorageGates::default();
        let stored = deposit(&mut settlement, ResourceKind::Stone, 50.0, &caps, gates);
        assert_eq!(stored, 5.0);
        assert_eq!(settlement.resources.get(ResourceKind::Stone), cap);
    }
}
