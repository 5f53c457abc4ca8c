//! Settlement - the mutable aggregate advanced by the tick
//!
//! A settlement is owned by exactly one caller between ticks. Its serialized
//! form is the persisted snapshot; maps are ordered so snapshots of equal
//! state are byte-identical.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::city::building::housing_capacity;
use crate::city::data::GameData;
use crate::city::stockpile::Stockpile;
use crate::core::error::Result;
use crate::core::types::{BuildingKind, Cost, ResourceKind, Seconds, UnitKind};

/// What a queue entry produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueKind {
    Building(BuildingKind),
    Unit(UnitKind),
}

fn default_count() -> u32 {
    1
}

/// One entry in the build/recruit queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub kind: QueueKind,
    pub ticks_remaining: Seconds,
    /// Zero in snapshots that predate progress tracking; migrated on tick
    #[serde(default)]
    pub total_ticks: Seconds,
    /// Units still to produce (always 1 for buildings)
    #[serde(default = "default_count")]
    pub count: u32,
    /// Full cost for a building, per-unit cost for a unit batch
    #[serde(default)]
    pub cost: Cost,
}

impl QueueItem {
    pub fn building(building: BuildingKind, seconds: u32, cost: Cost) -> Self {
        Self {
            kind: QueueKind::Building(building),
            ticks_remaining: seconds as f64,
            total_ticks: seconds as f64,
            count: 1,
            cost,
        }
    }

    pub fn units(unit: UnitKind, count: u32, seconds_per_unit: u32, cost_per_unit: Cost) -> Self {
        Self {
            kind: QueueKind::Unit(unit),
            ticks_remaining: seconds_per_unit as f64,
            total_ticks: seconds_per_unit as f64,
            count,
            cost: cost_per_unit,
        }
    }

    /// Fraction of the current item already elapsed (0.0..=1.0)
    pub fn progress(&self) -> f64 {
        if self.total_ticks <= 0.0 {
            return 0.0;
        }
        ((self.total_ticks - self.ticks_remaining) / self.total_ticks).clamp(0.0, 1.0)
    }
}

/// Kind of an outbound mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionKind {
    Attack,
    Expedition,
    Scout,
}

/// Units away from the settlement on a mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: u64,
    pub kind: MissionKind,
    pub target: String,
    pub units: BTreeMap<UnitKind, u32>,
    pub seconds_remaining: Seconds,
}

/// Why a building did not produce its full amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdleReason {
    /// Output storage full
    StorageLimit,
    /// Output class not storable this tick
    StorageLocked,
    /// A required input ran out
    MissingInput,
}

impl IdleReason {
    pub fn label(&self) -> &'static str {
        match self {
            IdleReason::StorageLimit => "Storage Limit",
            IdleReason::StorageLocked => "Storage Locked",
            IdleReason::MissingInput => "Missing Input",
        }
    }
}

/// Things that happened during a tick, for logs and UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettlementEvent {
    ConstructionComplete { building: BuildingKind, level: u32 },
    UnitTrained { unit: UnitKind, remaining_in_batch: u32 },
    ProducerThrottled { building: BuildingKind, resource: ResourceKind, reason: IdleReason },
    Starvation { deaths: u32 },
    Emigration { emigrants: u32 },
    CaptivesDied { deaths: u32 },
    PopulationGrew { born: u32 },
    WorkersAutoAssigned { building: BuildingKind, workers: u32 },
    WorkersReleased { building: BuildingKind, workers: u32 },
    MissionReturned { id: u64, kind: MissionKind, resolved: bool },
}

fn default_ration_level() -> u8 {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub name: String,
    pub tick_count: u64,
    pub resources: Stockpile,
    pub population: u32,
    pub housing_capacity: u32,
    /// Percent, 0..=100
    pub tax_rate: u8,
    /// 0..=100
    pub approval: u8,
    pub buildings: BTreeMap<BuildingKind, u32>,
    pub units: BTreeMap<UnitKind, u32>,
    pub assignments: BTreeMap<BuildingKind, u32>,
    pub queue: Vec<QueueItem>,

    #[serde(default)]
    pub auto_assign: BTreeMap<BuildingKind, bool>,
    #[serde(default = "default_ration_level")]
    pub ration_level: u8,
    /// Fractional population growth carried between ticks
    #[serde(default)]
    pub growth_carry: f64,
    #[serde(default)]
    pub captives: u32,
    #[serde(default)]
    pub missions: Vec<Mission>,
    #[serde(default)]
    pub next_mission_id: u64,

    /// Per-tick diagnostics, rebuilt every tick
    #[serde(skip)]
    pub idle_reasons: BTreeMap<BuildingKind, IdleReason>,
    #[serde(skip)]
    pub last_tick_seconds: Seconds,
}

impl Settlement {
    /// A fresh settlement with starting buildings, resources and villagers
    pub fn new(name: impl Into<String>, data: &GameData) -> Self {
        let mut buildings: BTreeMap<BuildingKind, u32> =
            BuildingKind::ALL.iter().map(|kind| (*kind, 0)).collect();
        for kind in [
            BuildingKind::TownHall,
            BuildingKind::House,
            BuildingKind::Storehouse,
            BuildingKind::Woodcutter,
            BuildingKind::Quarry,
            BuildingKind::Farm,
        ] {
            buildings.insert(kind, 1);
        }

        let mut resources = Stockpile::new();
        resources.set(ResourceKind::Timber, 300.0);
        resources.set(ResourceKind::Stone, 200.0);
        resources.set(ResourceKind::Grain, 200.0);
        resources.set(ResourceKind::Gold, 50.0);

        let population = 20;
        let mut units: BTreeMap<UnitKind, u32> = UnitKind::ALL.iter().map(|u| (*u, 0)).collect();
        units.insert(UnitKind::Villager, population);

        let auto_assign = [BuildingKind::Woodcutter, BuildingKind::Quarry, BuildingKind::Farm]
            .into_iter()
            .map(|kind| (kind, true))
            .collect();

        let mut settlement = Self {
            name: name.into(),
            tick_count: 0,
            resources,
            population,
            housing_capacity: 0,
            tax_rate: 10,
            approval: 60,
            buildings,
            units,
            assignments: BTreeMap::new(),
            queue: Vec::new(),
            auto_assign,
            ration_level: default_ration_level(),
            growth_carry: 0.0,
            captives: 0,
            missions: Vec::new(),
            next_mission_id: 0,
            idle_reasons: BTreeMap::new(),
            last_tick_seconds: 0.0,
        };
        settlement.recompute_housing(data, 1.0);
        settlement
    }

    pub fn level(&self, building: BuildingKind) -> u32 {
        self.buildings.get(&building).copied().unwrap_or(0)
    }

    pub fn unit_count(&self, unit: UnitKind) -> u32 {
        self.units.get(&unit).copied().unwrap_or(0)
    }

    pub fn villagers(&self) -> u32 {
        self.unit_count(UnitKind::Villager)
    }

    pub fn assigned(&self, building: BuildingKind) -> u32 {
        self.assignments.get(&building).copied().unwrap_or(0)
    }

    pub fn total_assigned(&self) -> u32 {
        self.assignments.values().sum()
    }

    pub fn idle_villagers(&self) -> u32 {
        self.villagers().saturating_sub(self.total_assigned())
    }

    pub fn auto_assign_enabled(&self, building: BuildingKind) -> bool {
        self.auto_assign.get(&building).copied().unwrap_or(false)
    }

    pub fn is_queued(&self, building: BuildingKind) -> bool {
        self.queue
            .iter()
            .any(|item| item.kind == QueueKind::Building(building))
    }

    pub fn idle_reason(&self, building: BuildingKind) -> Option<IdleReason> {
        self.idle_reasons.get(&building).copied()
    }

    /// Rescan building levels for housing capacity
    pub fn recompute_housing(&mut self, data: &GameData, housing_multiplier: f64) {
        self.housing_capacity =
            housing_capacity(&self.buildings, &data.buildings, housing_multiplier);
    }

    /// Fill in queue fields missing from older snapshots
    pub fn migrate_legacy_fields(&mut self) {
        for item in &mut self.queue {
            if item.total_ticks <= 0.0 {
                item.total_ticks = item.ticks_remaining.max(1.0);
            }
            if item.count == 0 {
                item.count = 1;
            }
        }
        self.ration_level = self.ration_level.min(3);
        self.approval = self.approval.min(100);
        self.tax_rate = self.tax_rate.min(100);
        if !(0.0..1.0).contains(&self.growth_carry) {
            self.growth_carry = 0.0;
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut settlement: Settlement = serde_json::from_str(json)?;
        settlement.migrate_legacy_fields();
        Ok(settlement)
    }
}
