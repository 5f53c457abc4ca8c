//! Building reference data - growth, cost, build time, workforce, housing

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{BuildingKind, Cost, ResourceKind};

/// What a building is for; storage and housing are never staffed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingTag {
    Production,
    Housing,
    Storage,
    Military,
}

/// Immutable per-building configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSpec {
    /// Cost and build time multiply by this per level
    pub growth_factor: f64,
    /// Level-0 upgrade cost
    pub base_cost: Cost,
    /// Level-0 build time in seconds
    pub base_seconds: u32,
    /// Workforce slots per level
    pub workers_per_level: u32,
    /// Housing provided per level
    pub housing_per_level: u32,
    pub tag: BuildingTag,
    pub max_level: u32,
}

impl BuildingSpec {
    /// Maximum workers this building can employ at a level
    pub fn max_workforce(&self, level: u32) -> u32 {
        self.workers_per_level * level
    }

    /// Storage and housing buildings have no workforce
    pub fn is_staffable(&self) -> bool {
        matches!(self.tag, BuildingTag::Production | BuildingTag::Military)
            && self.workers_per_level > 0
    }
}

/// Lookup table of building specs
#[derive(Debug, Clone, Default)]
pub struct BuildingTable {
    specs: AHashMap<BuildingKind, BuildingSpec>,
}

fn cost(entries: &[(ResourceKind, u32)]) -> Cost {
    entries.iter().copied().collect()
}

impl BuildingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default building balance
    pub fn with_defaults() -> Self {
        use BuildingKind::*;
        use BuildingTag::*;
        use ResourceKind::{Stone, Timber};

        let mut table = Self::new();
        let rows: [(BuildingKind, f64, Cost, u32, u32, u32, BuildingTag, u32); 14] = [
            (TownHall, 1.5, cost(&[(Timber, 200), (Stone, 150)]), 300, 0, 15, Housing, 25),
            (House, 1.3, cost(&[(Timber, 60)]), 90, 0, 10, Housing, 30),
            (Storehouse, 1.35, cost(&[(Timber, 80), (Stone, 60)]), 120, 0, 0, Storage, 30),
            (Woodcutter, 1.25, cost(&[(Timber, 40)]), 60, 5, 0, Production, 30),
            (Quarry, 1.25, cost(&[(Timber, 50)]), 60, 5, 0, Production, 30),
            (Farm, 1.25, cost(&[(Timber, 45)]), 60, 6, 0, Production, 30),
            (Fishery, 1.25, cost(&[(Timber, 55)]), 75, 4, 0, Production, 30),
            (HuntingLodge, 1.25, cost(&[(Timber, 50)]), 75, 3, 0, Production, 30),
            (Mill, 1.4, cost(&[(Timber, 120), (Stone, 80)]), 180, 3, 0, Production, 25),
            (Bakery, 1.4, cost(&[(Timber, 100), (Stone, 100)]), 180, 3, 0, Production, 25),
            (Mine, 1.4, cost(&[(Timber, 150)]), 240, 4, 0, Production, 25),
            (Smelter, 1.6, cost(&[(Stone, 200), (Timber, 150)]), 300, 3, 0, Production, 20),
            (GoldMine, 1.6, cost(&[(Timber, 250), (Stone, 250)]), 360, 2, 0, Production, 20),
            (Barracks, 1.5, cost(&[(Timber, 150), (Stone, 120)]), 240, 0, 0, Military, 20),
        ];

        for (kind, growth_factor, base_cost, base_seconds, workers, housing, tag, max_level) in
            rows
        {
            table.insert(
                kind,
                BuildingSpec {
                    growth_factor,
                    base_cost,
                    base_seconds,
                    workers_per_level: workers,
                    housing_per_level: housing,
                    tag,
                    max_level,
                },
            );
        }

        table
    }

    pub fn insert(&mut self, kind: BuildingKind, spec: BuildingSpec) {
        self.specs.insert(kind, spec);
    }

    pub fn get(&self, kind: BuildingKind) -> Option<&BuildingSpec> {
        self.specs.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Sum housing over all building levels, scaled by research
///
/// Full rescan each call; building counts are small.
pub fn housing_capacity<'a>(
    levels: impl IntoIterator<Item = (&'a BuildingKind, &'a u32)>,
    table: &BuildingTable,
    housing_multiplier: f64,
) -> u32 {
    let base: u32 = levels
        .into_iter()
        .filter_map(|(kind, level)| table.get(*kind).map(|spec| spec.housing_per_level * level))
        .sum();
    (base as f64 * housing_multiplier).floor().max(0.0) as u32
}
