//! Reference data bundle shared by every settlement
//!
//! Loaded once at startup and passed by reference into the simulation.
//! There is no mutation API once installed.

use ahash::AHashMap;
use std::sync::OnceLock;

use crate::city::building::BuildingTable;
use crate::city::recipe::ProductionRates;
use crate::city::units::UnitTable;
use crate::core::types::ResourceKind;

#[derive(Debug, Clone)]
pub struct GameData {
    pub buildings: BuildingTable,
    pub production: ProductionRates,
    pub units: UnitTable,
    /// Level-0 storage capacity per resource
    pub storage_base: AHashMap<ResourceKind, f64>,
}

impl GameData {
    pub fn with_defaults() -> Self {
        Self {
            buildings: BuildingTable::with_defaults(),
            production: ProductionRates::with_defaults(),
            units: UnitTable::with_defaults(),
            storage_base: default_storage_base(),
        }
    }

    /// Same tables with a different producer catalog
    pub fn with_production(mut self, production: ProductionRates) -> Self {
        self.production = production;
        self
    }

    pub fn storage_base(&self, resource: ResourceKind) -> f64 {
        self.storage_base.get(&resource).copied().unwrap_or(0.0)
    }
}

impl Default for GameData {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn default_storage_base() -> AHashMap<ResourceKind, f64> {
    use ResourceKind::*;
    [
        (Timber, 500.0),
        (Stone, 500.0),
        (Grain, 400.0),
        (Fish, 300.0),
        (Meat, 300.0),
        (Flour, 200.0),
        (Bread, 200.0),
        (IronOre, 200.0),
        (Iron, 100.0),
        (Gold, 1000.0),
    ]
    .into_iter()
    .collect()
}

static GAME_DATA: OnceLock<GameData> = OnceLock::new();

/// Get the process-wide reference data (defaults if never set)
pub fn game_data() -> &'static GameData {
    GAME_DATA.get_or_init(GameData::with_defaults)
}

/// Install reference data at startup (can only be called once)
pub fn set_game_data(data: GameData) -> Result<(), GameData> {
    GAME_DATA.set(data)
}
