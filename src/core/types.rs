//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::core::error::SettlementError;

/// Simulation time in seconds
pub type Seconds = f64;

/// Whole-unit resource amounts, used for costs and refunds
pub type Cost = BTreeMap<ResourceKind, u32>;

/// Stored resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Timber,
    Stone,
    Grain,
    Fish,
    Meat,
    Flour,
    Bread,
    IronOre,
    Iron,
    Gold,
}

/// Resource classes whose storage can be switched off per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Gold,
    Ore,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::Timber,
        ResourceKind::Stone,
        ResourceKind::Grain,
        ResourceKind::Fish,
        ResourceKind::Meat,
        ResourceKind::Flour,
        ResourceKind::Bread,
        ResourceKind::IronOre,
        ResourceKind::Iron,
        ResourceKind::Gold,
    ];

    /// Edible resources in the order they are drained
    pub const FOODS: [ResourceKind; 4] = [
        ResourceKind::Grain,
        ResourceKind::Fish,
        ResourceKind::Meat,
        ResourceKind::Bread,
    ];

    /// Sustenance provided by one unit of this resource (0 for non-food)
    pub fn sustenance(&self) -> f64 {
        match self {
            ResourceKind::Grain => 1.0,
            ResourceKind::Fish => 1.5,
            ResourceKind::Meat => 2.0,
            ResourceKind::Bread => 3.0,
            _ => 0.0,
        }
    }

    pub fn is_food(&self) -> bool {
        self.sustenance() > 0.0
    }

    pub fn storage_class(&self) -> Option<StorageClass> {
        match self {
            ResourceKind::Gold => Some(StorageClass::Gold),
            ResourceKind::IronOre => Some(StorageClass::Ore),
            _ => None,
        }
    }
}

impl FromStr for ResourceKind {
    type Err = SettlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_lowercase().as_str() {
            "timber" | "wood" => ResourceKind::Timber,
            "stone" => ResourceKind::Stone,
            "grain" => ResourceKind::Grain,
            "fish" => ResourceKind::Fish,
            "meat" => ResourceKind::Meat,
            "flour" => ResourceKind::Flour,
            "bread" => ResourceKind::Bread,
            "ironore" | "iron_ore" | "ore" => ResourceKind::IronOre,
            "iron" => ResourceKind::Iron,
            "gold" => ResourceKind::Gold,
            _ => return Err(SettlementError::UnknownId(s.to_string())),
        };
        Ok(kind)
    }
}

/// Building types a settlement can level up
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    TownHall,
    House,
    Storehouse,
    Woodcutter,
    Quarry,
    Farm,
    Fishery,
    HuntingLodge,
    Mill,
    Bakery,
    Mine,
    Smelter,
    GoldMine,
    Barracks,
}

impl BuildingKind {
    /// Canonical iteration order
    pub const ALL: [BuildingKind; 14] = [
        BuildingKind::TownHall,
        BuildingKind::House,
        BuildingKind::Storehouse,
        BuildingKind::Woodcutter,
        BuildingKind::Quarry,
        BuildingKind::Farm,
        BuildingKind::Fishery,
        BuildingKind::HuntingLodge,
        BuildingKind::Mill,
        BuildingKind::Bakery,
        BuildingKind::Mine,
        BuildingKind::Smelter,
        BuildingKind::GoldMine,
        BuildingKind::Barracks,
    ];
}

impl FromStr for BuildingKind {
    type Err = SettlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_lowercase().replace(['_', ' '], "").as_str() {
            "townhall" => BuildingKind::TownHall,
            "house" => BuildingKind::House,
            "storehouse" => BuildingKind::Storehouse,
            "woodcutter" => BuildingKind::Woodcutter,
            "quarry" => BuildingKind::Quarry,
            "farm" => BuildingKind::Farm,
            "fishery" => BuildingKind::Fishery,
            "huntinglodge" => BuildingKind::HuntingLodge,
            "mill" => BuildingKind::Mill,
            "bakery" => BuildingKind::Bakery,
            "mine" => BuildingKind::Mine,
            "smelter" => BuildingKind::Smelter,
            "goldmine" => BuildingKind::GoldMine,
            "barracks" => BuildingKind::Barracks,
            _ => return Err(SettlementError::UnknownId(s.to_string())),
        };
        Ok(kind)
    }
}

/// Unit types held by a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Villager,
    Militia,
    Archer,
    Scout,
}

impl UnitKind {
    pub const ALL: [UnitKind; 4] = [
        UnitKind::Villager,
        UnitKind::Militia,
        UnitKind::Archer,
        UnitKind::Scout,
    ];
}

impl FromStr for UnitKind {
    type Err = SettlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_lowercase().as_str() {
            "villager" => UnitKind::Villager,
            "militia" => UnitKind::Militia,
            "archer" => UnitKind::Archer,
            "scout" => UnitKind::Scout,
            _ => return Err(SettlementError::UnknownId(s.to_string())),
        };
        Ok(kind)
    }
}

/// Outcome of a player-issued request
///
/// User errors (not enough resources, bad counts) are reported here instead
/// of being raised, so they never abort a tick loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Round a resource amount to the 1e-6 grid
pub fn round_amount(value: f64) -> f64 {
    const EPSILON: f64 = 1e-6;
    (value / EPSILON).round() * EPSILON
}
