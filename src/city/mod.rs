//! City layer - buildings, storage, production, construction and workers

pub mod assignment;
pub mod building;
pub mod construction;
pub mod cost;
pub mod data;
pub mod production;
pub mod recipe;
pub mod settlement;
pub mod stockpile;
pub mod storage;
pub mod units;

pub use assignment::{assign_workers, auto_assign_workers, release_excess_workers, set_auto_assign};
pub use building::{BuildingSpec, BuildingTable, BuildingTag};
pub use construction::{
    advance_queue, cancel_queue_item, start_construction, start_recruitment, QueueProgress,
};
pub use cost::{build_time, upgrade_cost};
pub use data::{game_data, set_game_data, GameData};
pub use production::{resolve_production, ProducerRecord};
pub use recipe::{ProducerSpec, ProductionRates};
pub use settlement::{
    IdleReason, Mission, MissionKind, QueueItem, QueueKind, Settlement, SettlementEvent,
};
pub use stockpile::Stockpile;
pub use storage::{allocate, capacities, storage_capacity, AllocationReport, StorageGates};
pub use units::{UnitSpec, UnitTable};
