pub mod config;
pub mod error;
pub mod types;

pub use config::SimulationConfig;
pub use error::{Result, SettlementError};
pub use types::{ActionResult, BuildingKind, Cost, ResourceKind, Seconds, UnitKind};
