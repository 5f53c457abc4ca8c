//! Simulation layer - population, approval, missions and the tick

pub mod approval;
pub mod context;
pub mod missions;
pub mod population;
pub mod tick;

pub use approval::{recompute_approval, set_ration_level, set_tax_rate};
pub use context::{MissionHandler, MissionOutcome, ResearchModifiers, TickContext};
pub use missions::{advance_missions, dispatch_mission};
pub use population::{tick_population, PopulationInput, PopulationOutcome};
pub use tick::{tick, tick_all};
