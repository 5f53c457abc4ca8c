//! Simulation configuration with documented constants
//!
//! All balance numbers used by the tick pipeline are collected here with
//! notes on how they interact. Reference tables (buildings, producers,
//! units) live in `city::data`.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SettlementError};

/// Balance constants for the settlement tick
///
/// Every field has a default; TOML overrides only need to name the
/// fields they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === PRODUCTION ===
    /// Multiplier applied to every producer's output
    ///
    /// At 5.0 a level-1 woodcutter with one worker yields
    /// 0.045 * 5.0 = 0.225 timber per second.
    pub global_production_multiplier: f64,

    /// Per-level growth of storage capacity
    ///
    /// Capacity is `storage_base * storage_multiplier ^ storehouse_level`.
    pub storage_multiplier: f64,

    /// Storage is never allowed to drop below this fraction of the next
    /// storehouse upgrade cost, so the upgrade is always affordable.
    pub storage_upgrade_headroom: f64,

    /// Gold paid per citizen per second at 100% tax
    pub tax_gold_per_citizen_per_second: f64,

    // === SUSTENANCE ===
    /// Sustenance eaten by one citizen per second (1 per hour)
    pub sustenance_per_citizen_per_second: f64,

    /// Sustenance eaten by one captive per second
    pub sustenance_per_captive_per_second: f64,

    /// Food need multiplier per ration level 0..=3
    pub ration_multipliers: [f64; 4],

    // === POPULATION ===
    /// Fraction of the population lost per hour to starvation
    ///
    /// Scaled by the unmet fraction of food need when partially fed.
    pub starvation_rate_per_hour: f64,

    /// Fraction of the population leaving per hour at zero approval
    pub emigration_rate_per_hour: f64,

    /// Fraction of captives lost per hour
    pub captive_morbidity_per_hour: f64,

    /// Citizens per hour per town hall level at 100% approval
    pub growth_per_town_hall_level: f64,

    /// World-wide growth multiplier
    pub global_pop_growth_multiplier: f64,

    /// Minimum growth per hour while well fed (ration >= 2)
    ///
    /// A balance floor so small villages do not stall. Tune freely.
    pub min_fed_growth_per_hour: f64,

    // === APPROVAL ===
    /// Maximum approval change per recomputation
    pub approval_step: u8,

    /// Approval target before modifiers
    pub approval_base: i32,

    /// Approval modifier per ration level 0..=3
    pub ration_approval: [i32; 4],

    /// Approval penalty while the settlement starves
    pub starvation_approval_penalty: i32,

    /// Approval penalty while housing is full
    pub crowding_approval_penalty: i32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            global_production_multiplier: 5.0,
            storage_multiplier: 1.3,
            storage_upgrade_headroom: 1.05,
            tax_gold_per_citizen_per_second: 0.001,

            sustenance_per_citizen_per_second: 1.0 / 3600.0,
            sustenance_per_captive_per_second: 0.5 / 3600.0,
            ration_multipliers: [0.0, 0.5, 1.0, 2.0],

            starvation_rate_per_hour: 0.01,
            emigration_rate_per_hour: 0.01,
            captive_morbidity_per_hour: 0.02,
            growth_per_town_hall_level: 0.1,
            global_pop_growth_multiplier: 1.0,
            min_fed_growth_per_hour: 5.0,

            approval_step: 2,
            approval_base: 70,
            ration_approval: [-30, -10, 0, 10],
            starvation_approval_penalty: 20,
            crowding_approval_penalty: 10,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML, falling back to defaults for missing fields
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: SimulationConfig =
            toml::from_str(content).map_err(|e| SettlementError::TomlParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.global_production_multiplier < 0.0 {
            return Err(SettlementError::InvalidConfig(
                "global_production_multiplier must not be negative".into(),
            ));
        }

        if self.storage_multiplier < 1.0 {
            return Err(SettlementError::InvalidConfig(format!(
                "storage_multiplier ({}) must be >= 1.0",
                self.storage_multiplier
            )));
        }

        if self.ration_multipliers.iter().any(|m| *m < 0.0) {
            return Err(SettlementError::InvalidConfig(
                "ration multipliers must not be negative".into(),
            ));
        }

        let rates = [
            self.starvation_rate_per_hour,
            self.emigration_rate_per_hour,
            self.captive_morbidity_per_hour,
        ];
        if rates.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return Err(SettlementError::InvalidConfig(
                "loss rates must be within 0.0..=1.0".into(),
            ));
        }

        if self.approval_step == 0 {
            return Err(SettlementError::InvalidConfig(
                "approval_step must be positive".into(),
            ));
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<SimulationConfig> = OnceLock::new();

/// Get the global simulation config (initializes with defaults if not set)
pub fn config() -> &'static SimulationConfig {
    CONFIG.get_or_init(SimulationConfig::default)
}

/// Set the global simulation config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: SimulationConfig) -> std::result::Result<(), SimulationConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_override() {
        let config = SimulationConfig::parse_toml(
            r#"
global_production_multiplier = 2.5
min_fed_growth_per_hour = 0.0
"#,
        )
        .expect("Should parse partial config");

        assert!((config.global_production_multiplier - 2.5).abs() < 1e-9);
        assert_eq!(config.min_fed_growth_per_hour, 0.0);
        // Untouched fields keep defaults
        assert_eq!(config.approval_step, 2);
        assert_eq!(config.ration_multipliers, [0.0, 0.5, 1.0, 2.0]);
    }

    #[test]
    fn test_invalid_storage_multiplier_rejected() {
        let result = SimulationConfig::parse_toml("storage_multiplier = 0.5");
        assert!(matches!(result, Err(SettlementError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = SimulationConfig::parse_toml("global_production_multiplier = [");
        assert!(matches!(result, Err(SettlementError::TomlParse(_))));
    }
}
