//! Production rates - define what each building produces and consumes
//!
//! A producer is a (building, output resource) pair. Simple producers
//! extract a raw resource; processing producers convert one or more inputs
//! at a fixed ratio (input units per output unit).

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SettlementError};
use crate::core::types::{BuildingKind, ResourceKind};

const DEFAULT_WORKER_EXPONENT: f64 = 0.9;
const DEFAULT_LEVEL_GROWTH: f64 = 1.2;

/// A single producer definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerSpec {
    pub building: BuildingKind,
    pub output: ResourceKind,
    /// Output per worker-second at level 1
    pub base_rate: f64,
    /// Diminishing returns on workers (< 1.0)
    pub worker_exponent: f64,
    /// Output multiplier per level above 1
    pub level_growth: f64,
    /// Required inputs: resource and units consumed per unit of output
    pub inputs: Vec<(ResourceKind, f64)>,
    /// Produces from building level alone, without workers
    pub level_scaled: bool,
}

impl ProducerSpec {
    /// A simple extraction producer with default exponents
    pub fn simple(building: BuildingKind, output: ResourceKind, base_rate: f64) -> Self {
        Self {
            building,
            output,
            base_rate,
            worker_exponent: DEFAULT_WORKER_EXPONENT,
            level_growth: DEFAULT_LEVEL_GROWTH,
            inputs: Vec::new(),
            level_scaled: false,
        }
    }

    pub fn with_input(mut self, resource: ResourceKind, ratio: f64) -> Self {
        self.inputs.push((resource, ratio));
        self
    }

    pub fn level_scaled(mut self) -> Self {
        self.level_scaled = true;
        self
    }

    pub fn is_processing(&self) -> bool {
        !self.inputs.is_empty()
    }

    /// Uncapped output for an interval
    ///
    /// Formula: base_rate * max(1, workers)^worker_exponent
    ///          * level_growth^(level - 1) * elapsed * global_multiplier
    pub fn potential(&self, workers: u32, level: u32, elapsed: f64, global_multiplier: f64) -> f64 {
        if level == 0 {
            return 0.0;
        }
        let workforce = (workers.max(1) as f64).powf(self.worker_exponent);
        let level_factor = self.level_growth.powi(level as i32 - 1);
        self.base_rate * workforce * level_factor * elapsed * global_multiplier
    }
}

/// Ordered catalog of producers
///
/// Order matters: producers of the same resource claim storage headroom
/// in catalog order.
#[derive(Debug, Clone, Default)]
pub struct ProductionRates {
    producers: Vec<ProducerSpec>,
}

impl ProductionRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default producer table
    pub fn with_defaults() -> Self {
        use BuildingKind as B;
        use ResourceKind as R;

        let mut rates = Self::new();
        rates.add(ProducerSpec::simple(B::Woodcutter, R::Timber, 0.045));
        rates.add(ProducerSpec::simple(B::Quarry, R::Stone, 0.035));
        rates.add(ProducerSpec::simple(B::Farm, R::Grain, 0.05));
        rates.add(ProducerSpec::simple(B::Fishery, R::Fish, 0.03));
        rates.add(ProducerSpec::simple(B::HuntingLodge, R::Meat, 0.02));
        rates.add(ProducerSpec::simple(B::Mine, R::IronOre, 0.025));
        rates.add(ProducerSpec::simple(B::GoldMine, R::Gold, 0.01));
        rates.add(ProducerSpec::simple(B::TownHall, R::Gold, 0.002).level_scaled());
        rates.add(ProducerSpec::simple(B::Mill, R::Flour, 0.02).with_input(R::Grain, 2.0));
        rates.add(
            ProducerSpec::simple(B::Bakery, R::Bread, 0.015)
                .with_input(R::Flour, 1.0)
                .with_input(R::Timber, 0.5),
        );
        rates.add(
            ProducerSpec::simple(B::Smelter, R::Iron, 0.01)
                .with_input(R::IronOre, 2.0)
                .with_input(R::Timber, 1.0),
        );
        rates
    }

    pub fn add(&mut self, producer: ProducerSpec) {
        self.producers.push(producer);
    }

    pub fn all(&self) -> &[ProducerSpec] {
        &self.producers
    }

    /// Load producers from a TOML file
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse producers from TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let toml_data: TomlProducers =
            toml::from_str(content).map_err(|e| SettlementError::TomlParse(e.to_string()))?;

        let mut rates = Self::new();
        for producer in toml_data.producers {
            rates.add(producer.into_spec()?);
        }
        Ok(rates)
    }
}

/// TOML representation of the producer file
#[derive(Debug, Deserialize)]
struct TomlProducers {
    producers: Vec<TomlProducer>,
}

#[derive(Debug, Deserialize)]
struct TomlProducer {
    building: String,
    output: String,
    base_rate: f64,
    #[serde(default)]
    worker_exponent: Option<f64>,
    #[serde(default)]
    level_growth: Option<f64>,
    #[serde(default)]
    level_scaled: bool,
    #[serde(default)]
    inputs: Vec<TomlInput>,
}

#[derive(Debug, Deserialize)]
struct TomlInput {
    resource: String,
    ratio: f64,
}

impl TomlProducer {
    fn into_spec(self) -> Result<ProducerSpec> {
        let building: BuildingKind = self.building.parse()?;
        let output: ResourceKind = self.output.parse()?;

        if self.base_rate < 0.0 {
            return Err(SettlementError::InvalidConfig(format!(
                "{:?} has negative base_rate",
                building
            )));
        }

        let inputs = self
            .inputs
            .into_iter()
            .map(|input| {
                if input.ratio <= 0.0 {
                    return Err(SettlementError::InvalidConfig(format!(
                        "{:?} input {} needs a positive ratio",
                        building, input.resource
                    )));
                }
                Ok((input.resource.parse::<ResourceKind>()?, input.ratio))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ProducerSpec {
            building,
            output,
            base_rate: self.base_rate,
            worker_exponent: self.worker_exponent.unwrap_or(DEFAULT_WORKER_EXPONENT),
            level_growth: self.level_growth.unwrap_or(DEFAULT_LEVEL_GROWTH),
            inputs,
            level_scaled: self.level_scaled,
        })
    }
}
