//! Unit reference data - recruitment cost and training time

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Cost, ResourceKind, UnitKind};

/// Immutable per-unit recruitment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    /// Cost of a single unit
    pub cost: Cost,
    /// Seconds to train a single unit
    pub train_seconds: u32,
}

/// Trainable units. Villagers come from population growth and have no entry.
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    specs: AHashMap<UnitKind, UnitSpec>,
}

impl UnitTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.insert(
            UnitKind::Militia,
            UnitSpec {
                cost: [
                    (ResourceKind::Timber, 20),
                    (ResourceKind::Iron, 5),
                    (ResourceKind::Gold, 10),
                ]
                .into_iter()
                    .collect(),
                train_seconds: 120,
            },
        );
        table.insert(
            UnitKind::Archer,
            UnitSpec {
                cost: [(ResourceKind::Timber, 40), (ResourceKind::Gold, 15)].into_iter().collect(),
                train_seconds: 150,
            },
        );
        table.insert(
            UnitKind::Scout,
            UnitSpec {
                cost: [(ResourceKind::Grain, 20), (ResourceKind::Gold, 20)].into_iter().collect(),
                train_seconds: 90,
            },
        );
        table
    }

    pub fn insert(&mut self, kind: UnitKind, spec: UnitSpec) {
        self.specs.insert(kind, spec);
    }

    pub fn get(&self, kind: UnitKind) -> Option<&UnitSpec> {
        self.specs.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_villagers_are_not_trainable() {
        let table = UnitTable::with_defaults();
        assert!(table.get(UnitKind::Villager).is_none());
        assert!(table.get(UnitKind::Militia).is_some());
    }
}
