//! Stockpile - settlement-level resource storage
//!
//! Amounts are continuous and kept on a 1e-6 grid. Capacity is not stored
//! here; it is derived each tick by `city::storage`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::{round_amount, Cost, ResourceKind};

/// Resources held by a settlement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stockpile {
    amounts: BTreeMap<ResourceKind, f64>,
}

impl Stockpile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current amount of a resource
    pub fn get(&self, resource: ResourceKind) -> f64 {
        self.amounts.get(&resource).copied().unwrap_or(0.0)
    }

    /// Overwrite the amount of a resource (clamped at zero)
    pub fn set(&mut self, resource: ResourceKind, amount: f64) {
        self.amounts.insert(resource, round_amount(amount.max(0.0)));
    }

    /// Add resources without a capacity check
    pub fn add(&mut self, resource: ResourceKind, amount: f64) {
        let current = self.get(resource);
        self.set(resource, current + amount);
    }

    /// Try to remove resources, returns amount actually removed
    pub fn remove(&mut self, resource: ResourceKind, amount: f64) -> f64 {
        let current = self.get(resource);
        let removed = amount.max(0.0).min(current);
        self.set(resource, current - removed);
        removed
    }

    /// Check if stockpile has enough of all required materials
    pub fn has_materials(&self, requirements: &Cost) -> bool {
        requirements
            .iter()
            .all(|(res, amount)| self.get(*res) + 1e-9 >= *amount as f64)
    }

    /// Resources missing for a cost, for user-facing messages
    pub fn shortfall(&self, requirements: &Cost) -> Vec<(ResourceKind, f64)> {
        requirements
            .iter()
            .filter_map(|(res, amount)| {
                let missing = *amount as f64 - self.get(*res);
                (missing > 1e-9).then_some((*res, missing))
            })
            .collect()
    }

    /// Consume materials, returns true if successful
    ///
    /// Nothing is deducted unless every requirement is met.
    pub fn consume_materials(&mut self, requirements: &Cost) -> bool {
        if !self.has_materials(requirements) {
            return false;
        }
        for (res, amount) in requirements {
            self.remove(*res, *amount as f64);
        }
        true
    }

    /// Return materials (refunds, mission loot bypassing storage)
    pub fn refund(&mut self, amounts: &Cost) {
        for (res, amount) in amounts {
            self.add(*res, *amount as f64);
        }
    }

    /// Clamp every entry at zero and re-round
    pub fn normalize(&mut self) {
        for amount in self.amounts.values_mut() {
            *amount = round_amount(amount.max(0.0));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, f64)> + '_ {
        self.amounts.iter().map(|(k, v)| (*k, *v))
    }
}
