//! Per-tick context supplied by the caller
//!
//! Carries storage gates, research modifiers and the optional mission
//! resolvers. A missing resolver is valid: the mission's units just come
//! home.

use std::collections::BTreeMap;

use crate::city::settlement::{Mission, MissionKind};
use crate::city::storage::StorageGates;
use crate::core::types::{ResourceKind, UnitKind};

/// Research bonuses, all multiplicative (1.0 = none)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResearchModifiers {
    pub growth_multiplier: f64,
    pub timer_multiplier: f64,
    pub housing_multiplier: f64,
}

impl Default for ResearchModifiers {
    fn default() -> Self {
        Self {
            growth_multiplier: 1.0,
            timer_multiplier: 1.0,
            housing_multiplier: 1.0,
        }
    }
}

/// What came back from a mission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissionOutcome {
    pub surviving_units: BTreeMap<UnitKind, u32>,
    pub loot: BTreeMap<ResourceKind, f64>,
    pub captives: u32,
}

impl MissionOutcome {
    /// Everyone returns, nothing gained
    pub fn unharmed(mission: &Mission) -> Self {
        Self {
            surviving_units: mission.units.clone(),
            ..Default::default()
        }
    }
}

/// Resolves a completed mission (battle, expedition, scouting)
pub trait MissionHandler: Sync {
    fn resolve(&self, mission: &Mission) -> MissionOutcome;
}

impl<F> MissionHandler for F
where
    F: Fn(&Mission) -> MissionOutcome + Sync,
{
    fn resolve(&self, mission: &Mission) -> MissionOutcome {
        self(mission)
    }
}

#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    pub allow_gold_storage: bool,
    pub allow_ore_storage: bool,
    pub research: ResearchModifiers,
    pub attack: Option<&'a dyn MissionHandler>,
    pub expedition: Option<&'a dyn MissionHandler>,
    pub scout: Option<&'a dyn MissionHandler>,
}

impl Default for TickContext<'_> {
    fn default() -> Self {
        Self {
            allow_gold_storage: true,
            allow_ore_storage: true,
            research: ResearchModifiers::default(),
            attack: None,
            expedition: None,
            scout: None,
        }
    }
}

impl<'a> TickContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_research(mut self, research: ResearchModifiers) -> Self {
        self.research = research;
        self
    }

    pub fn with_handler(mut self, kind: MissionKind, handler: &'a dyn MissionHandler) -> Self {
        match kind {
            MissionKind::Attack => self.attack = Some(handler),
            MissionKind::Expedition => self.expedition = Some(handler),
            MissionKind::Scout => self.scout = Some(handler),
        }
        self
    }

    pub fn gates(&self) -> StorageGates {
        StorageGates {
            allow_gold: self.allow_gold_storage,
            allow_ore: self.allow_ore_storage,
        }
    }

    pub fn handler(&self, kind: MissionKind) -> Option<&'a dyn MissionHandler> {
        match kind {
            MissionKind::Attack => self.attack,
            MissionKind::Expedition => self.expedition,
            MissionKind::Scout => self.scout,
        }
    }
}

impl std::fmt::Debug for TickContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickContext")
            .field("allow_gold_storage", &self.allow_gold_storage)
            .field("allow_ore_storage", &self.allow_ore_storage)
            .field("research", &self.research)
            .field("attack", &self.attack.is_some())
            .field("expedition", &self.expedition.is_some())
            .field("scout", &self.scout.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context_allows_storage_and_has_no_handlers() {
        let ctx = TickContext::default();
        assert_eq!(ctx.gates(), StorageGates::default());
        assert!(ctx.handler(MissionKind::Attack).is_none());
        assert_eq!(ctx.research.housing_multiplier, 1.0);
    }

    #[test]
    fn test_closure_handler_slot() {
        let loot = |_: &Mission| MissionOutcome {
            captives: 3,
            ..Default::default()
        };
        let ctx = TickContext::new().with_handler(MissionKind::Expedition, &loot);
        let mission = Mission {
            id: 0,
            kind: MissionKind::Expedition,
            target: "Ruins".into(),
            units: BTreeMap::new(),
            seconds_remaining: 0.0,
        };

        assert!(ctx.handler(MissionKind::Attack).is_none());
        let outcome = ctx.handler(MissionKind::Expedition).unwrap().resolve(&mission);
        assert_eq!(outcome.captives, 3);
    }
}
