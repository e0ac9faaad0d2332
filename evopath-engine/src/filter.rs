//! Acceptance criteria applied to terminal cards.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::constants::NO_PLUS_TRAIT_MARKER;
use crate::player::{Attribute, EvolutionId, Player, WorkRate, WorkRateSide};

/// Caller-supplied conditions a finished card must satisfy.
///
/// Every field is optional and an unset field places no constraint. Set
/// fields (`evolutions`, `positions`, `traits`) need a non-empty overlap with
/// the card; supplying an empty set therefore rejects every card. A
/// `plus_trait` of `None` (any case) asks for cards without a plus-trait.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchFilter {
    /// Substring of the card name.
    pub name: Option<String>,
    /// At least one of these evolutions must be in the trail.
    pub evolutions: Option<BTreeSet<EvolutionId>>,
    /// Per-attribute minimums.
    pub min: BTreeMap<Attribute, u8>,
    pub positions: Option<BTreeSet<String>>,
    pub traits: Option<BTreeSet<String>>,
    pub plus_trait: Option<String>,
    pub attacking_work_rate: Option<WorkRate>,
    pub defensive_work_rate: Option<WorkRate>,
}

impl SearchFilter {
    /// Load a filter from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or names an unknown field.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_min(mut self, attribute: Attribute, value: u8) -> Self {
        self.min.insert(attribute, value);
        self
    }

    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `player` satisfies every configured criterion.
    #[must_use]
    pub fn matches(&self, player: &Player) -> bool {
        if let Some(name) = &self.name
            && !player.name().contains(name.as_str())
        {
            return false;
        }

        if let Some(wanted) = &self.evolutions
            && !player.evolutions().iter().any(|id| wanted.contains(id))
        {
            return false;
        }

        if self
            .min
            .iter()
            .any(|(&attribute, &min)| player.rating(attribute) < min)
        {
            return false;
        }

        if let Some(wanted) = &self.positions
            && wanted.is_disjoint(player.positions())
        {
            return false;
        }

        if let Some(wanted) = &self.traits
            && wanted.is_disjoint(player.traits())
        {
            return false;
        }

        if let Some(plus_trait) = &self.plus_trait {
            let plus_trait = plus_trait.trim();
            let wanted = (!plus_trait.eq_ignore_ascii_case(NO_PLUS_TRAIT_MARKER))
                .then_some(plus_trait);
            if player.plus_trait() != wanted {
                return false;
            }
        }

        if let Some(rate) = self.attacking_work_rate
            && player.work_rate(WorkRateSide::Attacking) != rate
        {
            return false;
        }

        if let Some(rate) = self.defensive_work_rate
            && player.work_rate(WorkRateSide::Defensive) != rate
        {
            return false;
        }

        true
    }
}
