//! Evolution definitions: eligibility requirements and upgrades.
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::player::{Attribute, EvolutionId, Player, WorkRate, WorkRateSide};

/// A single gate an evolution places on the card it is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// Attribute must be at least `value`.
    Min { attribute: Attribute, value: u8 },
    /// Attribute must be at most `value`.
    Max { attribute: Attribute, value: u8 },
    /// Card may hold at most `count` traits.
    MaxTraits { count: usize },
    /// Card must not hold a plus-trait yet.
    NoPlusTrait,
    /// Card must play at least one of these positions.
    AnyPosition { positions: BTreeSet<String> },
    /// Card must play none of these positions.
    NoPosition { positions: BTreeSet<String> },
    /// Card tier must match exactly.
    Rarity { rarity: String },
}

impl Requirement {
    #[must_use]
    pub fn is_met(&self, player: &Player) -> bool {
        match self {
            Self::Min { attribute, value } => player.rating(*attribute) >= *value,
            Self::Max { attribute, value } => player.rating(*attribute) <= *value,
            Self::MaxTraits { count } => player.traits().len() <= *count,
            Self::NoPlusTrait => player.plus_trait().is_none(),
            Self::AnyPosition { positions } => !positions.is_disjoint(player.positions()),
            Self::NoPosition { positions } => positions.is_disjoint(player.positions()),
            Self::Rarity { rarity } => player.rarity() == rarity,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min { attribute, value } => write!(f, "{attribute} >= {value}"),
            Self::Max { attribute, value } => write!(f, "{attribute} <= {value}"),
            Self::MaxTraits { count } => write!(f, "at most {count} traits"),
            Self::NoPlusTrait => write!(f, "no plus-trait"),
            Self::AnyPosition { positions } => write!(f, "plays {}", join(positions, " or ")),
            Self::NoPosition { positions } => write!(f, "does not play {}", join(positions, ", ")),
            Self::Rarity { rarity } => write!(f, "rarity {rarity}"),
        }
    }
}

/// A single change an evolution makes to a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Upgrade {
    Boost { attribute: Attribute, amount: u8 },
    AddPositions { positions: BTreeSet<String> },
    AddTraits { traits: BTreeSet<String> },
    /// Ignored when the card already holds a plus-trait.
    PlusTrait { plus_trait: String },
    WorkRate { side: WorkRateSide, rate: WorkRate },
    Rarity { rarity: String },
}

impl Upgrade {
    pub fn apply(&self, player: &mut Player) {
        match self {
            Self::Boost { attribute, amount } => player.boost(*attribute, *amount),
            Self::AddPositions { positions } => player.add_positions(positions),
            Self::AddTraits { traits } => player.add_traits(traits),
            Self::PlusTrait { plus_trait } => player.grant_plus_trait(plus_trait),
            Self::WorkRate { side, rate } => player.set_work_rate(*side, *rate),
            Self::Rarity { rarity } => player.set_rarity(rarity),
        }
    }
}

impl fmt::Display for Upgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boost { attribute, amount } => write!(f, "+{amount} {attribute}"),
            Self::AddPositions { positions } => write!(f, "positions {}", join(positions, ", ")),
            Self::AddTraits { traits } => write!(f, "traits {}", join(traits, ", ")),
            Self::PlusTrait { plus_trait } => write!(f, "plus-trait {plus_trait}"),
            Self::WorkRate { side, rate } => match side {
                WorkRateSide::Attacking => write!(f, "attacking work rate {rate}"),
                WorkRateSide::Defensive => write!(f, "defensive work rate {rate}"),
            },
            Self::Rarity { rarity } => write!(f, "rarity {rarity}"),
        }
    }
}

fn join(set: &BTreeSet<String>, sep: &str) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(sep)
}

/// One catalog entry. Immutable once the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evolution {
    pub id: EvolutionId,
    pub name: String,
    /// Acquisition cost in coins.
    pub cost: u32,
    pub requirements: Vec<Requirement>,
    pub upgrades: Vec<Upgrade>,
}

impl Evolution {
    /// Whether this evolution may be applied to `player` right now.
    ///
    /// A lineage never takes the same catalog entry twice, keyed on `id`.
    /// Every requirement is checked against the card's current values.
    #[must_use]
    pub fn is_eligible(&self, player: &Player) -> bool {
        !player.has_applied(&self.id) && self.requirements.iter().all(|req| req.is_met(player))
    }

    /// Produce the evolved card. The input is left untouched.
    ///
    /// No eligibility check happens here; callers gate with
    /// [`Evolution::is_eligible`] first.
    #[must_use]
    pub fn evolve(&self, player: &Player) -> Player {
        let mut evolved = player.clone();
        for upgrade in &self.upgrades {
            upgrade.apply(&mut evolved);
        }
        evolved.record_evolution(self.id.clone());
        log::trace!("{} evolved through {}", evolved.name(), self.id);
        evolved
    }
}

impl fmt::Display for Evolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Ratings;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn winger() -> Player {
        Player::new(
            "Winger",
            Ratings {
                pace: 85,
                shooting: 72,
                passing: 70,
                dribbling: 80,
                defending: 35,
                physical: 60,
                overall: 74,
                skill_moves: 4,
                weak_foot: 3,
            },
        )
        .with_positions(["LM", "LW"])
        .with_traits(["QUICK STEP"])
    }

    fn evolution(id: &str, requirements: Vec<Requirement>, upgrades: Vec<Upgrade>) -> Evolution {
        Evolution {
            id: EvolutionId::new(id),
            name: id.to_string(),
            cost: 0,
            requirements,
            upgrades,
        }
    }

    #[test]
    fn numeric_bounds_use_current_values() {
        let max = Requirement::Max {
            attribute: Attribute::Overall,
            value: 74,
        };
        let min = Requirement::Min {
            attribute: Attribute::Shooting,
            value: 73,
        };
        let mut player = winger();
        assert!(max.is_met(&player));
        assert!(!min.is_met(&player));
        player.boost(Attribute::Overall, 1);
        player.boost(Attribute::Shooting, 1);
        assert!(!max.is_met(&player));
        assert!(min.is_met(&player));
    }

    #[test]
    fn position_requirements_check_intersection() {
        let player = winger();
        assert!(Requirement::AnyPosition { positions: set(&["ST", "LM"]) }.is_met(&player));
        assert!(!Requirement::AnyPosition { positions: set(&["CDM"]) }.is_met(&player));
        assert!(Requirement::NoPosition { positions: set(&["CM"]) }.is_met(&player));
        assert!(!Requirement::NoPosition { positions: set(&["CM", "LW"]) }.is_met(&player));
    }

    #[test]
    fn trait_count_plus_trait_and_rarity_requirements() {
        let player = winger();
        assert!(Requirement::MaxTraits { count: 1 }.is_met(&player));
        assert!(!Requirement::MaxTraits { count: 0 }.is_met(&player));
        assert!(Requirement::NoPlusTrait.is_met(&player));
        let plus = player.clone().with_plus_trait(Some("FINESSE SHOT".to_string()));
        assert!(!Requirement::NoPlusTrait.is_met(&plus));
        assert!(Requirement::Rarity { rarity: "Silver".into() }.is_met(&player));
        assert!(!Requirement::Rarity { rarity: "Gold".into() }.is_met(&player));
    }

    #[test]
    fn evolve_applies_every_upgrade_and_records_id() {
        let evo = evolution(
            "winger_boost",
            vec![],
            vec![
                Upgrade::Boost {
                    attribute: Attribute::Overall,
                    amount: 3,
                },
                Upgrade::Boost {
                    attribute: Attribute::WeakFoot,
                    amount: 4,
                },
                Upgrade::AddPositions {
                    positions: set(&["RM"]),
                },
                Upgrade::AddTraits {
                    traits: set(&["TECHNICAL"]),
                },
                Upgrade::PlusTrait {
                    plus_trait: "RAPID".into(),
                },
                Upgrade::WorkRate {
                    side: WorkRateSide::Defensive,
                    rate: WorkRate::High,
                },
                Upgrade::Rarity {
                    rarity: "Evolutions III".into(),
                },
            ],
        );
        let base = winger();
        let evolved = evo.evolve(&base);

        assert_eq!(evolved.rating(Attribute::Overall), 77);
        assert_eq!(evolved.rating(Attribute::WeakFoot), 5);
        assert!(evolved.positions().contains("RM"));
        assert!(evolved.traits().contains("TECHNICAL"));
        assert_eq!(evolved.plus_trait(), Some("RAPID"));
        assert_eq!(evolved.work_rate(WorkRateSide::Defensive), WorkRate::High);
        assert_eq!(evolved.work_rate(WorkRateSide::Attacking), WorkRate::Medium);
        assert_eq!(evolved.rarity(), "Evolutions III");
        assert_eq!(evolved.evolutions(), &[EvolutionId::new("winger_boost")]);

        assert_eq!(base, winger());
        assert!(!base.is_evolved());
    }

    #[test]
    fn applied_evolution_is_never_eligible_again() {
        let evo = evolution("repeatable_looking", vec![], vec![]);
        let player = winger();
        assert!(evo.is_eligible(&player));
        let evolved = evo.evolve(&player);
        assert!(!evo.is_eligible(&evolved));
    }

    #[test]
    fn shared_display_names_stay_independent() {
        let mut first = evolution("pitch_commander_1", vec![], vec![]);
        let mut second = evolution("pitch_commander_2", vec![], vec![]);
        first.name = "Pitch Commander".into();
        second.name = "Pitch Commander".into();
        let evolved = first.evolve(&winger());
        assert!(!first.is_eligible(&evolved));
        assert!(second.is_eligible(&evolved));
    }

    #[test]
    fn plus_trait_upgrade_keeps_existing_value() {
        let evo = evolution(
            "plus",
            vec![],
            vec![Upgrade::PlusTrait {
                plus_trait: "INTERCEPT".into(),
            }],
        );
        let player = winger().with_plus_trait(Some("TIKI TAKA".into()));
        assert_eq!(evo.evolve(&player).plus_trait(), Some("TIKI TAKA"));
    }

    #[test]
    fn display_formats_rules() {
        let req = Requirement::Max {
            attribute: Attribute::Overall,
            value: 80,
        };
        let upg = Upgrade::Boost {
            attribute: Attribute::Overall,
            amount: 5,
        };
        assert_eq!(req.to_string(), "ovr <= 80");
        assert_eq!(upg.to_string(), "+5 ovr");
    }
}
