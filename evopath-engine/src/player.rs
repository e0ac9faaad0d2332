//! Player card model: capped ratings, categorical tags and the evolution trail.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{
    GOLD_MIN_OVERALL, MAX_RATING, MAX_STARS, RARITY_BRONZE, RARITY_GOLD, RARITY_SILVER,
    SILVER_MIN_OVERALL,
};

/// Stable identifier of a catalog evolution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvolutionId(String);

impl EvolutionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EvolutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EvolutionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Applied evolutions in the order they happened.
pub type Trail = SmallVec<[EvolutionId; 4]>;

/// Numeric attributes an evolution can gate on or boost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    #[serde(alias = "pac")]
    Pace,
    #[serde(alias = "sho")]
    Shooting,
    #[serde(alias = "pas")]
    Passing,
    #[serde(alias = "dri")]
    Dribbling,
    #[serde(alias = "def")]
    Defending,
    #[serde(alias = "phy")]
    Physical,
    #[serde(alias = "ovr")]
    Overall,
    #[serde(alias = "skills")]
    SkillMoves,
    #[serde(alias = "wf")]
    WeakFoot,
}

impl Attribute {
    pub const ALL: &'static [Self] = &[
        Self::Pace,
        Self::Shooting,
        Self::Passing,
        Self::Dribbling,
        Self::Defending,
        Self::Physical,
        Self::Overall,
        Self::SkillMoves,
        Self::WeakFoot,
    ];

    /// Short key used by catalogs and roster headers.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Pace => "pac",
            Self::Shooting => "sho",
            Self::Passing => "pas",
            Self::Dribbling => "dri",
            Self::Defending => "def",
            Self::Physical => "phy",
            Self::Overall => "ovr",
            Self::SkillMoves => "skills",
            Self::WeakFoot => "wf",
        }
    }

    #[must_use]
    pub const fn long_name(self) -> &'static str {
        match self {
            Self::Pace => "pace",
            Self::Shooting => "shooting",
            Self::Passing => "passing",
            Self::Dribbling => "dribbling",
            Self::Defending => "defending",
            Self::Physical => "physical",
            Self::Overall => "overall",
            Self::SkillMoves => "skill_moves",
            Self::WeakFoot => "weak_foot",
        }
    }

    /// Upper bound for this attribute.
    #[must_use]
    pub const fn cap(self) -> u8 {
        match self {
            Self::SkillMoves | Self::WeakFoot => MAX_STARS,
            _ => MAX_RATING,
        }
    }

    /// Resolve either the short key or the long name.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|attr| attr.key() == key || attr.long_name() == key)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Work-rate tiers shown on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkRate {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[serde(alias = "Medium", alias = "MEDIUM", alias = "med")]
    Medium,
    #[serde(alias = "High", alias = "HIGH")]
    High,
}

impl fmt::Display for WorkRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkRate::Low => write!(f, "Low"),
            WorkRate::Medium => write!(f, "Medium"),
            WorkRate::High => write!(f, "High"),
        }
    }
}

/// Error returned when a work-rate label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown work rate `{0}`")]
pub struct UnknownWorkRate(pub String);

impl FromStr for WorkRate {
    type Err = UnknownWorkRate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(UnknownWorkRate(s.to_string())),
        }
    }
}

/// Which of the two work rates an upgrade or filter refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkRateSide {
    Attacking,
    Defensive,
}

/// Face ratings, overall and star ratings of a card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ratings {
    #[serde(alias = "pac")]
    pub pace: u8,
    #[serde(alias = "sho")]
    pub shooting: u8,
    #[serde(alias = "pas")]
    pub passing: u8,
    #[serde(alias = "dri")]
    pub dribbling: u8,
    #[serde(alias = "def")]
    pub defending: u8,
    #[serde(alias = "phy")]
    pub physical: u8,
    #[serde(alias = "ovr")]
    pub overall: u8,
    #[serde(alias = "skills")]
    pub skill_moves: u8,
    #[serde(alias = "wf")]
    pub weak_foot: u8,
}

impl Ratings {
    #[must_use]
    pub const fn get(&self, attribute: Attribute) -> u8 {
        match attribute {
            Attribute::Pace => self.pace,
            Attribute::Shooting => self.shooting,
            Attribute::Passing => self.passing,
            Attribute::Dribbling => self.dribbling,
            Attribute::Defending => self.defending,
            Attribute::Physical => self.physical,
            Attribute::Overall => self.overall,
            Attribute::SkillMoves => self.skill_moves,
            Attribute::WeakFoot => self.weak_foot,
        }
    }

    fn slot_mut(&mut self, attribute: Attribute) -> &mut u8 {
        match attribute {
            Attribute::Pace => &mut self.pace,
            Attribute::Shooting => &mut self.shooting,
            Attribute::Passing => &mut self.passing,
            Attribute::Dribbling => &mut self.dribbling,
            Attribute::Defending => &mut self.defending,
            Attribute::Physical => &mut self.physical,
            Attribute::Overall => &mut self.overall,
            Attribute::SkillMoves => &mut self.skill_moves,
            Attribute::WeakFoot => &mut self.weak_foot,
        }
    }

    /// Overwrite one attribute, clamped to its cap.
    pub fn set(&mut self, attribute: Attribute, value: u8) {
        *self.slot_mut(attribute) = value.min(attribute.cap());
    }

    /// Store a value as-is so ingestion can range-check it afterwards.
    pub(crate) fn set_unclamped(&mut self, attribute: Attribute, value: u8) {
        *self.slot_mut(attribute) = value;
    }

    /// Add to one attribute, stopping at its cap.
    pub fn boost(&mut self, attribute: Attribute, amount: u8) {
        let slot = self.slot_mut(attribute);
        *slot = slot.saturating_add(amount).min(attribute.cap());
    }

    pub fn clamp(&mut self) {
        for &attribute in Attribute::ALL {
            let value = self.get(attribute);
            self.set(attribute, value);
        }
    }

    /// First attribute whose value sits above its cap, if any.
    #[must_use]
    pub fn first_over_cap(&self) -> Option<(Attribute, u8)> {
        Attribute::ALL
            .iter()
            .map(|&attr| (attr, self.get(attr)))
            .find(|&(attr, value)| value > attr.cap())
    }
}

/// Base card tier derived from the overall rating.
#[must_use]
pub const fn base_rarity(overall: u8) -> &'static str {
    if overall >= GOLD_MIN_OVERALL {
        RARITY_GOLD
    } else if overall >= SILVER_MIN_OVERALL {
        RARITY_SILVER
    } else {
        RARITY_BRONZE
    }
}

/// One player card, either freshly ingested or produced by an evolution.
///
/// Equality and hashing cover the name, every attribute and the applied
/// evolutions taken as a set, so two cards reached through different orders
/// of the same evolutions compare equal.
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    name: String,
    ratings: Ratings,
    positions: BTreeSet<String>,
    plus_trait: Option<String>,
    traits: BTreeSet<String>,
    attacking_work_rate: WorkRate,
    defensive_work_rate: WorkRate,
    rarity: String,
    evolutions: Trail,
}

impl Player {
    /// Create an unevolved card. Ratings are clamped to their caps and the
    /// rarity starts from the base ladder.
    #[must_use]
    pub fn new(name: impl Into<String>, ratings: Ratings) -> Self {
        let mut ratings = ratings;
        ratings.clamp();
        Self {
            name: name.into(),
            rarity: base_rarity(ratings.overall).to_string(),
            ratings,
            positions: BTreeSet::new(),
            plus_trait: None,
            traits: BTreeSet::new(),
            attacking_work_rate: WorkRate::Medium,
            defensive_work_rate: WorkRate::Medium,
            evolutions: Trail::new(),
        }
    }

    #[must_use]
    pub fn with_positions<I, S>(mut self, positions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.positions = positions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_traits<I, S>(mut self, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.traits = traits.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_plus_trait(mut self, plus_trait: Option<String>) -> Self {
        self.plus_trait = plus_trait;
        self
    }

    #[must_use]
    pub fn with_work_rates(mut self, attacking: WorkRate, defensive: WorkRate) -> Self {
        self.attacking_work_rate = attacking;
        self.defensive_work_rate = defensive;
        self
    }

    #[must_use]
    pub fn with_rarity(mut self, rarity: impl Into<String>) -> Self {
        self.rarity = rarity.into();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn ratings(&self) -> &Ratings {
        &self.ratings
    }

    #[must_use]
    pub const fn rating(&self, attribute: Attribute) -> u8 {
        self.ratings.get(attribute)
    }

    #[must_use]
    pub const fn positions(&self) -> &BTreeSet<String> {
        &self.positions
    }

    #[must_use]
    pub const fn traits(&self) -> &BTreeSet<String> {
        &self.traits
    }

    #[must_use]
    pub fn plus_trait(&self) -> Option<&str> {
        self.plus_trait.as_deref()
    }

    #[must_use]
    pub const fn work_rate(&self, side: WorkRateSide) -> WorkRate {
        match side {
            WorkRateSide::Attacking => self.attacking_work_rate,
            WorkRateSide::Defensive => self.defensive_work_rate,
        }
    }

    #[must_use]
    pub fn rarity(&self) -> &str {
        &self.rarity
    }

    /// Applied evolutions, oldest first.
    #[must_use]
    pub fn evolutions(&self) -> &[EvolutionId] {
        &self.evolutions
    }

    #[must_use]
    pub fn is_evolved(&self) -> bool {
        !self.evolutions.is_empty()
    }

    #[must_use]
    pub fn has_applied(&self, id: &EvolutionId) -> bool {
        self.evolutions.contains(id)
    }

    pub fn boost(&mut self, attribute: Attribute, amount: u8) {
        self.ratings.boost(attribute, amount);
    }

    pub fn add_positions<'a, I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        self.positions.extend(positions.into_iter().cloned());
    }

    pub fn add_traits<'a, I>(&mut self, traits: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        self.traits.extend(traits.into_iter().cloned());
    }

    /// Set the plus-trait unless one is already held.
    pub fn grant_plus_trait(&mut self, plus_trait: &str) {
        if self.plus_trait.is_none() {
            self.plus_trait = Some(plus_trait.to_string());
        }
    }

    pub fn set_work_rate(&mut self, side: WorkRateSide, rate: WorkRate) {
        match side {
            WorkRateSide::Attacking => self.attacking_work_rate = rate,
            WorkRateSide::Defensive => self.defensive_work_rate = rate,
        }
    }

    pub fn set_rarity(&mut self, rarity: &str) {
        rarity.clone_into(&mut self.rarity);
    }

    pub(crate) fn record_evolution(&mut self, id: EvolutionId) {
        self.evolutions.push(id);
    }

    fn sorted_trail(&self) -> SmallVec<[&EvolutionId; 4]> {
        let mut ids: SmallVec<[&EvolutionId; 4]> = self.evolutions.iter().collect();
        ids.sort_unstable();
        ids
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.ratings == other.ratings
            && self.positions == other.positions
            && self.plus_trait == other.plus_trait
            && self.traits == other.traits
            && self.attacking_work_rate == other.attacking_work_rate
            && self.defensive_work_rate == other.defensive_work_rate
            && self.rarity == other.rarity
            && self.evolutions.len() == other.evolutions.len()
            && self.sorted_trail() == other.sorted_trail()
    }
}

impl Eq for Player {}

impl Hash for Player {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.ratings.hash(state);
        self.positions.hash(state);
        self.plus_trait.hash(state);
        self.traits.hash(state);
        self.attacking_work_rate.hash(state);
        self.defensive_work_rate.hash(state);
        self.rarity.hash(state);
        self.sorted_trail().hash(state);
    }
}

fn join_set(set: &BTreeSet<String>) -> String {
    if set.is_empty() {
        "-".to_string()
    } else {
        set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.ratings;
        writeln!(f, "Player: {}  OVR: {}", self.name, r.overall)?;
        writeln!(f, "Pac: {}  Dri: {}", r.pace, r.dribbling)?;
        writeln!(f, "Sho: {}  Def: {}", r.shooting, r.defending)?;
        writeln!(f, "Pas: {}  Phy: {}", r.passing, r.physical)?;
        writeln!(f, "Skills: {} Weak foot: {}", r.skill_moves, r.weak_foot)?;
        writeln!(f, "Plus trait: {}", self.plus_trait().unwrap_or("None"))?;
        writeln!(f, "Traits: {}", join_set(&self.traits))?;
        writeln!(f, "Positions: {}", join_set(&self.positions))?;
        writeln!(
            f,
            "Attacking/Defensive work rate: {}/{}",
            self.attacking_work_rate, self.defensive_work_rate
        )?;
        writeln!(f, "Rarity: {}", self.rarity)?;
        let trail: Vec<&str> = self.evolutions.iter().map(EvolutionId::as_str).collect();
        write!(f, "Evolutions: {}", trail.join(" -> "))
    }
}
