//! Centralized caps and thresholds for the evolution engine.
//!
//! These values mirror the in-game card limits.

// Rating caps --------------------------------------------------------------
/// Highest value any face rating or the overall can reach.
pub const MAX_RATING: u8 = 99;
/// Highest skill-move or weak-foot star count.
pub const MAX_STARS: u8 = 5;

// Base rarity ladder -------------------------------------------------------
pub const GOLD_MIN_OVERALL: u8 = 75;
pub const SILVER_MIN_OVERALL: u8 = 65;
pub const RARITY_GOLD: &str = "Gold";
pub const RARITY_SILVER: &str = "Silver";
pub const RARITY_BRONZE: &str = "Bronze";

// Roster encoding ----------------------------------------------------------
/// Marker used by the tabular roster for an empty set column.
pub const EMPTY_SET_MARKER: &str = "-";
/// Marker used by the tabular roster for an unset plus-trait.
pub const NO_PLUS_TRAIT_MARKER: &str = "None";
/// Position tag for goalkeepers, who never enter the roster.
pub const GOALKEEPER_POSITION: &str = "GK";

// Assets -------------------------------------------------------------------
pub(crate) const BUILTIN_CATALOG_JSON: &str = include_str!("../assets/evolutions.json");
