//! Evolution catalog loading and validation.
//!
//! Catalog files describe requirements and upgrades as flat key/value maps
//! (`"max_ovr": 80`, `"positions": ["LB"]`). Every key is resolved to a typed
//! [`Requirement`] or [`Upgrade`] here, so the search never sees a key it
//! does not understand.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::BUILTIN_CATALOG_JSON;
use crate::evolution::{Evolution, Requirement, Upgrade};
use crate::player::{Attribute, EvolutionId, Player, WorkRate, WorkRateSide};

/// Errors raised when a catalog fails validation.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("evolution #{index} has an empty id")]
    EmptyId { index: usize },
    #[error("duplicate evolution id `{id}`")]
    DuplicateId { id: String },
    #[error("evolution `{id}`: unknown requirement `{key}`")]
    UnknownRequirement { id: String, key: String },
    #[error("evolution `{id}`: unknown upgrade `{key}`")]
    UnknownUpgrade { id: String, key: String },
    #[error("evolution `{id}`: `{key}` expects {expected}")]
    InvalidValue {
        id: String,
        key: String,
        expected: &'static str,
    },
    #[error("evolution `{id}`: `{key}` must list at least one entry")]
    EmptySet { id: String, key: String },
    #[error("unknown evolution id `{0}`")]
    UnknownSelection(String),
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    evolutions: Vec<RawEvolution>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEvolution {
    id: String,
    name: String,
    #[serde(default)]
    cost: u32,
    #[serde(default)]
    requirements: Map<String, Value>,
    #[serde(default)]
    upgrades: Map<String, Value>,
}

/// Ordered, validated list of evolutions with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    evolutions: Vec<Evolution>,
}

impl Catalog {
    /// Build a catalog from already-typed evolutions.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is empty or appears twice.
    pub fn new(evolutions: Vec<Evolution>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for (index, evolution) in evolutions.iter().enumerate() {
            if evolution.id.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyId { index });
            }
            if !seen.insert(evolution.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    id: evolution.id.to_string(),
                });
            }
        }
        Ok(Self { evolutions })
    }

    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, a key is not recognised,
    /// a value has the wrong shape, or ids are empty or repeated.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        let evolutions = raw
            .evolutions
            .into_iter()
            .map(parse_evolution)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(evolutions)
    }

    /// The evolutions currently live in the game, bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns the parse error if the bundled document is invalid.
    pub fn builtin() -> Result<&'static Self, CatalogError> {
        static BUILTIN: OnceLock<Catalog> = OnceLock::new();
        if let Some(catalog) = BUILTIN.get() {
            return Ok(catalog);
        }
        let catalog = Self::from_json(BUILTIN_CATALOG_JSON).inspect_err(|err| {
            log::error!("bundled evolution catalog is invalid: {err}");
        })?;
        Ok(BUILTIN.get_or_init(|| catalog))
    }

    /// Narrow the catalog to the given ids, keeping catalog order.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first id that is not in the catalog.
    pub fn select<S: AsRef<str>>(&self, ids: &[S]) -> Result<Self, CatalogError> {
        let wanted: HashSet<&str> = ids.iter().map(AsRef::as_ref).collect();
        if let Some(missing) = ids
            .iter()
            .map(AsRef::as_ref)
            .find(|id| self.get(id).is_none())
        {
            return Err(CatalogError::UnknownSelection(missing.to_string()));
        }
        let evolutions = self
            .evolutions
            .iter()
            .filter(|evo| wanted.contains(evo.id.as_str()))
            .cloned()
            .collect();
        Ok(Self { evolutions })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Evolution> {
        self.evolutions.iter().find(|evo| evo.id.as_str() == id)
    }

    /// Evolutions `player` may take right now, in catalog order.
    pub fn eligible_for<'a>(&'a self, player: &'a Player) -> impl Iterator<Item = &'a Evolution> {
        self.evolutions
            .iter()
            .filter(move |evo| evo.is_eligible(player))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Evolution> {
        self.evolutions.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.evolutions.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.evolutions.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Evolution;
    type IntoIter = std::slice::Iter<'a, Evolution>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn parse_evolution(raw: RawEvolution) -> Result<Evolution, CatalogError> {
    let requirements = raw
        .requirements
        .iter()
        .map(|(key, value)| parse_requirement(&raw.id, key, value))
        .collect::<Result<Vec<_>, _>>()?;
    let upgrades = raw
        .upgrades
        .iter()
        .map(|(key, value)| parse_upgrade(&raw.id, key, value))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Evolution {
        id: EvolutionId::new(raw.id),
        name: raw.name,
        cost: raw.cost,
        requirements,
        upgrades,
    })
}

fn parse_requirement(id: &str, key: &str, value: &Value) -> Result<Requirement, CatalogError> {
    let field = Field { id, key, value };
    match key {
        "max_traits" | "max_playstyles" => Ok(Requirement::MaxTraits {
            count: field.count()?,
        }),
        "plus_trait" | "playstyle_plus" => {
            field.expect_unset()?;
            Ok(Requirement::NoPlusTrait)
        }
        "positions" => Ok(Requirement::AnyPosition {
            positions: field.string_set()?,
        }),
        "no_positions" => Ok(Requirement::NoPosition {
            positions: field.string_set()?,
        }),
        "rarity" => Ok(Requirement::Rarity {
            rarity: field.string()?,
        }),
        _ => {
            if let Some(attribute) = key.strip_prefix("min_").and_then(Attribute::from_key) {
                Ok(Requirement::Min {
                    attribute,
                    value: field.rating()?,
                })
            } else if let Some(attribute) = key.strip_prefix("max_").and_then(Attribute::from_key)
            {
                Ok(Requirement::Max {
                    attribute,
                    value: field.rating()?,
                })
            } else {
                Err(CatalogError::UnknownRequirement {
                    id: id.to_string(),
                    key: key.to_string(),
                })
            }
        }
    }
}

fn parse_upgrade(id: &str, key: &str, value: &Value) -> Result<Upgrade, CatalogError> {
    let field = Field { id, key, value };
    match key {
        "positions" => Ok(Upgrade::AddPositions {
            positions: field.string_set()?,
        }),
        "traits" | "playstyles" => Ok(Upgrade::AddTraits {
            traits: field.string_set()?,
        }),
        "plus_trait" | "playstyle_plus" => Ok(Upgrade::PlusTrait {
            plus_trait: field.string()?,
        }),
        "attacking_work_rate" | "att_wr" => Ok(Upgrade::WorkRate {
            side: WorkRateSide::Attacking,
            rate: field.work_rate()?,
        }),
        "defensive_work_rate" | "def_wr" => Ok(Upgrade::WorkRate {
            side: WorkRateSide::Defensive,
            rate: field.work_rate()?,
        }),
        "rarity" => Ok(Upgrade::Rarity {
            rarity: field.string()?,
        }),
        _ => match Attribute::from_key(key) {
            Some(attribute) => Ok(Upgrade::Boost {
                attribute,
                amount: field.rating()?,
            }),
            None => Err(CatalogError::UnknownUpgrade {
                id: id.to_string(),
                key: key.to_string(),
            }),
        },
    }
}

/// One catalog entry value together with where it came from.
struct Field<'a> {
    id: &'a str,
    key: &'a str,
    value: &'a Value,
}

impl Field<'_> {
    fn invalid(&self, expected: &'static str) -> CatalogError {
        CatalogError::InvalidValue {
            id: self.id.to_string(),
            key: self.key.to_string(),
            expected,
        }
    }

    fn rating(&self) -> Result<u8, CatalogError> {
        self.value
            .as_u64()
            .and_then(|v| u8::try_from(v).ok())
            .ok_or_else(|| self.invalid("an integer between 0 and 255"))
    }

    fn count(&self) -> Result<usize, CatalogError> {
        self.value
            .as_u64()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| self.invalid("a non-negative integer"))
    }

    fn string(&self) -> Result<String, CatalogError> {
        match self.value.as_str().map(str::trim) {
            Some(s) if !s.is_empty() => Ok(s.to_string()),
            _ => Err(self.invalid("a non-empty string")),
        }
    }

    fn string_set(&self) -> Result<BTreeSet<String>, CatalogError> {
        let items = self
            .value
            .as_array()
            .ok_or_else(|| self.invalid("a list of strings"))?;
        let set = items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| self.invalid("a list of strings"))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        if set.is_empty() {
            return Err(CatalogError::EmptySet {
                id: self.id.to_string(),
                key: self.key.to_string(),
            });
        }
        Ok(set)
    }

    fn work_rate(&self) -> Result<WorkRate, CatalogError> {
        self.value
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| self.invalid("`low`, `medium` or `high`"))
    }

    /// The plus-trait requirement only ever demands an empty slot.
    fn expect_unset(&self) -> Result<(), CatalogError> {
        match self.value {
            Value::Null => Ok(()),
            Value::String(s) if s.eq_ignore_ascii_case("none") => Ok(()),
            _ => Err(self.invalid("`none` or null")),
        }
    }
}
