//! Roster ingestion: turn tabular or JSON player records into [`Player`]s.
//!
//! The tabular layout follows the scraped ratings export, one card per line:
//!
//! ```text
//! name,pac,sho,pas,dri,def,phy,ovr,skills,wf,positions,plus_trait,traits,att_wr,def_wr[,rarity]
//! ```
//!
//! Set columns are comma-joined inside quotes, `-` marks an empty set and
//! `None` an unset plus-trait. Goalkeepers are dropped on the way in.
use serde::Deserialize;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::constants::{EMPTY_SET_MARKER, GOALKEEPER_POSITION, NO_PLUS_TRAIT_MARKER};
use crate::player::{Attribute, Player, Ratings, UnknownWorkRate, WorkRate};

const MIN_COLUMNS: usize = 15;
const MAX_COLUMNS: usize = 16;

/// Column order of the tabular numeric block.
const NUMERIC_COLUMNS: [Attribute; 9] = [
    Attribute::Pace,
    Attribute::Shooting,
    Attribute::Passing,
    Attribute::Dribbling,
    Attribute::Defending,
    Attribute::Physical,
    Attribute::Overall,
    Attribute::SkillMoves,
    Attribute::WeakFoot,
];

/// Errors raised while ingesting a roster. `row` is the 1-based line of a
/// tabular roster or the 1-based entry of a JSON roster.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("roster is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("row {row}: expected {} or {} columns, found {found}", MIN_COLUMNS, MAX_COLUMNS)]
    ColumnCount { row: usize, found: usize },
    #[error("row {row}: unterminated quoted field")]
    UnterminatedQuote { row: usize },
    #[error("row {row}: player name is empty")]
    EmptyName { row: usize },
    #[error("row {row}: `{attribute}` value `{value}` is not a whole number")]
    InvalidNumber {
        row: usize,
        attribute: Attribute,
        value: String,
    },
    #[error("row {row}: `{attribute}` value {value} exceeds the cap of {}", .attribute.cap())]
    OverCap {
        row: usize,
        attribute: Attribute,
        value: u8,
    },
    #[error("row {row}: {source}")]
    WorkRate {
        row: usize,
        #[source]
        source: UnknownWorkRate,
    },
}

fn medium() -> WorkRate {
    WorkRate::Medium
}

/// One player record as supplied by a roster source.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlayerRecord {
    name: String,
    ratings: Ratings,
    #[serde(default)]
    positions: BTreeSet<String>,
    #[serde(default)]
    plus_trait: Option<String>,
    #[serde(default)]
    traits: BTreeSet<String>,
    #[serde(default = "medium")]
    attacking_work_rate: WorkRate,
    #[serde(default = "medium")]
    defensive_work_rate: WorkRate,
    #[serde(default)]
    rarity: Option<String>,
}

impl PlayerRecord {
    fn validate(&self, row: usize) -> Result<(), RosterError> {
        if self.name.trim().is_empty() {
            return Err(RosterError::EmptyName { row });
        }
        if let Some((attribute, value)) = self.ratings.first_over_cap() {
            return Err(RosterError::OverCap {
                row,
                attribute,
                value,
            });
        }
        Ok(())
    }

    fn is_goalkeeper(&self) -> bool {
        self.positions.contains(GOALKEEPER_POSITION)
    }

    fn into_player(self) -> Player {
        let plus_trait = self
            .plus_trait
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case(NO_PLUS_TRAIT_MARKER));
        let player = Player::new(self.name.trim(), self.ratings)
            .with_positions(self.positions)
            .with_traits(self.traits)
            .with_plus_trait(plus_trait)
            .with_work_rates(self.attacking_work_rate, self.defensive_work_rate);
        match self.rarity.filter(|r| !r.trim().is_empty()) {
            Some(rarity) => player.with_rarity(rarity.trim()),
            None => player,
        }
    }
}

/// Starting cards for a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    players: Vec<Player>,
    skipped_goalkeepers: usize,
}

impl Roster {
    #[must_use]
    pub fn from_players(players: Vec<Player>) -> Self {
        Self {
            players,
            skipped_goalkeepers: 0,
        }
    }

    /// Parse a tabular roster. A first line starting with `name` is taken as
    /// a header; blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error for the first malformed line.
    pub fn from_csv(input: &str) -> Result<Self, RosterError> {
        let mut roster = Self::default();
        let mut first_record = true;
        for (index, line) in input.lines().enumerate() {
            let row = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_record(line, row)?;
            if first_record {
                first_record = false;
                if fields[0].trim().eq_ignore_ascii_case("name") {
                    continue;
                }
            }
            roster.push(parse_csv_record(&fields, row)?, row)?;
        }
        log::debug!(
            "parsed {} roster cards ({} goalkeepers skipped)",
            roster.len(),
            roster.skipped_goalkeepers
        );
        Ok(roster)
    }

    /// Parse a JSON array of player records.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a record is invalid.
    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let records: Vec<PlayerRecord> = serde_json::from_str(json)?;
        let mut roster = Self::default();
        for (index, record) in records.into_iter().enumerate() {
            roster.push(record, index + 1)?;
        }
        Ok(roster)
    }

    fn push(&mut self, record: PlayerRecord, row: usize) -> Result<(), RosterError> {
        record.validate(row)?;
        if record.is_goalkeeper() {
            log::warn!("row {row}: skipping goalkeeper {}", record.name);
            self.skipped_goalkeepers += 1;
            return Ok(());
        }
        self.players.push(record.into_player());
        Ok(())
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub const fn skipped_goalkeepers(&self) -> usize {
        self.skipped_goalkeepers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Player> {
        self.players.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Player;
    type IntoIter = std::slice::Iter<'a, Player>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Split one line on commas, honouring double quotes and `""` escapes.
fn split_record(line: &str, row: usize) -> Result<Vec<String>, RosterError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    if in_quotes {
        return Err(RosterError::UnterminatedQuote { row });
    }
    fields.push(current);
    Ok(fields)
}

fn parse_csv_record(fields: &[String], row: usize) -> Result<PlayerRecord, RosterError> {
    if !(MIN_COLUMNS..=MAX_COLUMNS).contains(&fields.len()) {
        return Err(RosterError::ColumnCount {
            row,
            found: fields.len(),
        });
    }

    let mut ratings = Ratings::default();
    for (attribute, raw) in NUMERIC_COLUMNS.iter().zip(&fields[1..10]) {
        let value = raw
            .trim()
            .parse::<u8>()
            .map_err(|_| RosterError::InvalidNumber {
                row,
                attribute: *attribute,
                value: raw.trim().to_string(),
            })?;
        ratings.set_unclamped(*attribute, value);
    }

    let work_rate = |raw: &str| {
        raw.parse::<WorkRate>()
            .map_err(|source| RosterError::WorkRate { row, source })
    };

    Ok(PlayerRecord {
        name: fields[0].clone(),
        ratings,
        positions: parse_set(&fields[10]),
        plus_trait: Some(fields[11].clone()),
        traits: parse_set(&fields[12]),
        attacking_work_rate: work_rate(&fields[13])?,
        defensive_work_rate: work_rate(&fields[14])?,
        rarity: fields.get(15).cloned(),
    })
}

/// Comma-joined set column; `-` or blank is the empty set.
fn parse_set(raw: &str) -> BTreeSet<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == EMPTY_SET_MARKER {
        return BTreeSet::new();
    }
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}
