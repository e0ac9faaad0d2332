//! Exhaustive evolution-path search.
//!
//! Starting from one card, every eligible evolution spawns its own branch and
//! the walk continues until no catalog entry applies. Those terminal cards are
//! filtered and collected into an [`EvolvedSet`], which absorbs cards reached
//! through different orders of the same evolutions.
use serde::Serialize;
use std::collections::HashSet;
use std::collections::hash_set;

use crate::catalog::Catalog;
use crate::filter::SearchFilter;
use crate::player::Player;

/// Deduplicating collection of terminal cards.
#[derive(Debug, Clone, Default)]
pub struct EvolvedSet {
    players: HashSet<Player>,
}

impl EvolvedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a card. Returns `false` when a structurally equal card was
    /// already present.
    pub fn insert(&mut self, player: Player) -> bool {
        self.players.insert(player)
    }

    #[must_use]
    pub fn contains(&self, player: &Player) -> bool {
        self.players.contains(player)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, Player> {
        self.players.iter()
    }

    /// Cards ordered by name, then highest overall, then trail.
    #[must_use]
    pub fn into_sorted(self) -> Vec<Player> {
        let mut players: Vec<Player> = self.players.into_iter().collect();
        players.sort_by(|a, b| {
            a.name()
                .cmp(b.name())
                .then_with(|| b.ratings().overall.cmp(&a.ratings().overall))
                .then_with(|| a.evolutions().cmp(b.evolutions()))
        });
        players
    }
}

impl IntoIterator for EvolvedSet {
    type Item = Player;
    type IntoIter = hash_set::IntoIter<Player>;

    fn into_iter(self) -> Self::IntoIter {
        self.players.into_iter()
    }
}

impl<'a> IntoIterator for &'a EvolvedSet {
    type Item = &'a Player;
    type IntoIter = hash_set::Iter<'a, Player>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Counters collected while walking the search tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Cards examined, including every starting card.
    pub visited: u64,
    /// Cards with no eligible evolution left.
    pub leaves: u64,
    /// Leaves that were never evolved and so never count as results.
    pub unevolved: u64,
    /// Leaves the filter turned away.
    pub rejected: u64,
    /// Leaves added to the result set.
    pub accepted: u64,
    /// Leaves equal to a card already in the result set.
    pub duplicates: u64,
}

/// Depth-first walk over every order in which catalog evolutions apply.
pub struct PathSearch<'a> {
    catalog: &'a Catalog,
    filter: &'a SearchFilter,
    stats: SearchStats,
}

impl<'a> PathSearch<'a> {
    #[must_use]
    pub const fn new(catalog: &'a Catalog, filter: &'a SearchFilter) -> Self {
        Self {
            catalog,
            filter,
            stats: SearchStats {
                visited: 0,
                leaves: 0,
                unevolved: 0,
                rejected: 0,
                accepted: 0,
                duplicates: 0,
            },
        }
    }

    #[must_use]
    pub const fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Explore every evolution path from `start`, adding accepted terminal
    /// cards to `found`.
    ///
    /// Depth is bounded by the catalog size because a lineage never takes the
    /// same evolution twice.
    pub fn explore(&mut self, start: &Player, found: &mut EvolvedSet) {
        let before = found.len();
        self.walk(start.clone(), found);
        log::debug!(
            "{}: {} new terminal cards",
            start.name(),
            found.len() - before
        );
    }

    /// Explore every card of a roster into one result set.
    pub fn explore_roster<'p, I>(&mut self, players: I) -> EvolvedSet
    where
        I: IntoIterator<Item = &'p Player>,
    {
        let mut found = EvolvedSet::new();
        let mut starts = 0usize;
        for player in players {
            starts += 1;
            self.explore(player, &mut found);
        }
        log::info!(
            "searched {starts} cards over {} evolutions: {} results ({} leaves, {} duplicates absorbed)",
            self.catalog.len(),
            found.len(),
            self.stats.leaves,
            self.stats.duplicates
        );
        found
    }

    fn walk(&mut self, player: Player, found: &mut EvolvedSet) {
        self.stats.visited += 1;
        let catalog = self.catalog;
        let mut branched = false;
        for evolution in catalog.eligible_for(&player) {
            branched = true;
            let next = evolution.evolve(&player);
            self.walk(next, found);
        }
        if branched {
            return;
        }

        self.stats.leaves += 1;
        if !player.is_evolved() {
            self.stats.unevolved += 1;
            return;
        }
        if !self.filter.matches(&player) {
            self.stats.rejected += 1;
            return;
        }
        if found.insert(player) {
            self.stats.accepted += 1;
        } else {
            self.stats.duplicates += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::{Evolution, Requirement, Upgrade};
    use crate::player::{Attribute, EvolutionId, Ratings};

    fn card(name: &str, overall: u8) -> Player {
        Player::new(
            name,
            Ratings {
                pace: 70,
                shooting: 70,
                passing: 70,
                dribbling: 70,
                defending: 70,
                physical: 70,
                overall,
                skill_moves: 3,
                weak_foot: 3,
            },
        )
    }

    fn boost(id: &str, attribute: Attribute, amount: u8) -> Evolution {
        Evolution {
            id: EvolutionId::new(id),
            name: id.to_string(),
            cost: 0,
            requirements: vec![],
            upgrades: vec![Upgrade::Boost { attribute, amount }],
        }
    }

    #[test]
    fn evolved_set_absorbs_structural_duplicates() {
        let evo = boost("a", Attribute::Overall, 1);
        let mut set = EvolvedSet::new();
        assert!(set.insert(evo.evolve(&card("Dup", 70))));
        assert!(!set.insert(evo.evolve(&card("Dup", 70))));
        assert_eq!(set.len(), 1);
        assert!(set.insert(evo.evolve(&card("Dup", 71))));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn commuting_evolutions_converge_to_one_result() {
        let catalog = Catalog::new(vec![
            boost("pace", Attribute::Pace, 2),
            boost("shot", Attribute::Shooting, 2),
        ])
        .unwrap();
        let filter = SearchFilter::default();
        let mut search = PathSearch::new(&catalog, &filter);
        let mut found = EvolvedSet::new();
        search.explore(&card("Both", 70), &mut found);

        assert_eq!(found.len(), 1);
        let pace = catalog.get("pace").unwrap();
        let shot = catalog.get("shot").unwrap();
        let shot_then_pace = pace.evolve(&shot.evolve(&card("Both", 70)));
        assert!(found.contains(&shot_then_pace));
        assert!(!found.contains(&card("Both", 70)));
        let stats = search.stats();
        assert_eq!(stats.visited, 5);
        assert_eq!(stats.leaves, 2);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.duplicates, 1);
    }

    #[test]
    fn filter_rejections_are_counted() {
        let catalog = Catalog::new(vec![boost("ovr", Attribute::Overall, 1)]).unwrap();
        let filter = SearchFilter::default().with_min(Attribute::Overall, 90);
        let mut search = PathSearch::new(&catalog, &filter);
        let found = search.explore_roster(&[card("Low", 70)]);
        assert!(found.is_empty());
        assert_eq!(search.stats().rejected, 1);
    }

    #[test]
    fn unevolved_leaves_never_count() {
        let gated = Evolution {
            requirements: vec![Requirement::Min {
                attribute: Attribute::Overall,
                value: 95,
            }],
            ..boost("gated", Attribute::Overall, 1)
        };
        let catalog = Catalog::new(vec![gated]).unwrap();
        let filter = SearchFilter::default();
        let mut search = PathSearch::new(&catalog, &filter);
        let found = search.explore_roster(&[card("Raw", 70)]);
        assert!(found.is_empty());
        assert_eq!(search.stats().unevolved, 1);
        assert_eq!(search.stats().visited, 1);
    }

    #[test]
    fn into_sorted_orders_by_name_then_overall() {
        let evo = boost("a", Attribute::Overall, 1);
        let mut set = EvolvedSet::new();
        set.insert(evo.evolve(&card("Zed", 70)));
        set.insert(evo.evolve(&card("Amy", 60)));
        set.insert(evo.evolve(&card("Amy", 80)));
        let sorted = set.into_sorted();
        let keys: Vec<(&str, u8)> = sorted
            .iter()
            .map(|p| (p.name(), p.rating(Attribute::Overall)))
            .collect();
        assert_eq!(keys, vec![("Amy", 81), ("Amy", 61), ("Zed", 71)]);
    }
}
