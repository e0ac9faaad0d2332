//! Evopath Engine
//!
//! Platform-agnostic evolution-path search for player cards. Given a roster
//! and a catalog of evolutions, the engine walks every order in which the
//! evolutions can be applied and returns the distinct finished cards that
//! satisfy a filter. Loading and presentation are left to the caller.

pub mod catalog;
pub mod constants;
pub mod evolution;
pub mod filter;
pub mod player;
pub mod roster;
pub mod search;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError};
pub use evolution::{Evolution, Requirement, Upgrade};
pub use filter::SearchFilter;
pub use player::{
    Attribute, EvolutionId, Player, Ratings, Trail, UnknownWorkRate, WorkRate, WorkRateSide,
    base_rarity,
};
pub use roster::{Roster, RosterError};
pub use search::{EvolvedSet, PathSearch, SearchStats};

use serde::Serialize;

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the starting cards.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be read or parsed.
    fn load_roster(&self) -> Result<Roster, Self::Error>;

    /// Load the evolution catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or fails validation.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;
}

/// Everything a report needs about one search run.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Evolutions that took part, in catalog order.
    pub evolutions: Vec<EvolutionId>,
    pub starting_players: usize,
    pub skipped_goalkeepers: usize,
    pub stats: SearchStats,
    /// Distinct finished cards, sorted for stable output.
    pub results: Vec<Player>,
}

impl SearchOutcome {
    /// Run the search over an already-loaded roster and catalog.
    #[must_use]
    pub fn collect(catalog: &Catalog, roster: &Roster, filter: &SearchFilter) -> Self {
        let mut search = PathSearch::new(catalog, filter);
        let found = search.explore_roster(roster);
        Self {
            evolutions: catalog.iter().map(|evo| evo.id.clone()).collect(),
            starting_players: roster.len(),
            skipped_goalkeepers: roster.skipped_goalkeepers(),
            stats: search.stats(),
            results: found.into_sorted(),
        }
    }
}

/// Main engine tying a data source to the path search
pub struct EvolutionEngine<L>
where
    L: DataLoader,
{
    data_loader: L,
}

impl<L> EvolutionEngine<L>
where
    L: DataLoader,
{
    /// Create a new engine with the provided data loader
    pub const fn new(data_loader: L) -> Self {
        Self { data_loader }
    }

    /// Load the catalog, narrowed to `selection` when it is non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or a selected id is unknown.
    pub fn catalog<S: AsRef<str>>(&self, selection: &[S]) -> Result<Catalog, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let catalog = self.data_loader.load_catalog().map_err(Into::into)?;
        if selection.is_empty() {
            return Ok(catalog);
        }
        Ok(catalog.select(selection)?)
    }

    /// Search every roster card through the (optionally narrowed) catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster or catalog cannot be loaded, or a
    /// selected id is unknown.
    pub fn search<S: AsRef<str>>(
        &self,
        filter: &SearchFilter,
        selection: &[S],
    ) -> Result<SearchOutcome, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let catalog = self.catalog(selection)?;
        let roster = self.data_loader.load_roster().map_err(Into::into)?;
        if roster.is_empty() {
            log::warn!("roster has no searchable cards");
        }
        Ok(SearchOutcome::collect(&catalog, &roster, filter))
    }
}
