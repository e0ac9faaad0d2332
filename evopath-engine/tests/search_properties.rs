use std::collections::HashSet;

use evopath_engine::{
    Attribute, Catalog, EvolvedSet, PathSearch, Player, Ratings, Roster, SearchFilter, WorkRate,
};

const POSITION_SETS: &[&[&str]] = &[
    &["ST"],
    &["ST", "CF"],
    &["CDM"],
    &["CDM", "CM"],
    &["LB", "LWB"],
    &["LM", "LW"],
    &["LM", "CM"],
    &["CAM"],
];

/// Deterministic spread of cards around the builtin catalog's gates.
fn sample_roster() -> Vec<Player> {
    let mut players = Vec::new();
    for (index, positions) in POSITION_SETS.iter().enumerate() {
        for overall in [62u8, 70, 75, 79, 84, 88] {
            let spread = u8::try_from(index).unwrap() * 3;
            let ratings = Ratings {
                pace: 60 + spread,
                shooting: 55 + spread * 2 % 30,
                passing: 58 + spread,
                dribbling: 62 + spread,
                defending: 40 + spread,
                physical: 58 + spread,
                overall,
                skill_moves: 2 + (index % 4) as u8,
                weak_foot: 2 + (index % 3) as u8,
            };
            let plus_trait = (index % 3 == 0 && overall > 75).then(|| "FIRST TOUCH".to_string());
            players.push(
                Player::new(format!("Card {index}-{overall}"), ratings)
                    .with_positions(positions.iter().copied())
                    .with_traits((0..index % 4).map(|t| format!("TRAIT {t}")))
                    .with_plus_trait(plus_trait)
                    .with_work_rates(WorkRate::High, WorkRate::Low),
            );
        }
    }
    players
}

fn search_all(catalog: &Catalog, filter: &SearchFilter, start: &Player) -> Vec<Player> {
    let mut search = PathSearch::new(catalog, filter);
    let mut found = EvolvedSet::new();
    search.explore(start, &mut found);
    found.into_iter().collect()
}

#[test]
fn ratings_never_exceed_caps() {
    let catalog = Catalog::builtin().unwrap();
    let filter = SearchFilter::default();
    for start in sample_roster() {
        for card in search_all(catalog, &filter, &start) {
            for &attribute in Attribute::ALL {
                assert!(
                    card.rating(attribute) <= attribute.cap(),
                    "{} {attribute} = {}",
                    card.name(),
                    card.rating(attribute)
                );
            }
        }
    }
}

#[test]
fn held_plus_trait_is_never_replaced() {
    let catalog = Catalog::builtin().unwrap();
    let filter = SearchFilter::default();
    for start in sample_roster() {
        let Some(original) = start.plus_trait().map(str::to_string) else {
            continue;
        };
        for card in search_all(catalog, &filter, &start) {
            assert_eq!(card.plus_trait(), Some(original.as_str()));
        }
    }
}

#[test]
fn no_evolution_is_applied_twice() {
    let catalog = Catalog::builtin().unwrap();
    let filter = SearchFilter::default();
    for start in sample_roster() {
        for card in search_all(catalog, &filter, &start) {
            let unique: HashSet<_> = card.evolutions().iter().collect();
            assert_eq!(unique.len(), card.evolutions().len());
            assert!(card.evolutions().len() <= catalog.len());
        }
    }
}

#[test]
fn search_leaves_starting_cards_untouched() {
    let catalog = Catalog::builtin().unwrap();
    let filter = SearchFilter::default();
    let roster = sample_roster();
    let snapshot: Vec<String> = roster.iter().map(ToString::to_string).collect();
    let before = roster.clone();

    let mut search = PathSearch::new(catalog, &filter);
    let found = search.explore_roster(&roster);
    assert!(!found.is_empty());

    assert_eq!(roster, before);
    let after: Vec<String> = roster.iter().map(ToString::to_string).collect();
    assert_eq!(after, snapshot);
    assert!(roster.iter().all(|p| !p.is_evolved()));
}

#[test]
fn every_result_is_terminal_and_evolved() {
    let catalog = Catalog::builtin().unwrap();
    let filter = SearchFilter::default();
    for start in sample_roster() {
        for card in search_all(catalog, &filter, &start) {
            assert!(card.is_evolved());
            assert_eq!(catalog.eligible_for(&card).count(), 0, "{card}");
        }
    }
}

#[test]
fn results_hold_no_structural_duplicates() {
    let catalog = Catalog::builtin().unwrap();
    let filter = SearchFilter::default();
    let roster = sample_roster();
    let mut search = PathSearch::new(catalog, &filter);
    let found = search.explore_roster(&roster);
    let stats = search.stats();

    let results = found.into_sorted();
    for (i, a) in results.iter().enumerate() {
        for b in &results[i + 1..] {
            assert_ne!(a, b);
        }
    }
    assert_eq!(stats.accepted as usize, results.len());
    assert_eq!(
        stats.leaves,
        stats.unevolved + stats.rejected + stats.accepted + stats.duplicates
    );
    assert!(stats.visited >= stats.leaves);
}

#[test]
fn filtered_results_are_a_subset_of_unfiltered() {
    let catalog = Catalog::builtin().unwrap();
    let roster = Roster::from_players(sample_roster());
    let open = SearchFilter::default();
    let strict = SearchFilter {
        positions: Some(["ST".to_string(), "LM".to_string()].into()),
        attacking_work_rate: Some(WorkRate::High),
        ..SearchFilter::default()
    }
    .with_min(Attribute::Overall, 85);

    let all: HashSet<Player> = PathSearch::new(catalog, &open)
        .explore_roster(&roster)
        .into_iter()
        .collect();
    let narrowed = PathSearch::new(catalog, &strict).explore_roster(&roster);
    assert!(!narrowed.is_empty());
    for card in &narrowed {
        assert!(all.contains(card));
        assert!(strict.matches(card));
    }
}

#[test]
fn sorted_results_are_stable_between_runs() {
    let catalog = Catalog::builtin().unwrap();
    let filter = SearchFilter::default();
    let roster = sample_roster();
    let first = PathSearch::new(catalog, &filter)
        .explore_roster(&roster)
        .into_sorted();
    let second = PathSearch::new(catalog, &filter)
        .explore_roster(&roster)
        .into_sorted();
    let names = |cards: &[Player]| -> Vec<String> {
        cards
            .iter()
            .map(|c| format!("{} {:?}", c.name(), c.evolutions()))
            .collect()
    };
    assert_eq!(names(&first), names(&second));
}
