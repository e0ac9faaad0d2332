//! Filesystem-backed data loading for the engine.
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use evopath_engine::{Catalog, CatalogError, DataLoader, Roster, RosterError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid roster {}", .path.display())]
    Roster {
        path: PathBuf,
        #[source]
        source: RosterError,
    },
    #[error("invalid catalog {}", .path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
    #[error("bundled catalog is invalid")]
    Bundled(#[source] CatalogError),
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Read a catalog file, or fall back to the bundled catalog.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, LoadError> {
    let Some(path) = path else {
        log::debug!("using the bundled evolution catalog");
        return Catalog::builtin().cloned().map_err(LoadError::Bundled);
    };
    let text = read(path)?;
    Catalog::from_json(&text).map_err(|source| LoadError::Catalog {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a roster file; `.json` files hold player records, anything else is
/// parsed as comma-separated rows.
pub fn load_roster(path: &Path) -> Result<Roster, LoadError> {
    let text = read(path)?;
    let parsed = if is_json(path) {
        Roster::from_json(&text)
    } else {
        Roster::from_csv(&text)
    };
    parsed.map_err(|source| LoadError::Roster {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone)]
pub struct FileLoader {
    roster: PathBuf,
    catalog: Option<PathBuf>,
}

impl FileLoader {
    pub const fn new(roster: PathBuf, catalog: Option<PathBuf>) -> Self {
        Self { roster, catalog }
    }
}

impl DataLoader for FileLoader {
    type Error = LoadError;

    fn load_roster(&self) -> Result<Roster, Self::Error> {
        load_roster(&self.roster)
    }

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        load_catalog(self.catalog.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("evopath-loader-{name}"));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_catalog_path_uses_bundled_catalog() {
        let catalog = load_catalog(None).unwrap();
        assert_eq!(catalog.len(), Catalog::builtin().unwrap().len());
    }

    #[test]
    fn roster_format_follows_extension() {
        let csv = temp_file(
            "roster.csv",
            "Wing Back,80,60,70,75,72,70,78,3,3,LB,None,-,High,Medium\n",
        );
        assert_eq!(load_roster(&csv).unwrap().len(), 1);

        let json = temp_file(
            "roster.JSON",
            r#"[ { "name": "Json Back", "ratings": { "pac": 80, "sho": 60, "pas": 70,
                "dri": 75, "def": 72, "phy": 70, "ovr": 78, "skills": 3, "wf": 3 } } ]"#,
        );
        assert_eq!(load_roster(&json).unwrap().len(), 1);
    }

    #[test]
    fn errors_name_the_offending_file() {
        let missing = std::env::temp_dir().join("evopath-loader-does-not-exist.csv");
        let err = load_roster(&missing).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("evopath-loader-does-not-exist.csv"));

        let bad = temp_file("catalog.json", r#"{ "evolutions": [ { "id": "x", "name": "X",
            "requirements": { "max_stamina": 3 } } ] }"#);
        let err = load_catalog(Some(&bad)).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Catalog {
                source: CatalogError::UnknownRequirement { .. },
                ..
            }
        ));
    }

    #[test]
    fn file_loader_feeds_the_engine() {
        let csv = temp_file(
            "engine.csv",
            "Raw Talent,70,60,62,68,40,55,66,3,2,\"LB,LM\",None,-,Medium,Medium\n",
        );
        let engine = evopath_engine::EvolutionEngine::new(FileLoader::new(csv, None));
        let outcome = engine
            .search(&evopath_engine::SearchFilter::default(), &["peps_legacy"])
            .unwrap();
        assert_eq!(outcome.results.len(), 1);
    }
}
