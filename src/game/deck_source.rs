use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};

use super::error::DeckError;

pub const DEFAULT_DECK: &str = "default_deck.txt";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDeck {
    /// Name of the deck that was actually loaded, after any fallback.
    pub name: String,
    pub faces: Vec<String>,
}

/// Deck files and card images living in one assets directory.
#[derive(Clone, Debug)]
pub struct DeckSource {
    assets_dir: PathBuf,
}

impl DeckSource {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        DeckSource {
            assets_dir: assets_dir.into(),
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Path of a resource inside the assets directory. Names that would escape
    /// the directory yield `None`.
    pub fn resource_path(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let contained = !name.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        contained.then(|| self.assets_dir.join(relative))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.resource_path(name).is_some_and(|path| path.is_file())
    }

    pub fn image_path(&self, name: &str) -> PathBuf {
        self.resource_path(name)
            .unwrap_or_else(|| self.assets_dir.join(name))
    }

    pub fn resolve(&self, requested: &str) -> Result<ResolvedDeck, DeckError> {
        match self.load(requested) {
            Ok(faces) => Ok(ResolvedDeck {
                name: requested.to_string(),
                faces,
            }),
            Err(err) if requested != DEFAULT_DECK => {
                warn!("{err}; using {DEFAULT_DECK}");
                let faces = self.load(DEFAULT_DECK)?;
                Ok(ResolvedDeck {
                    name: DEFAULT_DECK.to_string(),
                    faces,
                })
            }
            Err(err) => Err(err),
        }
    }

    fn load(&self, name: &str) -> Result<Vec<String>, DeckError> {
        let missing = || DeckError::Missing {
            name: name.to_string(),
            dir: self.assets_dir.clone(),
        };
        let path = self.resource_path(name).ok_or_else(missing)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(missing()),
            Err(source) => {
                return Err(DeckError::Read {
                    name: name.to_string(),
                    source,
                });
            }
        };

        let faces = parse_deck(&raw);
        if faces.is_empty() {
            return Err(DeckError::Empty {
                name: name.to_string(),
            });
        }
        if let Some(face) = faces.iter().find(|face| !self.exists(face)) {
            return Err(DeckError::MissingImage {
                deck: name.to_string(),
                face: face.clone(),
            });
        }

        debug!("loaded deck {name} with {} faces", faces.len());
        Ok(faces)
    }
}

/// One face identifier per line; surrounding whitespace and blank lines are dropped.
pub fn parse_deck(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use temp_dir::TempDir;

    use super::*;

    fn write_images(dir: &TempDir, names: &[&str]) {
        for name in names {
            fs::write(dir.child(name), "<svg xmlns=\"http://www.w3.org/2000/svg\"/>").unwrap();
        }
    }

    fn write_deck(dir: &TempDir, name: &str, faces: &[&str]) {
        fs::write(dir.child(name), faces.join("\n")).unwrap();
    }

    #[test]
    fn parse_skips_blank_lines() {
        let faces = parse_deck("a.svg\n\n  b.svg  \n\t\nc.svg\n");
        assert_eq!(faces, vec!["a.svg", "b.svg", "c.svg"]);
    }

    #[test]
    fn resolves_requested_deck() {
        let dir = TempDir::new().unwrap();
        write_images(&dir, &["a.svg", "b.svg"]);
        write_deck(&dir, "custom.txt", &["b.svg", "a.svg"]);
        let source = DeckSource::new(dir.path());

        let deck = source.resolve("custom.txt").unwrap();
        assert_eq!(deck.name, "custom.txt");
        assert_eq!(deck.faces, vec!["b.svg", "a.svg"]);
        assert_eq!(source.resolve("custom.txt").unwrap(), deck);
    }

    #[test]
    fn missing_deck_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        write_images(&dir, &["a.svg", "b.svg"]);
        write_deck(&dir, DEFAULT_DECK, &["a.svg", "b.svg"]);
        let source = DeckSource::new(dir.path());

        let deck = source.resolve("nope.txt").unwrap();
        assert_eq!(deck.name, DEFAULT_DECK);
        assert_eq!(deck.faces, vec!["a.svg", "b.svg"]);
    }

    #[test]
    fn deck_with_missing_image_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        write_images(&dir, &["a.svg"]);
        write_deck(&dir, DEFAULT_DECK, &["a.svg"]);
        write_deck(&dir, "broken.txt", &["a.svg", "ghost.svg"]);
        let source = DeckSource::new(dir.path());

        assert_eq!(source.resolve("broken.txt").unwrap().name, DEFAULT_DECK);
    }

    #[test]
    fn broken_default_is_an_error() {
        let dir = TempDir::new().unwrap();
        write_deck(&dir, DEFAULT_DECK, &["ghost.svg"]);
        let source = DeckSource::new(dir.path());

        let err = source.resolve(DEFAULT_DECK).unwrap_err();
        assert!(matches!(err, DeckError::MissingImage { ref face, .. } if face == "ghost.svg"));
        assert!(source.resolve("other.txt").is_err());
    }

    #[test]
    fn absent_or_empty_default_is_an_error() {
        let dir = TempDir::new().unwrap();
        let source = DeckSource::new(dir.path());
        assert!(matches!(
            source.resolve(DEFAULT_DECK),
            Err(DeckError::Missing { .. })
        ));

        write_deck(&dir, DEFAULT_DECK, &["", "  "]);
        assert!(matches!(
            source.resolve(DEFAULT_DECK),
            Err(DeckError::Empty { .. })
        ));
    }

    #[test]
    fn names_outside_assets_are_rejected() {
        let dir = TempDir::new().unwrap();
        let source = DeckSource::new(dir.path());
        assert!(source.resource_path("../secret.txt").is_none());
        assert!(source.resource_path("/etc/passwd").is_none());
        assert!(source.resource_path("").is_none());
        assert!(source.resource_path("decks/custom.txt").is_some());
        assert!(!source.exists("../secret.txt"));
    }
}
