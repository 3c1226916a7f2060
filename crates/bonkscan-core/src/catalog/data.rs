use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::entity::EntityKind;
use super::index::CatalogIndex;

/// Loader for the scraped `data/<collection>.json` files.
pub struct GameData;

impl GameData {
    /// Read every known collection file in `dir` into one game-data bag.
    ///
    /// Missing files are skipped; so are files that are not valid JSON. Only
    /// genuine read failures (permissions, I/O) are errors.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Value> {
        let dir = dir.as_ref();
        let mut bag = Map::new();

        for kind in EntityKind::ALL {
            let path = dir.join(format!("{}.json", kind.collection()));
            if !path.exists() {
                debug!(path = %path.display(), "no game data file");
                continue;
            }

            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read game data: {}", path.display()))?;

            match serde_json::from_str::<Value>(&text) {
                Ok(value) => {
                    bag.insert(kind.collection().to_string(), value);
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "invalid game data JSON; treating as empty"
                    );
                }
            }
        }

        info!(dir = %dir.display(), collections = bag.len(), "loaded game data");
        Ok(Value::Object(bag))
    }

    /// Convenience: load `dir` and build a [`CatalogIndex`] from it.
    pub fn load_catalog<P: AsRef<Path>>(dir: P) -> Result<CatalogIndex> {
        let bag = Self::load_dir(dir)?;
        Ok(CatalogIndex::from_game_data(&bag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_dir_skips_missing_and_invalid() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join("items.json"),
            r#"{"items": [{"id": "bonker", "name": "Bonker"}]}"#,
        )?;
        fs::write(dir.path().join("weapons.json"), "{ not json")?;

        let catalog = GameData::load_catalog(dir.path())?;
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("bonker"));
        Ok(())
    }

    #[test]
    fn test_load_empty_dir() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(GameData::load_catalog(dir.path())?.is_empty());
        Ok(())
    }
}
