//! Filesystem-backed data loading for the tester binary.

use orecast_engine::{Activity, ActivityCatalog, DataLoader, ForgeDatabase, ItemDatabase};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const ITEMS_FILE: &str = "items.json";
const LOCATIONS_FILE: &str = "locations.json";
const FORGES_FILE: &str = "forges.json";

/// Errors raised while reading the game-data directory.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Loader reading `items.json`, `locations.json`, and `forges.json` from a
/// single data directory.
#[derive(Debug, Clone)]
pub struct FsDataLoader {
    data_dir: PathBuf,
}

impl FsDataLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn read(&self, file: &str) -> Result<String, LoaderError> {
        let path = self.data_dir.join(file);
        fs::read_to_string(&path).map_err(|source| LoaderError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn parse_error(&self, file: &str, source: serde_json::Error) -> LoaderError {
        LoaderError::Parse {
            path: self.data_dir.join(file).display().to_string(),
            source,
        }
    }
}

impl DataLoader for FsDataLoader {
    type Error = LoaderError;

    fn load_item_data(&self) -> Result<ItemDatabase, Self::Error> {
        let json = self.read(ITEMS_FILE)?;
        ItemDatabase::from_json(&json).map_err(|e| self.parse_error(ITEMS_FILE, e))
    }

    fn load_location_data(&self, activity: Activity) -> Result<ActivityCatalog, Self::Error> {
        // Loot item classes are resolved against the item table at build
        // time, so locations always load after items.
        let items = self.load_item_data()?;
        let json = self.read(LOCATIONS_FILE)?;
        ActivityCatalog::from_json(&json, &items, activity)
            .map_err(|e| self.parse_error(LOCATIONS_FILE, e))
    }

    fn load_forge_data(&self) -> Result<ForgeDatabase, Self::Error> {
        let json = self.read(FORGES_FILE)?;
        ForgeDatabase::from_json(&json).map_err(|e| self.parse_error(FORGES_FILE, e))
    }
}
