//! Content factory resolving data files under one directory.

use std::path::{Path, PathBuf};

use game_core::{Character, SpatialMap};
use serde::de::DeserializeOwned;

use crate::loaders::{ConfigLoader, LoadResult, MapLoader, RosterLoader};

/// Content factory that loads all town content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── town.toml
/// ├── map.ron
/// └── roster.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const MAP_FILE: &'static str = "map.ron";
    pub const ROSTER_FILE: &'static str = "roster.ron";
    pub const CONFIG_FILE: &'static str = "town.toml";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load the town map from `map.ron`.
    pub fn load_map(&self) -> LoadResult<SpatialMap> {
        MapLoader::load(&self.data_dir.join(Self::MAP_FILE))
    }

    /// Load the roster from `roster.ron`, placed on `map`.
    pub fn load_roster(&self, map: &SpatialMap) -> LoadResult<Vec<Character>> {
        RosterLoader::load(&self.data_dir.join(Self::ROSTER_FILE), map)
    }

    /// Load configuration from `town.toml`.
    pub fn load_config<T: DeserializeOwned>(&self) -> LoadResult<T> {
        ConfigLoader::load(&self.data_dir.join(Self::CONFIG_FILE))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
