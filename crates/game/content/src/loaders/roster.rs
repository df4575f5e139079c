//! Character roster loader.
//!
//! Characters are declared with a spawn waypoint rather than raw
//! coordinates, so the roster has to be resolved against a loaded map.

use std::path::Path;

use game_core::{Character, CharacterId, Profile, SpatialMap};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

#[derive(Debug, Clone, Deserialize)]
struct CharacterRon {
    id: u32,
    name: String,
    spawn: String,
    #[serde(default)]
    profile: Profile,
    /// Clips beyond the built-in emotes.
    #[serde(default)]
    clips: Vec<String>,
}

/// Loader for the character roster from RON files.
pub struct RosterLoader;

impl RosterLoader {
    /// Load the roster and place every character on its spawn waypoint.
    pub fn load(path: &Path, map: &SpatialMap) -> LoadResult<Vec<Character>> {
        let content = read_file(path)?;
        Self::parse(&content, map)
    }

    pub fn parse(content: &str, map: &SpatialMap) -> LoadResult<Vec<Character>> {
        let raw: Vec<CharacterRon> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;

        raw.into_iter()
            .map(|entry| {
                let position = map.resolve(&entry.spawn).ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unknown spawn waypoint '{}' for character '{}'",
                        entry.spawn,
                        entry.name
                    )
                })?;

                Ok(Character::new(CharacterId(entry.id), entry.name, position)
                    .with_profile(entry.profile)
                    .with_clips(entry.clips))
            })
            .collect()
    }
}
