//! Runtime configuration loader.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::loaders::{LoadResult, read_file};

/// Loader for TOML configuration files.
///
/// The target type is chosen by the caller so this crate stays independent of
/// the runtime's configuration structs.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load<T: DeserializeOwned>(path: &Path) -> LoadResult<T> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse<T: DeserializeOwned>(content: &str) -> LoadResult<T> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::MovementConfig;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default)]
        movement: MovementConfig,
        idle_ms: u64,
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let sample: Sample = ConfigLoader::parse("idle_ms = 250").unwrap();
        assert_eq!(sample.idle_ms, 250);
        assert_eq!(sample.movement, MovementConfig::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let sample: Sample = ConfigLoader::parse(
            r#"
            idle_ms = 1000

            [movement]
            walk_speed = 4.5
            "#,
        )
        .unwrap();
        assert_eq!(sample.movement.walk_speed, 4.5);
        assert_eq!(
            sample.movement.wander_range,
            MovementConfig::DEFAULT_WANDER_RANGE
        );
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("town.toml");
        std::fs::write(&path, "idle_ms = 5").unwrap();

        let sample: Sample = ConfigLoader::load(&path).unwrap();
        assert_eq!(sample.idle_ms, 5);
    }
}
