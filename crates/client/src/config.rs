//! Client configuration read from the process environment.
use std::env;
use std::path::PathBuf;

/// Where the town content lives and how the binary should drive it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub data_dir: PathBuf,
    /// Overrides `<data_dir>/town.toml`.
    pub config_path: Option<PathBuf>,
    pub auto_run: bool,
    /// Rounds to run when auto-run is off.
    pub rounds: usize,
    pub seed: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("crates/game/content/data"),
            config_path: None,
            auto_run: false,
            rounds: 1,
            seed: None,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TOWN_DATA_DIR` - Directory holding map.ron, roster.ron and town.toml
    /// - `TOWN_CONFIG` - Alternative runtime tuning file
    /// - `TOWN_AUTO_RUN` - Keep generating and executing rounds until Ctrl-C
    /// - `TOWN_ROUNDS` - Rounds to run without auto-run (default: 1)
    /// - `TOWN_SEED` - Seed for every random choice (default: entropy)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("TOWN_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config.config_path = env::var("TOWN_CONFIG").ok().map(PathBuf::from);

        if let Some(enable) = read_env::<bool>("TOWN_AUTO_RUN") {
            config.auto_run = enable;
        } else if env::var("TOWN_AUTO_RUN").is_ok() {
            // A bare `TOWN_AUTO_RUN=` also counts as on.
            config.auto_run = true;
        }

        if let Some(rounds) = read_env::<usize>("TOWN_ROUNDS") {
            config.rounds = rounds;
        }
        config.seed = read_env::<u64>("TOWN_SEED");

        config
    }

    pub fn tuning_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(game_content::ContentFactory::CONFIG_FILE))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
