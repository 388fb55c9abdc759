use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::game::leaderboard::LEADERBOARD_FILE_NAME;

const SETTINGS_FILE_NAME: &str = "settings.json";
const ASSETS_DIR_ENV: &str = "CONCENTRATION_ASSETS_DIR";
const ASSETS_DIR_NAME: &str = "assets";

/// Delays between the steps of a session, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub splash_ms: u64,
    pub warning_ms: u64,
    pub flip_ms: u64,
    pub win_check_ms: u64,
    pub winner_ms: u64,
    pub quit_message_ms: u64,
    pub end_credits_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            splash_ms: 2000,
            warning_ms: 3000,
            flip_ms: 1000,
            win_check_ms: 1100,
            winner_ms: 2000,
            quit_message_ms: 3000,
            end_credits_ms: 5000,
        }
    }
}

impl Timings {
    pub fn splash(&self) -> Duration {
        Duration::from_millis(self.splash_ms)
    }

    pub fn warning(&self) -> Duration {
        Duration::from_millis(self.warning_ms)
    }

    pub fn flip(&self) -> Duration {
        Duration::from_millis(self.flip_ms)
    }

    /// Never earlier than the flip, so the last pair is gone before the winner screen.
    pub fn win_check(&self) -> Duration {
        Duration::from_millis(self.win_check_ms.max(self.flip_ms))
    }

    pub fn winner(&self) -> Duration {
        Duration::from_millis(self.winner_ms)
    }

    pub fn quit_message(&self) -> Duration {
        Duration::from_millis(self.quit_message_ms)
    }

    pub fn end_credits(&self) -> Duration {
        Duration::from_millis(self.end_credits_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub assets_dir: PathBuf,
    pub leaderboard_file: Option<PathBuf>,
    pub timings: Timings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            assets_dir: PathBuf::from(ASSETS_DIR_NAME),
            leaderboard_file: None,
            timings: Timings::default(),
        }
    }
}

fn settings_path() -> PathBuf {
    glib::user_config_dir()
        .join("concentration")
        .join(SETTINGS_FILE_NAME)
}

/// Looks for `relative` in `start` and its ancestors, so both an installed
/// binary and one under `target/<profile>/` find the shipped assets.
fn locate_assets(start: &Path, relative: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(relative))
        .find(|candidate| candidate.is_dir())
}

impl Settings {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Settings file if there is one, then the environment override.
    pub fn load() -> Self {
        let path = settings_path();
        let mut settings = match fs::read_to_string(&path) {
            Ok(raw) => Self::from_json(&raw).unwrap_or_else(|err| {
                warn!("ignoring {}: {err}", path.display());
                Settings::default()
            }),
            Err(_) => {
                debug!("no settings at {}, using defaults", path.display());
                Settings::default()
            }
        };
        if let Some(dir) = std::env::var_os(ASSETS_DIR_ENV) {
            settings.assets_dir = PathBuf::from(dir);
        } else if settings.assets_dir.is_relative() && !settings.assets_dir.is_dir() {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf));
            let found = exe_dir.and_then(|dir| locate_assets(&dir, &settings.assets_dir));
            if let Some(found) = found {
                debug!("assets found next to the executable at {}", found.display());
                settings.assets_dir = found;
            }
        }
        settings
    }

    pub fn leaderboard_path(&self) -> PathBuf {
        self.leaderboard_file
            .clone()
            .unwrap_or_else(|| self.assets_dir.join(LEADERBOARD_FILE_NAME))
    }
}
