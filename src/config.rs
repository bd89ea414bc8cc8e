use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_RENDER_FPS: u64 = 60;
pub const CAMPAIGN_LEVELS: u32 = 20;
pub const BLINK_INTERVAL: Duration = Duration::from_millis(1500);
pub const FREEZE_DURATION: Duration = Duration::from_millis(2000);
pub const TRAP_MESSAGE_DURATION: Duration = Duration::from_millis(1000);
pub const MAGIC_WINDOW: RangeInclusive<u32> = 16..=20;

/// Fixed game rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rules {
    pub campaign_levels: u32,
    pub blink_interval: Duration,
    pub freeze_duration: Duration,
    pub trap_message_duration: Duration,
    pub magic_window: RangeInclusive<u32>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            campaign_levels: CAMPAIGN_LEVELS,
            blink_interval: BLINK_INTERVAL,
            freeze_duration: FREEZE_DURATION,
            trap_message_duration: TRAP_MESSAGE_DURATION,
            magic_window: MAGIC_WINDOW,
        }
    }
}

/// Runtime settings for the terminal front end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub render_fps: u64,
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render_fps: DEFAULT_RENDER_FPS,
            seed: None,
            log_file: None,
        }
    }
}

impl Settings {
    /// Reads `MAZE_FPS`, `MAZE_SEED` and `MAZE_LOG`. Unparseable or zero
    /// values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let render_fps = lookup("MAZE_FPS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_RENDER_FPS);
        let seed = lookup("MAZE_SEED").and_then(|v| v.parse::<u64>().ok());
        let log_file = lookup("MAZE_LOG")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Self {
            render_fps,
            seed,
            log_file,
        }
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.render_fps.max(1))
    }
}
